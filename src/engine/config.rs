//! Connection configuration
//!
//! The configuration is handed to the manager once and never changes
//! afterwards. Environment variables may override the default connection
//! name before that hand-off, so managed deployments can pin it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::types::ConnectionDefinition;

/// Overrides [`Config::default`] when set to a non-empty value
pub const DEFAULT_CONNECTION_ENV: &str = "CONNHUB_DEFAULT_CONNECTION";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Name used when a caller does not specify one
    pub default: String,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionDefinition>,
}

fn env_string_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            connections: BTreeMap::new(),
        }
    }

    /// Builder-style registration of a named definition
    pub fn with_connection(
        mut self,
        name: impl Into<String>,
        definition: ConnectionDefinition,
    ) -> Self {
        self.connections.insert(name.into(), definition);
        self
    }

    /// Builds a config from an already parsed JSON value
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(name) = env_string_opt(DEFAULT_CONNECTION_ENV) {
            self.default = name;
        }
        self
    }
}

/// Pure lookups against an immutable [`Config`]
pub struct ConfigResolver {
    config: Config,
}

impl ConfigResolver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn definition_for(&self, name: &str) -> EngineResult<&ConnectionDefinition> {
        self.config
            .connections
            .get(name)
            .ok_or_else(|| EngineError::unknown_connection(name))
    }

    pub fn driver_for(&self, name: &str) -> EngineResult<&str> {
        self.definition_for(name)?
            .driver()
            .ok_or_else(|| EngineError::invalid_config(name, "missing string field `driver`"))
    }
}
