//! Connection definition types
//!
//! A connection definition is the per-name record from the configuration.
//! Only the `driver` key means anything to the engine; every other key is
//! read by the creator that builds the connection.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key every connection definition must carry
pub const DRIVER_KEY: &str = "driver";

/// Configuration record describing one named connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionDefinition {
    fields: Map<String, Value>,
}

impl ConnectionDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a definition with only the driver set
    pub fn for_driver(driver: impl Into<String>) -> Self {
        let driver: String = driver.into();
        Self::new().with(DRIVER_KEY, driver)
    }

    /// Builder-style setter for a single field
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The driver identifier, if present and a string
    pub fn driver(&self) -> Option<&str> {
        self.get_str(DRIVER_KEY)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Raw driver-specific fields
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for ConnectionDefinition {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
