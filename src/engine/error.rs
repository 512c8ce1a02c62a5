//! Engine Errors
//!
//! Error taxonomy for connection resolution and creation.

use std::sync::Arc;

use thiserror::Error;

/// Error type creators return when they fail to build a connection
pub type CreatorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A creator failure shared by every caller waiting on the same creation
pub type SharedCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

pub type EngineResult<T> = Result<T, EngineError>;

/// Discriminant of an [`EngineError`], for matching without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownConnection,
    InvalidConfig,
    UnknownDriver,
    ConnectionCreation,
}

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Connection [{name}] not configured")]
    UnknownConnection { name: String },

    #[error("Invalid configuration for connection [{name}]: {message}")]
    InvalidConfig { name: String, message: String },

    #[error("Driver [{driver}] is not supported")]
    UnknownDriver { driver: String },

    #[error("Failed to create connection [{name}] with driver [{driver}]: {source}")]
    ConnectionCreation {
        name: String,
        driver: String,
        #[source]
        source: SharedCause,
    },
}

impl EngineError {
    pub fn unknown_connection(name: impl Into<String>) -> Self {
        Self::UnknownConnection { name: name.into() }
    }

    pub fn invalid_config(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn unknown_driver(driver: impl Into<String>) -> Self {
        Self::UnknownDriver {
            driver: driver.into(),
        }
    }

    pub fn creation_failed(
        name: impl Into<String>,
        driver: impl Into<String>,
        source: CreatorError,
    ) -> Self {
        Self::ConnectionCreation {
            name: name.into(),
            driver: driver.into(),
            source: SharedCause::from(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownConnection { .. } => ErrorKind::UnknownConnection,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::UnknownDriver { .. } => ErrorKind::UnknownDriver,
            Self::ConnectionCreation { .. } => ErrorKind::ConnectionCreation,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn creation_error_preserves_cause() {
        let cause: CreatorError = "socket refused".into();
        let err = EngineError::creation_failed("primary", "mysql", cause);

        assert_eq!(err.kind(), ErrorKind::ConnectionCreation);
        assert!(err.to_string().contains("[primary]"));
        let source = err.source().expect("cause should be exposed");
        assert_eq!(source.to_string(), "socket refused");
    }

    #[test]
    fn clones_share_the_cause() {
        let err = EngineError::creation_failed("primary", "mysql", "timed out".into());
        let copy = err.clone();

        match (&err, &copy) {
            (
                EngineError::ConnectionCreation { source: a, .. },
                EngineError::ConnectionCreation { source: b, .. },
            ) => assert!(Arc::ptr_eq(a, b)),
            other => panic!("unexpected variants: {other:?}"),
        }
    }

    #[test]
    fn kinds_are_distinguishable() {
        assert_ne!(
            EngineError::unknown_connection("a").kind(),
            EngineError::unknown_driver("x").kind()
        );
        assert_eq!(
            EngineError::invalid_config("a", "missing driver").kind(),
            ErrorKind::InvalidConfig
        );
    }
}
