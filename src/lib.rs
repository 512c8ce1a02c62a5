// connhub - Named connection registry
// Core library

pub mod engine;
pub mod observability;

pub use engine::{
    Config, ConnectionDefinition, Creator, CreatorError, CreatorRegistry, EngineError,
    EngineResult, ErrorKind, Manager,
};
