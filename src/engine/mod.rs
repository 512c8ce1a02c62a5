// Connection Engine Module
// Config resolution, creator lookup, caching and lifecycle

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod registry;
pub mod traits;
pub mod types;

pub use cache::ConnectionCache;
pub use config::{Config, ConfigResolver};
pub use error::{CreatorError, EngineError, EngineResult, ErrorKind};
pub use manager::Manager;
pub use registry::CreatorRegistry;
pub use traits::{Creator, SharedCreator};
pub use types::*;
