//! Creator trait definition
//!
//! A creator turns a connection definition into a live connection. Concrete
//! clients (SQL, cache, queue backends) live outside this crate and only
//! need to provide a creator for their driver id.

use std::sync::Arc;

use crate::engine::error::CreatorError;
use crate::engine::types::ConnectionDefinition;

/// Builds connections of type `C` from a definition
///
/// Implementations may block (opening sockets, handshakes). The manager
/// calls them outside of its internal locks, and at most once per name for
/// concurrent cache misses.
///
/// A creator must not call [`Manager::connection`](crate::engine::Manager::connection)
/// for the name it is building. That call waits for the creation already in
/// flight, which is the creator itself, and never returns. Resolving other
/// names from inside a creator is fine.
pub trait Creator<C: ?Sized>: Send + Sync {
    fn create(&self, definition: &ConnectionDefinition) -> Result<Arc<C>, CreatorError>;
}

impl<C, F> Creator<C> for F
where
    C: ?Sized,
    F: Fn(&ConnectionDefinition) -> Result<Arc<C>, CreatorError> + Send + Sync,
{
    fn create(&self, definition: &ConnectionDefinition) -> Result<Arc<C>, CreatorError> {
        self(definition)
    }
}

/// Shared handle to a creator, as stored by the registry
pub type SharedCreator<C> = Arc<dyn Creator<C>>;
