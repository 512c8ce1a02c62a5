//! Connection Cache
//!
//! Holds at most one live connection per name. The cache never tears a
//! connection down itself: replaced and removed instances are handed back
//! to the caller.

use std::collections::HashMap;
use std::sync::Arc;

pub struct ConnectionCache<C: ?Sized> {
    entries: HashMap<String, Arc<C>>,
}

impl<C: ?Sized> ConnectionCache<C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<C>> {
        self.entries.get(name).cloned()
    }

    /// Stores `connection` under `name`, returning the instance it replaced
    pub fn put(&mut self, name: impl Into<String>, connection: Arc<C>) -> Option<Arc<C>> {
        self.entries.insert(name.into(), connection)
    }

    /// Idempotent; removing an absent name returns `None`
    pub fn remove(&mut self, name: &str) -> Option<Arc<C>> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn snapshot(&self) -> HashMap<String, Arc<C>> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: ?Sized> Default for ConnectionCache<C> {
    fn default() -> Self {
        Self::new()
    }
}
