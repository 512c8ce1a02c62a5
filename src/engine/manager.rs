//! Connection Manager
//!
//! Lazily creates, caches and replaces named connections.
//! This is the SINGLE SOURCE OF TRUTH for which connections are live.
//!
//! Creators run outside of the internal locks. Concurrent cache misses for
//! the same name are collapsed onto one creator call: the first caller marks
//! the name as in flight under a fresh generation, later callers wait on a
//! condition variable and receive what that generation produced, either the
//! new instance or a clone of its error. No waiter retries a failed creation.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, field, info, instrument, warn, Span};

use crate::engine::cache::ConnectionCache;
use crate::engine::config::{Config, ConfigResolver};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::registry::CreatorRegistry;
use crate::engine::traits::Creator;
use crate::engine::types::ConnectionDefinition;

struct CacheState<C: ?Sized> {
    cache: ConnectionCache<C>,
    /// Name -> generation of the creation currently running for it
    in_flight: HashMap<String, u64>,
    /// Name -> last generation that failed, with its error
    failed: HashMap<String, (u64, EngineError)>,
    next_generation: u64,
}

impl<C: ?Sized> CacheState<C> {
    fn failure_of(&self, name: &str, generation: u64) -> Option<EngineError> {
        match self.failed.get(name) {
            Some((failed, err)) if *failed == generation => Some(err.clone()),
            _ => None,
        }
    }

    fn release(&mut self, name: &str, generation: u64) {
        if self.in_flight.get(name) == Some(&generation) {
            self.in_flight.remove(name);
        }
    }
}

/// Named connection registry
pub struct Manager<C: ?Sized> {
    resolver: ConfigResolver,
    registry: RwLock<CreatorRegistry<C>>,
    state: Mutex<CacheState<C>>,
    settled: Condvar,
    default_name: RwLock<String>,
}

/// Clears the in-flight marker for a name, including when the creator panics
struct InFlight<'a, C: ?Sized> {
    manager: &'a Manager<C>,
    name: &'a str,
    generation: u64,
    done: bool,
}

impl<C: ?Sized> InFlight<'_, C> {
    fn finish(mut self, result: &EngineResult<Arc<C>>) {
        let mut state = self.manager.lock_state();
        match result {
            Ok(connection) => {
                state.cache.put(self.name, Arc::clone(connection));
                state.failed.remove(self.name);
            }
            Err(err) => {
                state
                    .failed
                    .insert(self.name.to_string(), (self.generation, err.clone()));
            }
        }
        state.release(self.name, self.generation);
        drop(state);
        self.manager.settled.notify_all();
        self.done = true;
    }
}

impl<C: ?Sized> Drop for InFlight<'_, C> {
    fn drop(&mut self) {
        if !self.done {
            self.manager
                .lock_state()
                .release(self.name, self.generation);
            self.manager.settled.notify_all();
        }
    }
}

impl<C: ?Sized> Manager<C> {
    fn lock_state(&self) -> MutexGuard<'_, CacheState<C>> {
        // Every critical section leaves the state whole, so poisoning is ignorable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C> Manager<C>
where
    C: ?Sized + Send + Sync + 'static,
{
    pub fn new(config: Config, registry: CreatorRegistry<C>) -> Self {
        let default_name = config.default.clone();
        Self {
            resolver: ConfigResolver::new(config),
            registry: RwLock::new(registry),
            state: Mutex::new(CacheState {
                cache: ConnectionCache::new(),
                in_flight: HashMap::new(),
                failed: HashMap::new(),
                next_generation: 0,
            }),
            settled: Condvar::new(),
            default_name: RwLock::new(default_name),
        }
    }

    /// Manager without built-in drivers; everything comes from [`Manager::extend`]
    pub fn with_config(config: Config) -> Self {
        Self::new(config, CreatorRegistry::new())
    }

    pub fn config(&self) -> &Config {
        self.resolver.config()
    }

    fn resolve_name(&self, name: Option<&str>) -> String {
        match name {
            Some(name) => name.to_string(),
            None => self.get_default_connection(),
        }
    }

    /// Returns the cached connection, creating it on first use
    ///
    /// Must not be called from inside a creator for the name that creator is
    /// building: the call would wait on its own in-flight creation forever.
    #[instrument(skip_all, fields(name = field::Empty))]
    pub fn connection<'a>(&self, name: impl Into<Option<&'a str>>) -> EngineResult<Arc<C>> {
        let name = self.resolve_name(name.into());
        Span::current().record("name", name.as_str());

        let mut state = self.lock_state();
        let mut awaited: Option<u64> = None;
        loop {
            if let Some(connection) = state.cache.get(&name) {
                return Ok(connection);
            }
            if let Some(err) = awaited.and_then(|generation| state.failure_of(&name, generation)) {
                return Err(err);
            }
            let Some(&generation) = state.in_flight.get(&name) else {
                break;
            };
            awaited = Some(generation);
            debug!(generation, "waiting for in-flight creation");
            state = self
                .settled
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        let generation = state.next_generation;
        state.next_generation += 1;
        state.in_flight.insert(name.clone(), generation);
        drop(state);

        let in_flight = InFlight {
            manager: self,
            name: &name,
            generation,
            done: false,
        };
        let result = self.make_connection(&name);
        in_flight.finish(&result);
        result
    }

    /// Creates a fresh connection and replaces any cached one
    ///
    /// The replaced instance is dropped by the manager, not closed; teardown
    /// belongs to the connection type's own `Drop`.
    #[instrument(skip_all, fields(name = field::Empty))]
    pub fn reconnect<'a>(&self, name: impl Into<Option<&'a str>>) -> EngineResult<Arc<C>> {
        let name = self.resolve_name(name.into());
        Span::current().record("name", name.as_str());

        let connection = self.make_connection(&name)?;
        let replaced = self
            .lock_state()
            .cache
            .put(name.as_str(), Arc::clone(&connection));
        self.settled.notify_all();

        info!(replaced = replaced.is_some(), "reconnected");
        Ok(connection)
    }

    /// Drops the cached connection, if any
    pub fn disconnect<'a>(&self, name: impl Into<Option<&'a str>>) {
        self.purge(name);
    }

    /// Removes the cached connection and hands it back to the caller
    #[instrument(skip_all, fields(name = field::Empty))]
    pub fn purge<'a>(&self, name: impl Into<Option<&'a str>>) -> Option<Arc<C>> {
        let name = self.resolve_name(name.into());
        Span::current().record("name", name.as_str());

        let removed = self.lock_state().cache.remove(&name);
        if removed.is_some() {
            info!("disconnected");
        }
        removed
    }

    fn make_connection(&self, name: &str) -> EngineResult<Arc<C>> {
        let definition = self.resolver.definition_for(name)?;
        let driver = self.resolver.driver_for(name)?;
        let creator = self.read_registry().resolve(driver)?;

        debug!(driver, "creating connection");
        creator.create(definition).map_err(|source| {
            warn!(driver, error = %source, "connection creation failed");
            EngineError::creation_failed(name, driver, source)
        })
    }

    pub fn has_connection(&self, name: &str) -> bool {
        self.lock_state().cache.contains(name)
    }

    /// Snapshot of every live connection
    pub fn get_connections(&self) -> HashMap<String, Arc<C>> {
        self.lock_state().cache.snapshot()
    }

    /// Sorted names of every live connection
    pub fn connection_names(&self) -> Vec<String> {
        self.lock_state().cache.names()
    }

    pub fn get_default_connection(&self) -> String {
        self.default_name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Not validated against the configuration
    pub fn set_default_connection(&self, name: impl Into<String>) {
        *self
            .default_name
            .write()
            .unwrap_or_else(PoisonError::into_inner) = name.into();
    }

    /// Runs `f` with the default connection temporarily switched to `name`
    ///
    /// The default is shared by every thread using this manager, so other
    /// callers resolving the default meanwhile will see `name` as well.
    pub fn using_connection<R>(&self, name: impl Into<String>, f: impl FnOnce(&Self) -> R) -> R {
        struct Restore<'a, C: ?Sized + Send + Sync + 'static> {
            manager: &'a Manager<C>,
            previous: Option<String>,
        }

        impl<C: ?Sized + Send + Sync + 'static> Drop for Restore<'_, C> {
            fn drop(&mut self) {
                if let Some(previous) = self.previous.take() {
                    self.manager.set_default_connection(previous);
                }
            }
        }

        let previous = self.get_default_connection();
        self.set_default_connection(name);
        let _restore = Restore {
            manager: self,
            previous: Some(previous),
        };
        f(self)
    }

    /// Registers a creator for `driver`, shadowing any built-in
    pub fn extend(&self, driver: impl Into<String>, creator: impl Creator<C> + 'static) {
        let driver = driver.into();
        debug!(driver = %driver, "registering driver extension");
        self.write_registry().register(driver, Arc::new(creator));
    }

    pub fn forget_extension(&self, driver: &str) -> bool {
        self.write_registry().unregister(driver)
    }

    pub fn forget_extensions(&self) {
        self.write_registry().clear_extensions();
    }

    pub fn available_drivers(&self) -> Vec<String> {
        self.read_registry().drivers()
    }

    pub fn supports_driver(&self, driver: &str) -> bool {
        self.read_registry().contains(driver)
    }

    pub fn get_connection_config(&self, name: &str) -> EngineResult<&ConnectionDefinition> {
        self.resolver.definition_for(name)
    }

    fn read_registry(&self) -> std::sync::RwLockReadGuard<'_, CreatorRegistry<C>> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> std::sync::RwLockWriteGuard<'_, CreatorRegistry<C>> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}
