//! Creator Registry
//!
//! Maps driver ids to creators. Built-in creators are fixed when the
//! registry is assembled; extensions can be added or removed at runtime and
//! always shadow a built-in with the same id.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::traits::{Creator, SharedCreator};

pub struct CreatorRegistry<C: ?Sized> {
    builtins: HashMap<String, SharedCreator<C>>,
    extensions: HashMap<String, SharedCreator<C>>,
}

impl<C: ?Sized> CreatorRegistry<C> {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            builtins: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    /// Adds a built-in creator while assembling the registry
    pub fn with_builtin(
        mut self,
        driver: impl Into<String>,
        creator: impl Creator<C> + 'static,
    ) -> Self {
        self.builtins.insert(driver.into(), Arc::new(creator));
        self
    }

    /// Installs or replaces the extension for `driver`
    pub fn register(&mut self, driver: impl Into<String>, creator: SharedCreator<C>) {
        self.extensions.insert(driver.into(), creator);
    }

    /// Removes the extension for `driver`, returning whether one existed
    pub fn unregister(&mut self, driver: &str) -> bool {
        self.extensions.remove(driver).is_some()
    }

    pub fn clear_extensions(&mut self) {
        self.extensions.clear();
    }

    /// Extension first, then built-in
    pub fn resolve(&self, driver: &str) -> EngineResult<SharedCreator<C>> {
        self.extensions
            .get(driver)
            .or_else(|| self.builtins.get(driver))
            .cloned()
            .ok_or_else(|| EngineError::unknown_driver(driver))
    }

    pub fn contains(&self, driver: &str) -> bool {
        self.extensions.contains_key(driver) || self.builtins.contains_key(driver)
    }

    /// Sorted, de-duplicated driver ids across built-ins and extensions
    pub fn drivers(&self) -> Vec<String> {
        self.builtins
            .keys()
            .chain(self.extensions.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl<C: ?Sized> Default for CreatorRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::{CreatorError, ErrorKind};
    use crate::engine::types::ConnectionDefinition;

    fn tagged(tag: &'static str) -> impl Creator<str> {
        move |_: &ConnectionDefinition| -> Result<Arc<str>, CreatorError> { Ok(Arc::from(tag)) }
    }

    fn create(registry: &CreatorRegistry<str>, driver: &str) -> Arc<str> {
        registry
            .resolve(driver)
            .expect("driver should resolve")
            .create(&ConnectionDefinition::for_driver(driver))
            .expect("creator should succeed")
    }

    #[test]
    fn resolves_builtin() {
        let registry = CreatorRegistry::new().with_builtin("mysql", tagged("builtin"));

        assert_eq!(&*create(&registry, "mysql"), "builtin");
    }

    #[test]
    fn extension_shadows_builtin_until_unregistered() {
        let mut registry = CreatorRegistry::new().with_builtin("mysql", tagged("builtin"));
        registry.register("mysql", Arc::new(tagged("extension")));

        assert_eq!(&*create(&registry, "mysql"), "extension");

        assert!(registry.unregister("mysql"));
        assert!(!registry.unregister("mysql"));
        assert_eq!(&*create(&registry, "mysql"), "builtin");
    }

    #[test]
    fn last_registration_wins() {
        let mut registry = CreatorRegistry::new();
        registry.register("queue", Arc::new(tagged("first")));
        registry.register("queue", Arc::new(tagged("second")));

        assert_eq!(&*create(&registry, "queue"), "second");
    }

    #[test]
    fn unknown_driver_fails() {
        let registry = CreatorRegistry::<str>::new().with_builtin("mysql", tagged("builtin"));

        let err = registry.resolve("pgsql").err().expect("should fail");
        assert_eq!(err.kind(), ErrorKind::UnknownDriver);
        assert!(!registry.contains("pgsql"));
    }

    #[test]
    fn lists_drivers_once() {
        let mut registry = CreatorRegistry::new()
            .with_builtin("redis", tagged("r"))
            .with_builtin("mysql", tagged("m"));
        registry.register("mysql", Arc::new(tagged("m2")));
        registry.register("amqp", Arc::new(tagged("a")));

        assert_eq!(registry.drivers(), vec!["amqp", "mysql", "redis"]);

        registry.clear_extensions();
        assert_eq!(registry.drivers(), vec!["mysql", "redis"]);
    }
}
