use super::TestClassDescriptor;
use crate::common::OnceMap;
use crate::config::Properties;
use crate::di::Container;
use crate::error::{ContainerError, Result};
use std::any::TypeId;
use std::sync::Arc;

/// Hands out the container associated with a test class
pub trait ContainerSource: Send + Sync {
    fn container_for(&self, test_class: &TestClassDescriptor) -> Result<Arc<Container>>;
}

/// One container per test class, built on first use and kept for the run
///
/// A container starts with a [`Properties`] service (environment overlaid with
/// the class's inline properties) and is then populated by
/// [`TestClass::configure`](super::TestClass::configure). A class whose
/// configuration fails gets no container; the next request tries again.
#[derive(Default)]
pub struct ContextCache {
    contexts: OnceMap<TypeId, Arc<Container>>,
}

impl ContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(&self, test_class: &TestClassDescriptor) -> Result<Arc<Container>> {
        self.contexts
            .get_or_try_init(test_class.type_id(), || Self::load(test_class))
    }

    fn load(test_class: &TestClassDescriptor) -> Result<Arc<Container>> {
        tracing::debug!("Loading container for {}", test_class.name());

        let mut container = Container::new();
        container.register(Properties::from_env().with_inline(test_class.properties()));
        test_class.configure(&mut container).map_err(|e| {
            tracing::error!("Container for {} failed to load: {}", test_class.name(), e);
            ContainerError::context_load_failed(test_class.name(), e)
        })?;

        tracing::debug!(
            "Loaded container for {} ({} services)",
            test_class.name(),
            container.len()
        );
        Ok(Arc::new(container))
    }

    pub fn contains(&self, test_class: &TestClassDescriptor) -> bool {
        self.contexts.contains(&test_class.type_id())
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl ContainerSource for ContextCache {
    fn container_for(&self, test_class: &TestClassDescriptor) -> Result<Arc<Container>> {
        self.get_or_load(test_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestClass;

    struct Greeting(&'static str);

    struct PlainTests;

    impl TestClass for PlainTests {
        fn configure(container: &mut Container) -> Result<()> {
            container.register(Greeting("hello"));
            Ok(())
        }

        fn properties() -> Vec<(String, String)> {
            vec![("enigma".to_string(), "42".to_string())]
        }
    }

    struct BrokenTests;

    impl TestClass for BrokenTests {
        fn configure(container: &mut Container) -> Result<()> {
            container.resolve::<Greeting>()?;
            Ok(())
        }
    }

    #[test]
    fn test_container_is_loaded_once() {
        let cache = ContextCache::new();
        let descriptor = TestClassDescriptor::of::<PlainTests>();

        let first = cache.get_or_load(&descriptor).unwrap();
        let second = cache.get_or_load(&descriptor).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.resolve::<Greeting>().unwrap().0, "hello");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_properties_are_registered() {
        let cache = ContextCache::new();
        let container = cache
            .get_or_load(&TestClassDescriptor::of::<PlainTests>())
            .unwrap();
        let properties = container.resolve::<Properties>().unwrap();
        assert_eq!(properties.get("enigma").as_deref(), Some("42"));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache = ContextCache::new();
        let descriptor = TestClassDescriptor::of::<BrokenTests>();

        let err = cache.get_or_load(&descriptor).err().unwrap();
        assert!(matches!(err, ContainerError::ContextLoadFailed { .. }));
        assert!(!cache.contains(&descriptor));
        assert!(cache.get_or_load(&descriptor).is_err());
    }
}
