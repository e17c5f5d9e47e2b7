use super::{Extension, ExtensionResolver, Result};
use crate::common::OnceMap;
use crate::context::{ExtensionContext, TestClassDescriptor};
use std::any::TypeId;
use std::sync::Arc;

/// Resolved extensions of one test class, in declaration order
pub type ExtensionSet = Arc<[Arc<dyn Extension>]>;

/// Resolved extension sets keyed by test class
///
/// Each set is resolved at most once, even when several threads ask for the
/// same class at the same time, and is never replaced afterwards. A failed
/// resolution stores nothing.
pub struct ExtensionCache {
    resolver: ExtensionResolver,
    entries: OnceMap<TypeId, ExtensionSet>,
    empty: ExtensionSet,
}

impl ExtensionCache {
    pub fn new(resolver: ExtensionResolver) -> Self {
        Self {
            resolver,
            entries: OnceMap::new(),
            empty: Arc::from(Vec::new()),
        }
    }

    /// Extensions for the test class in scope
    ///
    /// A context without a test class has no extensions; nothing is resolved
    /// or cached for it.
    pub fn get_extensions(&self, context: &dyn ExtensionContext) -> Result<ExtensionSet> {
        match context.test_class() {
            Some(test_class) => self.get_for_class(test_class),
            None => Ok(Arc::clone(&self.empty)),
        }
    }

    pub fn get_for_class(&self, test_class: &TestClassDescriptor) -> Result<ExtensionSet> {
        self.entries.get_or_try_init(test_class.type_id(), || {
            let extensions = self.resolver.resolve(test_class)?;
            tracing::debug!(
                "Cached {} extension(s) for {}",
                extensions.len(),
                test_class.name()
            );
            Ok(Arc::from(extensions))
        })
    }

    pub fn is_cached(&self, test_class: &TestClassDescriptor) -> bool {
        self.entries.contains(&test_class.type_id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContainerSource, ContextCache, ExecutionContext, TestClass};
    use crate::di::Container;
    use crate::error::ContainerError;
    use crate::extension::{ExtensionClass, ExtensionError, TestClassMetadata};
    use std::sync::Barrier;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    struct First;
    struct Second;
    struct Unregistered;

    impl Extension for First {}
    impl Extension for Second {}
    impl Extension for Unregistered {}

    struct OrderedTests;

    impl TestClass for OrderedTests {
        fn metadata() -> TestClassMetadata {
            TestClassMetadata::builder()
                .extend_with([ExtensionClass::of::<Second>()])
                .extend_with([ExtensionClass::of::<First>(), ExtensionClass::of::<Second>()])
        }

        fn configure(container: &mut Container) -> crate::Result<()> {
            container.register(First).register(Second);
            Ok(())
        }
    }

    struct MissingTests;

    impl TestClass for MissingTests {
        fn metadata() -> TestClassMetadata {
            TestClassMetadata::builder()
                .extend_with([ExtensionClass::of::<First>(), ExtensionClass::of::<Unregistered>()])
        }

        fn configure(container: &mut Container) -> crate::Result<()> {
            container.register(First);
            Ok(())
        }
    }

    /// Counts container requests and can be slowed down to widen races
    struct CountingSource {
        inner: ContextCache,
        requests: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                inner: ContextCache::new(),
                requests: AtomicUsize::new(0),
                delay,
            })
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl ContainerSource for CountingSource {
        fn container_for(
            &self,
            test_class: &TestClassDescriptor,
        ) -> crate::Result<Arc<Container>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            self.inner.get_or_load(test_class)
        }
    }

    fn cache_with(source: &Arc<CountingSource>) -> ExtensionCache {
        ExtensionCache::new(ExtensionResolver::new(Arc::clone(source) as Arc<dyn ContainerSource>))
    }

    #[test]
    fn test_extensions_follow_declaration_order() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = cache_with(&source);

        let extensions = cache
            .get_extensions(&ExecutionContext::class::<OrderedTests>())
            .unwrap();

        let names: Vec<_> = extensions.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                std::any::type_name::<Second>(),
                std::any::type_name::<First>(),
                std::any::type_name::<Second>(),
            ]
        );
        // The same singleton backs both Second entries.
        assert!(Arc::ptr_eq(&extensions[0], &extensions[2]));
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = cache_with(&source);
        let context = ExecutionContext::method::<OrderedTests>("runs");

        let first = cache.get_extensions(&context).unwrap();
        let second = cache.get_extensions(&context).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.requests(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_first_lookup_resolves_once() {
        let source = CountingSource::new(Duration::from_millis(25));
        let cache = Arc::new(cache_with(&source));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache
                        .get_extensions(&ExecutionContext::class::<OrderedTests>())
                        .unwrap()
                })
            })
            .collect();

        let sets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(source.requests(), 1);
        assert!(sets.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_suite_context_has_no_extensions() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = cache_with(&source);

        let extensions = cache
            .get_extensions(&ExecutionContext::suite("all tests"))
            .unwrap();

        assert!(extensions.is_empty());
        assert_eq!(source.requests(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unresolvable_extension_is_not_cached() {
        let source = CountingSource::new(Duration::ZERO);
        let cache = cache_with(&source);
        let descriptor = TestClassDescriptor::of::<MissingTests>();

        let err = cache.get_for_class(&descriptor).err().unwrap();
        match err {
            ExtensionError::Resolution { source: cause, .. } => {
                assert!(matches!(cause, ContainerError::DependencyNotFound { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!cache.is_cached(&descriptor));

        assert!(cache.get_for_class(&descriptor).is_err());
        assert_eq!(source.requests(), 2);
    }
}
