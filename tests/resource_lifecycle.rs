use di_extensions::prelude::*;
use std::any::Any;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Injectable)]
pub struct TestResource {
    #[inject(default)]
    open: AtomicBool,
    #[inject(default)]
    history: Mutex<Vec<&'static str>>,
}

impl TestResource {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.history.lock().unwrap().push("open");
        tracing::info!("Opened TestResource.");
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.history.lock().unwrap().push("close");
        tracing::info!("Closed TestResource.");
    }

    fn history(&self) -> Vec<&'static str> {
        self.history.lock().unwrap().clone()
    }
}

#[derive(Injectable, Extension)]
#[capabilities(before_all, after_all)]
pub struct ResourceController {
    resource: Arc<TestResource>,
}

#[async_trait]
impl BeforeAllCallback for ResourceController {
    async fn before_all(&self, _context: &dyn ExtensionContext) -> Result<(), ExtensionError> {
        self.resource.open();
        Ok(())
    }
}

#[async_trait]
impl AfterAllCallback for ResourceController {
    async fn after_all(&self, _context: &dyn ExtensionContext) -> Result<(), ExtensionError> {
        self.resource.close();
        Ok(())
    }
}

#[derive(Injectable, Extension)]
#[capabilities(after_all)]
pub struct ResourceValidation {
    resource: Arc<TestResource>,
}

#[async_trait]
impl AfterAllCallback for ResourceValidation {
    async fn after_all(&self, _context: &dyn ExtensionContext) -> Result<(), ExtensionError> {
        if self.resource.is_open() {
            return Err(ExtensionError::callback_failed(
                "ResourceValidation",
                "TestResource should have been closed",
            ));
        }
        self.resource.history.lock().unwrap().push("validated");
        Ok(())
    }
}

/// Marks each test instance it sees
#[derive(Injectable, Extension)]
#[capabilities(post_process)]
pub struct InstanceMarker {}

#[async_trait]
impl TestInstancePostProcessor for InstanceMarker {
    async fn post_process_test_instance(
        &self,
        instance: &mut (dyn Any + Send),
        _context: &dyn ExtensionContext,
    ) -> Result<(), ExtensionError> {
        if let Some(tests) = instance.downcast_mut::<ResourceTests>() {
            tests.marked = true;
        }
        Ok(())
    }
}

#[module(providers = [TestResource, ResourceController, ResourceValidation, InstanceMarker])]
pub struct ResourceModule;

pub trait ResourceState: Send + Sync {
    fn is_open(&self) -> bool;
}

impl ResourceState for TestResource {
    fn is_open(&self) -> bool {
        TestResource::is_open(self)
    }
}

#[module(
    imports = [ResourceModule],
    bindings = [(dyn ResourceState => TestResource)],
)]
pub struct BoundResourceModule;

#[derive(ComposedExtensions)]
#[extend_with(InstanceMarker)]
pub struct MarkedInstances;

#[derive(TestClass, Default)]
#[extend_with(ResourceController, ResourceValidation)]
#[compose(MarkedInstances)]
#[configure(ResourceModule)]
#[property("enigma = 42")]
struct ResourceTests {
    #[autowired]
    resource: Option<Arc<TestResource>>,
    #[autowired]
    properties: Option<Arc<Properties>>,
    marked: bool,
}

#[derive(TestClass)]
#[extend_with(ResourceValidation)]
#[extend_with(ResourceController)]
#[configure(ResourceModule)]
struct ValidateFirstTests;

#[derive(TestClass)]
#[extend_with(ResourceController, ResourceValidation)]
struct UnconfiguredTests;

#[tokio::test]
async fn resource_is_opened_for_tests_and_closed_after() {
    let _ = tracing_subscriber::fmt::try_init();
    let dispatcher = ExtensionDispatcher::new();
    let class = ExecutionContext::class::<ResourceTests>();

    dispatcher.before_all(&class).await.unwrap();

    let mut tests = ResourceTests::default();
    dispatcher
        .post_process_test_instance(&mut tests, &class)
        .await
        .unwrap();
    assert!(tests.marked);

    let resource = tests.resource.clone().unwrap();
    let method = ExecutionContext::method::<ResourceTests>("resource_should_have_been_opened");
    dispatcher.before_each(&method).await.unwrap();
    assert!(resource.is_open(), "TestResource should have been opened.");
    dispatcher.after_each(&method).await.unwrap();

    dispatcher.after_all(&class).await.unwrap();
    assert!(!resource.is_open());
    assert_eq!(resource.history(), vec!["open", "close", "validated"]);
}

#[tokio::test]
async fn inline_properties_reach_the_test_instance() {
    let dispatcher = ExtensionDispatcher::new();
    let class = ExecutionContext::class::<ResourceTests>();
    let mut tests = ResourceTests::default();

    dispatcher
        .post_process_test_instance(&mut tests, &class)
        .await
        .unwrap();

    let properties = tests.properties.unwrap();
    assert_eq!(properties.get("enigma").as_deref(), Some("42"));
}

#[tokio::test]
async fn validation_declared_first_fails_after_all() {
    let dispatcher = ExtensionDispatcher::new();
    let class = ExecutionContext::class::<ValidateFirstTests>();

    dispatcher.before_all(&class).await.unwrap();
    let err = dispatcher.after_all(&class).await.unwrap_err();

    assert!(matches!(err, ExtensionError::CallbackFailed { .. }));
    let resource = dispatcher
        .base()
        .contexts()
        .get_or_load(&TestClassDescriptor::of::<ValidateFirstTests>())
        .unwrap()
        .resolve::<TestResource>()
        .unwrap();
    // The controller is never reached, so the resource stays open.
    assert!(resource.is_open());
}

#[tokio::test]
async fn unmanaged_extensions_fail_resolution() {
    let dispatcher = ExtensionDispatcher::new();
    let class = ExecutionContext::class::<UnconfiguredTests>();

    let err = dispatcher.before_all(&class).await.unwrap_err();
    assert!(err.is_resolution());
    assert!(
        !dispatcher
            .cache()
            .is_cached(&TestClassDescriptor::of::<UnconfiguredTests>())
    );

    // Nothing was stored, so the next event resolves again and fails the same way.
    let err = dispatcher.after_all(&class).await.unwrap_err();
    assert!(err.is_resolution());
}

#[test]
fn derived_declarations_keep_source_order() {
    let classes = ExtensionResolver::extension_classes(&TestClassDescriptor::of::<ResourceTests>());
    assert_eq!(
        classes,
        vec![
            ExtensionClass::of::<ResourceController>(),
            ExtensionClass::of::<ResourceValidation>(),
            ExtensionClass::of::<InstanceMarker>(),
        ]
    );

    let classes =
        ExtensionResolver::extension_classes(&TestClassDescriptor::of::<ValidateFirstTests>());
    assert_eq!(
        classes,
        vec![
            ExtensionClass::of::<ResourceValidation>(),
            ExtensionClass::of::<ResourceController>(),
        ]
    );
}

#[test]
fn derived_extensions_expose_declared_capabilities() {
    let container = ResourceModule::create_container().unwrap();
    let controller: Arc<dyn Extension> = container.resolve::<ResourceController>().unwrap();
    let validation: Arc<dyn Extension> = container.resolve::<ResourceValidation>().unwrap();

    assert_eq!(
        controller.capabilities(),
        vec![Capability::BeforeAll, Capability::AfterAll]
    );
    assert_eq!(validation.capabilities(), vec![Capability::AfterAll]);
}

#[test]
fn module_imports_and_trait_bindings_share_one_resource() {
    let container = BoundResourceModule::create_container().unwrap();
    let state = container.resolve_trait::<dyn ResourceState>().unwrap();
    assert!(!state.is_open());

    container.resolve::<TestResource>().unwrap().open();
    assert!(state.is_open());
    assert!(container.contains::<ResourceController>());
}
