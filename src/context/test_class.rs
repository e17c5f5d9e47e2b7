use crate::di::Container;
use crate::error::{ContainerError, Result};
use crate::extension::TestClassMetadata;
use std::any::{Any, TypeId};
use std::fmt;

/// A type whose tests are driven through the extension lifecycle
///
/// Usually implemented with `#[derive(TestClass)]`:
///
/// ```rust,ignore
/// #[derive(TestClass, Default)]
/// #[extend_with(ResourceController, ResourceValidation)]
/// #[configure(ResourceModule)]
/// #[property("enigma = 42")]
/// struct ResourceTests {
///     #[autowired]
///     resource: Option<Arc<TestResource>>,
/// }
/// ```
pub trait TestClass: Send + Sync + 'static {
    /// Extension declarations attached to this class
    fn metadata() -> TestClassMetadata {
        TestClassMetadata::default()
    }

    /// Populate the container shared by every test of this class
    fn configure(_container: &mut Container) -> Result<()> {
        Ok(())
    }

    /// Inline `key = value` properties, applied over the process environment
    fn properties() -> Vec<(String, String)> {
        Vec::new()
    }

    /// Inject collaborators into a fresh test instance
    fn autowire(&mut self, _container: &Container) -> Result<()> {
        Ok(())
    }
}

/// Runtime identity of a [`TestClass`]
///
/// Two descriptors are equal when they describe the same type.
#[derive(Clone, Copy)]
pub struct TestClassDescriptor {
    type_id: TypeId,
    name: &'static str,
    metadata: fn() -> TestClassMetadata,
    configure: fn(&mut Container) -> Result<()>,
    properties: fn() -> Vec<(String, String)>,
    autowire: fn(&mut (dyn Any + Send), &Container) -> Result<()>,
}

impl TestClassDescriptor {
    pub fn of<T: TestClass>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            metadata: T::metadata,
            configure: T::configure,
            properties: T::properties,
            autowire: autowire_erased::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn metadata(&self) -> TestClassMetadata {
        (self.metadata)()
    }

    pub fn configure(&self, container: &mut Container) -> Result<()> {
        (self.configure)(container)
    }

    pub fn properties(&self) -> Vec<(String, String)> {
        (self.properties)()
    }

    /// Autowire `instance`, which must be a value of the described type
    pub fn autowire(&self, instance: &mut (dyn Any + Send), container: &Container) -> Result<()> {
        (self.autowire)(instance, container)
    }
}

fn autowire_erased<T: TestClass>(instance: &mut (dyn Any + Send), container: &Container) -> Result<()> {
    instance
        .downcast_mut::<T>()
        .ok_or_else(|| ContainerError::downcast_failed(std::any::type_name::<T>()))?
        .autowire(container)
}

impl PartialEq for TestClassDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TestClassDescriptor {}

impl fmt::Debug for TestClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TestClassDescriptor").field(&self.name).finish()
    }
}
