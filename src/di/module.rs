use crate::di::Container;
use crate::error::Result;

/// A group of providers registered together
///
/// Modules are typically defined using the `#[module]` macro, which implements
/// this trait and generates the registration logic. A test class names its
/// module with `#[configure(...)]` to populate its container.
///
/// # Example
/// ```ignore
/// use di_extensions::module;
///
/// #[module(providers = [TestResource, ResourceController, ResourceValidation])]
/// pub struct ResourceModule;
/// ```
pub trait Module {
    /// Register all providers in this module
    fn register(container: &mut Container) -> Result<()>;
}
