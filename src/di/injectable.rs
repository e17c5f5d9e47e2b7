use crate::di::Container;
use crate::error::Result;

/// Trait for types that can be constructed from the DI container
///
/// This trait is typically implemented automatically via the `#[derive(Injectable)]` macro.
/// Extensions usually derive it so their collaborators come from the test class container.
///
/// # Example
/// ```ignore
/// use di_extensions::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct ResourceController {
///     // This field will be resolved from the container
///     resource: Arc<TestResource>,
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Create an instance by resolving dependencies from the container
    ///
    /// # Errors
    /// Returns an error if any required dependency is not found in the container.
    fn inject(container: &Container) -> Result<Self>;
}
