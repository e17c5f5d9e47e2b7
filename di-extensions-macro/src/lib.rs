use proc_macro::TokenStream;

mod extension;
mod injectable;
mod module;
mod test_class;

/// Derive macro for making a struct injectable into the DI container
///
/// Fields of type `Arc<T>` are resolved with `Container::resolve`, fields of
/// type `Arc<dyn Trait>` with `Container::resolve_trait`. Mark a field
/// `#[inject(default)]` to build it with `Default` instead.
///
/// # Example
/// ```ignore
/// use di_extensions::prelude::*;
///
/// #[derive(Injectable)]
/// pub struct ResourceValidation {
///     resource: Arc<TestResource>,
///     #[inject(default)]
///     checks: AtomicUsize,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}

/// Derive macro exposing the lifecycle capabilities an extension implements
///
/// Each capability named in `#[capabilities(...)]` must have a matching trait
/// impl: `before_all`, `after_all`, `post_process`, `before_each`, `after_each`.
///
/// # Example
/// ```ignore
/// #[derive(Injectable, Extension)]
/// #[capabilities(before_all, after_all)]
/// pub struct ResourceController {
///     resource: Arc<TestResource>,
/// }
/// ```
#[proc_macro_derive(Extension, attributes(capabilities))]
pub fn derive_extension(input: TokenStream) -> TokenStream {
    extension::derive_extension(input)
}

/// Derive macro declaring a test class and its extensions
///
/// - `#[extend_with(A, B)]`: repeatable, declarations concatenate in order
/// - `#[compose(Bundle)]`: apply a `#[derive(ComposedExtensions)]` bundle
/// - `#[configure(Module)]`: modules registered into the class container
/// - `#[property("key = value")]`: inline properties
/// - `#[autowired]` on `Option<Arc<T>>` fields: filled from the container
///
/// # Example
/// ```ignore
/// #[derive(TestClass, Default)]
/// #[extend_with(ResourceController)]
/// #[extend_with(ResourceValidation)]
/// #[configure(ResourceModule)]
/// #[property("enigma = 42")]
/// struct ResourceTests {
///     #[autowired]
///     resource: Option<Arc<TestResource>>,
/// }
/// ```
#[proc_macro_derive(
    TestClass,
    attributes(extend_with, compose, configure, property, autowired)
)]
pub fn derive_test_class(input: TokenStream) -> TokenStream {
    test_class::derive_test_class(input)
}

/// Derive macro for a reusable bundle of extension declarations
///
/// # Example
/// ```ignore
/// #[derive(ComposedExtensions)]
/// #[extend_with(ResourceController, ResourceValidation)]
/// pub struct ManagedResource;
/// ```
#[proc_macro_derive(ComposedExtensions, attributes(extend_with, compose))]
pub fn derive_composed_extensions(input: TokenStream) -> TokenStream {
    test_class::derive_composed_extensions(input)
}

/// Attribute macro for defining a module of providers
///
/// Providers are injected in the listed order, so a provider may depend on any
/// provider listed before it.
///
/// # Example
/// ```ignore
/// use di_extensions::module;
///
/// #[module(
///     imports = [CommonModule],
///     providers = [TestResource, ResourceController],
///     bindings = [(dyn Clock => SystemClock)],
/// )]
/// pub struct ResourceModule;
/// ```
#[proc_macro_attribute]
pub fn module(attr: TokenStream, item: TokenStream) -> TokenStream {
    module::module_attribute(attr, item)
}
