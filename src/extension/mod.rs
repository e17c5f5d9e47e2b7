//! Container-managed lifecycle extensions
//!
//! A test class declares which extension types observe its lifecycle. Instead
//! of constructing them, the engine resolves each declared type from the test
//! class container, so extensions receive injected collaborators like any other
//! provider.
//!
//! # Flow
//!
//! ```text
//! declarations ─▶ ExtensionResolver ─▶ ExtensionCache ─▶ ExtensionDispatcher ─▶ extensions
//!  (per class)     (container lookup)   (once per class)   (base first, then
//!                                                            capable extensions
//!                                                            in order, fail-fast)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use di_extensions::prelude::*;
//!
//! #[derive(Injectable, Extension)]
//! #[capabilities(before_all, after_all)]
//! pub struct ResourceController {
//!     resource: Arc<TestResource>,
//! }
//!
//! #[derive(TestClass, Default)]
//! #[extend_with(ResourceController)]
//! #[configure(ResourceModule)]
//! struct ResourceTests;
//! ```

mod cache;
mod capability;
mod declaration;
mod dispatcher;
mod error;
mod resolver;

pub use cache::{ExtensionCache, ExtensionSet};
pub use capability::{
    AfterAllCallback, AfterEachCallback, BeforeAllCallback, BeforeEachCallback, Capability,
    Extension, TestInstancePostProcessor,
};
pub use declaration::{
    ComposedDeclaration, ComposedExtensions, ExtensionClass, ExtensionDeclaration,
    TestClassMetadata,
};
pub use dispatcher::ExtensionDispatcher;
pub use error::{ExtensionError, Result};
pub use resolver::ExtensionResolver;
