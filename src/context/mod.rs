//! Test class context
//!
//! Everything the extension engine needs to know about a test class: its
//! runtime identity ([`TestClassDescriptor`]), the scope a lifecycle event runs
//! in ([`ExtensionContext`]), the container built for it ([`ContextCache`]) and
//! the base behavior that prepares that container ([`ContainerExtension`]).

mod base;
mod execution;
mod loader;
mod test_class;

pub use base::ContainerExtension;
pub use execution::{ExecutionContext, ExtensionContext, Scope};
pub use loader::{ContainerSource, ContextCache};
pub use test_class::{TestClass, TestClassDescriptor};
