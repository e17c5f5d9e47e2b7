//! # di-extensions
//!
//! Container-managed test lifecycle extensions with built-in dependency injection.
//!
//! Test classes declare the extensions that observe their lifecycle
//! (before-all, after-all, instance post-processing, before-each, after-each).
//! Each declared extension is resolved from the test class's DI container
//! rather than constructed directly, so extensions get their collaborators
//! injected.
//!
//! ## Features
//!
//! - **Dependency Injection**: thread-safe container with trait bindings and `#[derive(Injectable)]`
//! - **Declarative Extensions**: repeatable `#[extend_with(...)]` and reusable `#[compose(...)]` bundles
//! - **Capability Traits**: extensions opt into exactly the lifecycle events they handle
//! - **Resolve Once**: extension sets are cached per test class, safely under parallel runners
//! - **Fail-Fast Dispatch**: the first failing callback stops the event and is returned unchanged
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use di_extensions::prelude::*;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! // 1. A shared fixture
//! #[derive(Injectable)]
//! pub struct TestResource {}
//!
//! // 2. An extension that manages it
//! #[derive(Injectable, Extension)]
//! #[capabilities(before_all)]
//! pub struct ResourceController {
//!     resource: Arc<TestResource>,
//! }
//!
//! #[async_trait]
//! impl BeforeAllCallback for ResourceController {
//!     async fn before_all(&self, _context: &dyn ExtensionContext) -> Result<(), ExtensionError> {
//!         Ok(())
//!     }
//! }
//!
//! // 3. The providers
//! #[module(providers = [TestResource, ResourceController])]
//! pub struct ResourceModule;
//!
//! // 4. The test class
//! #[derive(TestClass, Default)]
//! #[extend_with(ResourceController)]
//! #[configure(ResourceModule)]
//! struct ResourceTests;
//!
//! #[tokio::main]
//! async fn main() {
//!     let dispatcher = ExtensionDispatcher::new();
//!     let class = ExecutionContext::class::<ResourceTests>();
//!     dispatcher.before_all(&class).await.unwrap();
//!     dispatcher.after_all(&class).await.unwrap();
//! }
//! ```

extern crate self as di_extensions;

pub mod common;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod extension;

// Re-export core types
pub use config::Properties;
pub use context::{
    ContainerExtension, ContainerSource, ContextCache, ExecutionContext, ExtensionContext,
    TestClass, TestClassDescriptor,
};
pub use di::{Container, ContainerBuilder, Injectable, Module};
pub use error::{ContainerError, Result};
pub use extension::{
    ComposedDeclaration, ComposedExtensions, Extension, ExtensionCache, ExtensionClass,
    ExtensionDispatcher, ExtensionError, ExtensionResolver, TestClassMetadata,
};

// Re-export macros
pub use di_extensions_macro::{
    ComposedExtensions as DeriveComposedExtensions, Extension as DeriveExtension,
    Injectable as DeriveInjectable, TestClass as DeriveTestClass, module,
};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;

/// Prelude module for convenient imports
///
/// ```
/// use di_extensions::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::Properties;
    pub use crate::context::{
        ContainerExtension, ContextCache, ExecutionContext, ExtensionContext, Scope, TestClass,
        TestClassDescriptor,
    };
    pub use crate::di::{Container, ContainerBuilder, Injectable, Module};
    pub use crate::error::ContainerError;
    pub use crate::extension::{
        AfterAllCallback, AfterEachCallback, BeforeAllCallback, BeforeEachCallback, Capability,
        ComposedDeclaration, ComposedExtensions, Extension, ExtensionCache, ExtensionClass,
        ExtensionDispatcher, ExtensionError, ExtensionResolver, TestClassMetadata,
        TestInstancePostProcessor,
    };
    pub use crate::{
        DeriveComposedExtensions as ComposedExtensions, DeriveExtension as Extension,
        DeriveInjectable as Injectable, DeriveTestClass as TestClass, module,
    };
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
