//! Capability traits
//!
//! An extension opts into a lifecycle event by implementing the matching
//! capability trait and exposing it through the corresponding [`Extension`]
//! accessor. The dispatcher only ever calls a capability that is exposed.

use super::Result;
use crate::context::ExtensionContext;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;

/// The lifecycle events an extension can participate in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    BeforeAll,
    AfterAll,
    PostProcessTestInstance,
    BeforeEach,
    AfterEach,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::BeforeAll,
        Capability::AfterAll,
        Capability::PostProcessTestInstance,
        Capability::BeforeEach,
        Capability::AfterEach,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::BeforeAll => "BeforeAll",
            Capability::AfterAll => "AfterAll",
            Capability::PostProcessTestInstance => "PostProcessTestInstance",
            Capability::BeforeEach => "BeforeEach",
            Capability::AfterEach => "AfterEach",
        };
        f.write_str(name)
    }
}

/// Called once before any test of a test class runs
#[async_trait]
pub trait BeforeAllCallback: Send + Sync {
    async fn before_all(&self, context: &dyn ExtensionContext) -> Result<()>;
}

/// Called once after every test of a test class has run
#[async_trait]
pub trait AfterAllCallback: Send + Sync {
    async fn after_all(&self, context: &dyn ExtensionContext) -> Result<()>;
}

/// Called with each freshly created test instance before it is used
///
/// The instance is the concrete test class value; downcast it to inspect or
/// modify its fields.
#[async_trait]
pub trait TestInstancePostProcessor: Send + Sync {
    async fn post_process_test_instance(
        &self,
        instance: &mut (dyn Any + Send),
        context: &dyn ExtensionContext,
    ) -> Result<()>;
}

/// Called before each test method
#[async_trait]
pub trait BeforeEachCallback: Send + Sync {
    async fn before_each(&self, context: &dyn ExtensionContext) -> Result<()>;
}

/// Called after each test method
#[async_trait]
pub trait AfterEachCallback: Send + Sync {
    async fn after_each(&self, context: &dyn ExtensionContext) -> Result<()>;
}

/// An object that takes part in zero or more lifecycle events
///
/// Extensions are resolved from the test class container, so they are shared
/// singletons and receive `&self`. Each accessor returns `Some` only for the
/// capabilities the extension actually implements. `#[derive(Extension)]`
/// with `#[capabilities(...)]` generates these accessors.
///
/// # Example
///
/// ```rust,ignore
/// use di_extensions::prelude::*;
///
/// #[derive(Injectable, Extension)]
/// #[capabilities(before_all, after_all)]
/// pub struct ResourceController {
///     resource: Arc<TestResource>,
/// }
///
/// #[async_trait]
/// impl BeforeAllCallback for ResourceController {
///     async fn before_all(&self, _context: &dyn ExtensionContext) -> Result<(), ExtensionError> {
///         self.resource.open();
///         Ok(())
///     }
/// }
/// ```
pub trait Extension: Send + Sync + 'static {
    /// Name used in logs and error messages
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_before_all(&self) -> Option<&dyn BeforeAllCallback> {
        None
    }

    fn as_after_all(&self) -> Option<&dyn AfterAllCallback> {
        None
    }

    fn as_test_instance_post_processor(&self) -> Option<&dyn TestInstancePostProcessor> {
        None
    }

    fn as_before_each(&self) -> Option<&dyn BeforeEachCallback> {
        None
    }

    fn as_after_each(&self) -> Option<&dyn AfterEachCallback> {
        None
    }
}

impl<'a> dyn Extension + 'a {
    /// Whether this extension participates in `capability`
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::BeforeAll => self.as_before_all().is_some(),
            Capability::AfterAll => self.as_after_all().is_some(),
            Capability::PostProcessTestInstance => {
                self.as_test_instance_post_processor().is_some()
            }
            Capability::BeforeEach => self.as_before_each().is_some(),
            Capability::AfterEach => self.as_after_each().is_some(),
        }
    }

    /// Every capability this extension exposes, in lifecycle order
    pub fn capabilities(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.supports(*capability))
            .collect()
    }
}
