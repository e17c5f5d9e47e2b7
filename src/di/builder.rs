use crate::di::{Container, Injectable, Module};
use crate::error::Result;
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Registration order matters: an [`Injectable`] provider resolves its
/// dependencies at the moment it is added, so they must already be present.
///
/// # Example
/// ```
/// use di_extensions::ContainerBuilder;
///
/// struct Clock;
///
/// let container = ContainerBuilder::new()
///     .register(Clock)
///     .build();
/// assert!(container.contains::<Clock>());
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Register a service instance
    pub fn register<T: 'static + Send + Sync>(mut self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    /// Construct `T` from what is registered so far and register it
    pub fn provide<T: Injectable>(mut self) -> Result<Self> {
        let instance = T::inject(&self.container)?;
        self.container.register(instance);
        Ok(self)
    }

    /// Register every provider of a module
    pub fn module<M: Module>(mut self) -> Result<Self> {
        M::register(&mut self.container)?;
        Ok(self)
    }

    /// Bind a trait to a concrete implementation
    ///
    /// This enables resolving `Arc<dyn Trait>` to the registered implementation.
    pub fn bind<Trait, Impl, F>(mut self, caster: F) -> Self
    where
        Trait: ?Sized + 'static + Send + Sync,
        Impl: 'static + Send + Sync,
        F: Fn(Arc<Impl>) -> Arc<Trait> + 'static + Send + Sync,
    {
        self.container.register_trait::<Trait, Impl, F>(caster);
        self
    }

    /// Build the container
    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
