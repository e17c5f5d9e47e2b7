use super::{ContextCache, ExtensionContext};
use crate::extension::{
    AfterAllCallback, AfterEachCallback, BeforeAllCallback, BeforeEachCallback, Extension,
    ExtensionError, Result, TestInstancePostProcessor,
};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Base behavior that runs ahead of declared extensions for every event
///
/// Loads the test class container before the first test and autowires each
/// test instance from it. The remaining events only trace. Contexts without a
/// test class are ignored.
pub struct ContainerExtension {
    contexts: Arc<ContextCache>,
}

impl ContainerExtension {
    pub fn new(contexts: Arc<ContextCache>) -> Self {
        Self { contexts }
    }

    pub fn contexts(&self) -> &Arc<ContextCache> {
        &self.contexts
    }
}

#[async_trait]
impl BeforeAllCallback for ContainerExtension {
    async fn before_all(&self, context: &dyn ExtensionContext) -> Result<()> {
        let Some(test_class) = context.test_class() else {
            return Ok(());
        };
        self.contexts
            .get_or_load(test_class)
            .map_err(|e| ExtensionError::context(test_class.name(), e))?;
        Ok(())
    }
}

#[async_trait]
impl AfterAllCallback for ContainerExtension {
    async fn after_all(&self, context: &dyn ExtensionContext) -> Result<()> {
        tracing::trace!("AfterAll: {}", context.display_name());
        Ok(())
    }
}

#[async_trait]
impl TestInstancePostProcessor for ContainerExtension {
    async fn post_process_test_instance(
        &self,
        instance: &mut (dyn Any + Send),
        context: &dyn ExtensionContext,
    ) -> Result<()> {
        let Some(test_class) = context.test_class() else {
            return Ok(());
        };
        let container = self
            .contexts
            .get_or_load(test_class)
            .map_err(|e| ExtensionError::context(test_class.name(), e))?;
        test_class
            .autowire(instance, &container)
            .map_err(|e| ExtensionError::context(test_class.name(), e))?;
        tracing::debug!("Autowired test instance of {}", test_class.name());
        Ok(())
    }
}

#[async_trait]
impl BeforeEachCallback for ContainerExtension {
    async fn before_each(&self, context: &dyn ExtensionContext) -> Result<()> {
        tracing::trace!("BeforeEach: {}", context.display_name());
        Ok(())
    }
}

#[async_trait]
impl AfterEachCallback for ContainerExtension {
    async fn after_each(&self, context: &dyn ExtensionContext) -> Result<()> {
        tracing::trace!("AfterEach: {}", context.display_name());
        Ok(())
    }
}

impl Extension for ContainerExtension {
    fn as_before_all(&self) -> Option<&dyn BeforeAllCallback> {
        Some(self)
    }

    fn as_after_all(&self) -> Option<&dyn AfterAllCallback> {
        Some(self)
    }

    fn as_test_instance_post_processor(&self) -> Option<&dyn TestInstancePostProcessor> {
        Some(self)
    }

    fn as_before_each(&self) -> Option<&dyn BeforeEachCallback> {
        Some(self)
    }

    fn as_after_each(&self) -> Option<&dyn AfterEachCallback> {
        Some(self)
    }
}
