//! Lifecycle dispatch
//!
//! For every event the dispatcher runs the base behavior, then each cached
//! extension that exposes the matching capability, one at a time and in
//! declaration order. The first error ends the event and is returned as is;
//! later extensions are not called.

use super::{
    AfterAllCallback, AfterEachCallback, BeforeAllCallback, BeforeEachCallback, Capability,
    Extension, ExtensionCache, ExtensionError, ExtensionResolver, Result,
    TestInstancePostProcessor,
};
use crate::context::{ContainerExtension, ContainerSource, ContextCache, ExtensionContext};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

/// Drives declared extensions through the lifecycle of their test class
///
/// The dispatcher is itself an [`Extension`] exposing all five capabilities, so
/// a runner registers it once and calls it like any other participant.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = ExtensionDispatcher::new();
/// let class = ExecutionContext::class::<ResourceTests>();
///
/// dispatcher.before_all(&class).await?;
/// let mut tests = ResourceTests::default();
/// dispatcher.post_process_test_instance(&mut tests, &class).await?;
/// // ... run the tests ...
/// dispatcher.after_all(&class).await?;
/// ```
pub struct ExtensionDispatcher<B = ContainerExtension> {
    base: B,
    cache: ExtensionCache,
}

impl ExtensionDispatcher {
    pub fn new() -> Self {
        Self::with_contexts(Arc::new(ContextCache::new()))
    }

    /// Share an existing context cache between the base behavior and resolution
    pub fn with_contexts(contexts: Arc<ContextCache>) -> Self {
        let resolver = ExtensionResolver::new(Arc::clone(&contexts) as Arc<dyn ContainerSource>);
        Self {
            base: ContainerExtension::new(contexts),
            cache: ExtensionCache::new(resolver),
        }
    }
}

impl Default for ExtensionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Extension> ExtensionDispatcher<B> {
    pub fn with_base(base: B, cache: ExtensionCache) -> Self {
        Self { base, cache }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn cache(&self) -> &ExtensionCache {
        &self.cache
    }
}

fn log_failure(capability: Capability, extension: &dyn Extension, error: &ExtensionError) {
    tracing::error!("{} failed for {}: {}", capability, extension.name(), error);
}

#[async_trait]
impl<B: Extension> BeforeAllCallback for ExtensionDispatcher<B> {
    async fn before_all(&self, context: &dyn ExtensionContext) -> Result<()> {
        if let Some(base) = self.base.as_before_all() {
            base.before_all(context).await?;
        }

        let extensions = self.cache.get_extensions(context)?;
        for extension in extensions.iter() {
            if let Some(callback) = extension.as_before_all() {
                tracing::debug!("BeforeAll: {}", extension.name());
                callback
                    .before_all(context)
                    .await
                    .inspect_err(|e| log_failure(Capability::BeforeAll, &**extension, e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B: Extension> AfterAllCallback for ExtensionDispatcher<B> {
    async fn after_all(&self, context: &dyn ExtensionContext) -> Result<()> {
        if let Some(base) = self.base.as_after_all() {
            base.after_all(context).await?;
        }

        let extensions = self.cache.get_extensions(context)?;
        for extension in extensions.iter() {
            if let Some(callback) = extension.as_after_all() {
                tracing::debug!("AfterAll: {}", extension.name());
                callback
                    .after_all(context)
                    .await
                    .inspect_err(|e| log_failure(Capability::AfterAll, &**extension, e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B: Extension> TestInstancePostProcessor for ExtensionDispatcher<B> {
    async fn post_process_test_instance(
        &self,
        instance: &mut (dyn Any + Send),
        context: &dyn ExtensionContext,
    ) -> Result<()> {
        if let Some(base) = self.base.as_test_instance_post_processor() {
            base.post_process_test_instance(&mut *instance, context).await?;
        }

        let extensions = self.cache.get_extensions(context)?;
        for extension in extensions.iter() {
            if let Some(callback) = extension.as_test_instance_post_processor() {
                tracing::debug!("PostProcessTestInstance: {}", extension.name());
                callback
                    .post_process_test_instance(&mut *instance, context)
                    .await
                    .inspect_err(|e| {
                        log_failure(Capability::PostProcessTestInstance, &**extension, e)
                    })?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B: Extension> BeforeEachCallback for ExtensionDispatcher<B> {
    async fn before_each(&self, context: &dyn ExtensionContext) -> Result<()> {
        if let Some(base) = self.base.as_before_each() {
            base.before_each(context).await?;
        }

        let extensions = self.cache.get_extensions(context)?;
        for extension in extensions.iter() {
            if let Some(callback) = extension.as_before_each() {
                tracing::debug!("BeforeEach: {}", extension.name());
                callback
                    .before_each(context)
                    .await
                    .inspect_err(|e| log_failure(Capability::BeforeEach, &**extension, e))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<B: Extension> AfterEachCallback for ExtensionDispatcher<B> {
    async fn after_each(&self, context: &dyn ExtensionContext) -> Result<()> {
        if let Some(base) = self.base.as_after_each() {
            base.after_each(context).await?;
        }

        let extensions = self.cache.get_extensions(context)?;
        for extension in extensions.iter() {
            if let Some(callback) = extension.as_after_each() {
                tracing::debug!("AfterEach: {}", extension.name());
                callback
                    .after_each(context)
                    .await
                    .inspect_err(|e| log_failure(Capability::AfterEach, &**extension, e))?;
            }
        }
        Ok(())
    }
}

impl<B: Extension> Extension for ExtensionDispatcher<B> {
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
