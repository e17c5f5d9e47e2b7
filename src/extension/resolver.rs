use super::{Extension, ExtensionClass, ExtensionError, Result};
use crate::context::{ContainerSource, TestClassDescriptor};
use std::sync::Arc;

/// Turns a test class's declarations into managed extension instances
pub struct ExtensionResolver {
    containers: Arc<dyn ContainerSource>,
}

impl ExtensionResolver {
    pub fn new(containers: Arc<dyn ContainerSource>) -> Self {
        Self { containers }
    }

    /// Declared extension classes in discovery order
    pub fn extension_classes(test_class: &TestClassDescriptor) -> Vec<ExtensionClass> {
        test_class.metadata().extension_classes()
    }

    /// Resolve every declared extension class of `test_class`
    ///
    /// Fails as a whole if the container cannot be obtained or any single class
    /// is not managed by it.
    pub fn resolve(&self, test_class: &TestClassDescriptor) -> Result<Vec<Arc<dyn Extension>>> {
        let classes = Self::extension_classes(test_class);
        if classes.is_empty() {
            tracing::debug!("No extensions declared on {}", test_class.name());
            return Ok(Vec::new());
        }

        let container = self
            .containers
            .container_for(test_class)
            .map_err(|e| ExtensionError::resolution(test_class.name(), e))?;

        classes
            .iter()
            .map(|class| {
                tracing::debug!("Resolving {} for {}", class.name(), test_class.name());
                class.resolve(&container).map_err(|e| {
                    tracing::error!(
                        "Extension {} for {} could not be resolved: {}",
                        class.name(),
                        test_class.name(),
                        e
                    );
                    ExtensionError::resolution(test_class.name(), e)
                })
            })
            .collect()
    }
}
