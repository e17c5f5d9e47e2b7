use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContainerError>;

/// Errors raised while building or resolving from a [`Container`](crate::Container).
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Dependency not found: {type_name}")]
    DependencyNotFound { type_name: String },

    #[error("Ambiguous dependency: {type_name} is bound to {candidates:?}")]
    AmbiguousDependency {
        type_name: String,
        candidates: Vec<&'static str>,
    },

    #[error("Failed to downcast type: {type_name}")]
    DowncastFailed { type_name: String },

    #[error("Failed to load container for test class {test_class}: {source}")]
    ContextLoadFailed {
        test_class: &'static str,
        #[source]
        source: Box<ContainerError>,
    },
}

impl ContainerError {
    pub(crate) fn not_found<T: ?Sized>() -> Self {
        Self::DependencyNotFound {
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    pub(crate) fn downcast_failed(type_name: impl Into<String>) -> Self {
        Self::DowncastFailed {
            type_name: type_name.into(),
        }
    }

    pub(crate) fn context_load_failed(test_class: &'static str, source: ContainerError) -> Self {
        Self::ContextLoadFailed {
            test_class,
            source: Box::new(source),
        }
    }
}
