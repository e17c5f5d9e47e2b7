//! Extension-specific error types

use crate::error::ContainerError;
use thiserror::Error;

/// Errors that surface from a lifecycle event
///
/// The dispatcher hands these back exactly as the failing participant
/// produced them.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// The declared extensions of a test class could not be resolved
    #[error("Failed to resolve extensions for {test_class}: {source}")]
    Resolution {
        /// Name of the test class whose extension set failed
        test_class: &'static str,
        /// The underlying container failure
        #[source]
        source: ContainerError,
    },

    /// The base behavior could not prepare the test class container
    #[error("Failed to prepare test context for {test_class}: {source}")]
    Context {
        /// Name of the test class
        test_class: &'static str,
        /// The underlying container failure
        #[source]
        source: ContainerError,
    },

    /// A lifecycle callback failed
    #[error("Callback failed in {extension}: {message}")]
    CallbackFailed {
        /// Name of the extension whose callback failed
        extension: String,
        /// Error message
        message: String,
    },

    /// A participant signalled that execution should not proceed
    #[error("Execution aborted: {reason}")]
    Aborted {
        /// Why execution stopped
        reason: String,
    },

    /// Any other error raised inside a callback
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExtensionError {
    /// Create a resolution failure error
    pub fn resolution(test_class: &'static str, source: ContainerError) -> Self {
        Self::Resolution { test_class, source }
    }

    /// Create a test context failure error
    pub fn context(test_class: &'static str, source: ContainerError) -> Self {
        Self::Context { test_class, source }
    }

    /// Create a callback failure error
    pub fn callback_failed(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallbackFailed {
            extension: extension.into(),
            message: message.into(),
        }
    }

    /// Create an abort signal
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    /// Whether this error came from resolving extensions rather than running them
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

/// A specialized Result type for lifecycle events
pub type Result<T> = std::result::Result<T, ExtensionError>;
