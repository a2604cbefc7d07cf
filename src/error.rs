//! Error types for a3s-dispatch

use crate::key::EventKey;
use thiserror::Error;

/// Boxed error returned by a failing handler
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving keys, registering subscribers,
/// or dispatching events
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The event type declares no key
    #[error("Configuration error: event type '{event_type}' declares no key")]
    MissingKey { event_type: &'static str },

    /// A key (declared or parsed) failed validation
    #[error("Configuration error: invalid event key '{input}': {reason}")]
    InvalidKey { input: String, reason: String },

    /// Two distinct event types declare the same key
    #[error(
        "Configuration error: key '{key}' is already registered to '{existing}', \
         cannot register '{requested}'"
    )]
    KeyConflict {
        key: EventKey,
        existing: &'static str,
        requested: &'static str,
    },

    /// A handler failed; the remaining handlers of that publish did not run
    #[error("Handler for '{key}' failed: {source}")]
    Handler {
        key: EventKey,
        #[source]
        source: BoxError,
    },

    /// Bus configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DispatchError {
    /// Whether this error is a configuration defect rather than a runtime
    /// handler failure
    pub fn is_configuration(&self) -> bool {
        !matches!(self, DispatchError::Handler { .. })
    }
}

/// Result type alias for dispatch operations
pub type Result<T> = std::result::Result<T, DispatchError>;
