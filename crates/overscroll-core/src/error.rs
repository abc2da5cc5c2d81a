//! Core error types for overscroll-core.
//!
//! This module defines the error hierarchy using thiserror. The recognizer
//! itself treats precondition violations (touch-start while scrolled, while
//! refreshing, ...) as normal no-ops, not errors, so the surface here is
//! small: configuration problems and the boxed error channel of the
//! caller-supplied refresh action.

use thiserror::Error;

/// Core error type for overscroll-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Error channel of the caller-supplied refresh action.
///
/// The controller catches and logs these; they never propagate to the
/// caller of `on_touch_end`.
pub type RefreshError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
