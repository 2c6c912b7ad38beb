//! Core error types for termodoro-core.
//!
//! Nothing in the timer core is fatal: transition failures recover to a work
//! session and delivery failures skip the affected window. These types cover
//! the places where an error is worth reporting to the caller.

use std::path::PathBuf;
use thiserror::Error;

use crate::window::WindowRole;

/// Core error type for termodoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Window channel delivery errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Window host errors
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The timer store task has stopped and no longer accepts messages
    #[error("timer store is not running")]
    StoreClosed,

    /// An IPC channel name that maps to no known command
    #[error("unknown command channel: {0}")]
    UnknownCommand(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A duration or count that must be at least one was zero
    #[error("'{field}' must be greater than zero")]
    NonPositive { field: &'static str },

    /// The speed preset cycle has no usable entries
    #[error("speed presets must contain at least one non-zero multiplier")]
    EmptySpeedPresets,

    /// A speed multiplier above the supported maximum
    #[error("speed multiplier {factor} exceeds the maximum of {max}")]
    SpeedOutOfRange { factor: u32, max: u32 },

    /// The completed-session counter cannot be incremented any further
    #[error("completed session counter overflowed")]
    CounterOverflow,
}

/// Errors delivering an event to a single window.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The window has been torn down
    #[error("{role} window is closed")]
    Closed { role: WindowRole },

    /// The platform layer refused the message
    #[error("failed to deliver to {role} window: {message}")]
    Delivery { role: WindowRole, message: String },
}

/// Errors from the platform window host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// No window exists for the role
    #[error("{0} window not found")]
    NotFound(WindowRole),

    /// The platform call failed
    #[error("{role} window: {message}")]
    Platform { role: WindowRole, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
