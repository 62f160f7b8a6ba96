//! # PaneKit Common
//!
//! Common utilities, error types, and logging configuration for the PaneKit toolkit.
//!
//! ## Features
//!
//! - Unified error type
//! - Logging configuration and setup
//! - Toolkit configuration (serde, JSON)
//! - Device-loss retry policy for the paint path
//! - Integer geometry (`Rect`, `Region`) shared by style and compositing

use thiserror::Error;

pub mod config;
pub mod geometry;
pub mod logging;
pub mod retry;

pub use config::{CompositorConfig, PaneKitConfig, StyleConfig};
pub use geometry::{Rect, Region};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use retry::{retry_on_device_loss, RetryConfig};

/// Unified error type for PaneKit.
#[derive(Error, Debug)]
pub enum PaneKitError {
    /// Widget-tree errors.
    #[error("Tree error: {message}")]
    Tree {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Painting errors reported by a graphics backend.
    #[error("Paint error: {message}")]
    Paint {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The graphics device was lost; resources must be recreated.
    #[error("Graphics device lost")]
    DeviceLost,

    /// Configuration errors.
    #[error("Config error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl PaneKitError {
    /// Create a tree error.
    pub fn tree(message: impl Into<String>) -> Self {
        Self::Tree {
            message: message.into(),
            source: None,
        }
    }

    /// Create a paint error.
    pub fn paint(message: impl Into<String>) -> Self {
        Self::Paint {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source.
    pub fn config_with_source<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only device loss is: the backend recreates its resources and the same
    /// paint pass runs again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaneKitError::DeviceLost)
    }

    /// Get the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            PaneKitError::Tree { .. } => "tree",
            PaneKitError::Paint { .. } => "paint",
            PaneKitError::DeviceLost => "device_lost",
            PaneKitError::Config { .. } => "config",
            PaneKitError::Io(_) => "io",
            PaneKitError::NotFound(_) => "not_found",
        }
    }
}

/// Result type alias for PaneKit operations.
pub type Result<T> = std::result::Result<T, PaneKitError>;
