//! Error types for the dark-mode engine
//!
//! Color parsing never produces an error; unrecognized values are handled with
//! fallbacks. The variants here cover the host side: nodes that vanished, a page
//! without a body, lifecycle misuse, and snapshot/config loading.

use crate::core::config::ConfigError;
use crate::page::NodeId;
use thiserror::Error;

/// Main error type for the dark-mode engine
#[derive(Error, Debug)]
pub enum DarkModeError {
    /// The host no longer knows this node
    #[error("Node {0} is not part of the document")]
    NodeNotFound(NodeId),

    /// The change feed needs a body to observe
    #[error("Document has no body element to observe")]
    NoBody,

    /// Pumping or stopping a session that was never activated
    #[error("Dark mode session is not active")]
    NotActive,

    /// Host-specific failure reported by a page implementation
    #[error("Host error: {0}")]
    Host(String),

    /// A page snapshot could not be decoded
    #[error("Invalid page snapshot: {0}")]
    Snapshot(String),

    /// Configuration could not be loaded or saved
    #[error("Configuration error: {0}")]
    Config(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DarkModeError>;

impl From<std::io::Error> for DarkModeError {
    fn from(err: std::io::Error) -> Self {
        DarkModeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DarkModeError {
    fn from(err: serde_json::Error) -> Self {
        DarkModeError::Snapshot(err.to_string())
    }
}

impl From<ConfigError> for DarkModeError {
    fn from(err: ConfigError) -> Self {
        DarkModeError::Config(err.to_string())
    }
}
