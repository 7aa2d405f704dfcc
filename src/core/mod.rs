//! Core functionality module
//!
//! This module contains the dark-mode engine itself: the passes that rewrite a
//! page, the watcher that follows later insertions, and the session that owns
//! both, along with configuration and error handling.
//!
//! # Submodules
//!
//! - `config` - Configuration loading, saving, and management
//! - `error` - Error types and result aliases
//! - `scanner` - Snapshot scanner over resolved element colors
//! - `session` - Activation, pumping and teardown of one dark-mode session
//! - `tracking` - Set of elements a session has already recolored
//! - `variables` - Custom property rewriting on the document root
//! - `watcher` - Mutation watcher and its delayed work queue

pub mod config;
pub mod error;
pub mod scanner;
pub mod session;
pub mod tracking;
pub mod variables;
pub mod watcher;
