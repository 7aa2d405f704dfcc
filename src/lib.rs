//! BLAB Library
//!
//! Because Light Attracts Bugs: a hue-preserving dark mode for pages that are
//! already rendered. Instead of shipping a dark stylesheet, BLAB reads each
//! element's resolved colors, remaps them through HSL bands that keep the hue,
//! and forces the results back onto the page.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`color`] - Color codec (hex, `rgb()`, HSL) and the darken/lighten remaps
//! - [`page`] - Host traits the engine talks to, and serializable page snapshots
//! - [`core`] - Scanner, variable rewriter, mutation watcher and the session
//!   that ties them together, plus configuration and errors
//! - [`cli`] - Command-line interface (only used by the binary)
//! - [`testdb`] - In-memory page and canned scenarios for running without a browser
//!
//! # Example Usage
//!
//! ```rust
//! use blab::core::config::SessionConfig;
//! use blab::core::session::DarkModeSession;
//! use blab::page::{DocumentTree, NodeSnapshot, PageSnapshot};
//! use blab::testdb::MockPage;
//!
//! fn main() -> blab::core::error::Result<()> {
//!     let snapshot = PageSnapshot::with_body(
//!         NodeSnapshot::element("body")
//!             .background("rgb(255, 255, 255)")
//!             .color("rgb(0, 0, 0)"),
//!     );
//!     let mut page = MockPage::from_snapshot(&snapshot);
//!
//!     let mut session = DarkModeSession::new(SessionConfig::default());
//!     let report = session.activate(&mut page)?;
//!     assert_eq!(report.scan.overrides_written, 2);
//!
//!     // content added later is picked up once the delay has elapsed
//!     let body = page.body().unwrap();
//!     page.insert_subtree(body, &NodeSnapshot::element("div").color("#000000"))?;
//!     session.flush(&mut page)?;
//!
//!     session.stop(&mut page)?;
//!     Ok(())
//! }
//! ```
//!
//! # Color Remaps
//!
//! ```rust
//! assert_eq!(blab::color::darken("#ffffff"), "#2a2a2a");
//! assert_eq!(blab::color::lighten("#000000"), "#e0e0e0");
//! ```
//!
//! # Hosting
//!
//! A real host (a browser bridge, a headless renderer) implements
//! [`page::DocumentTree`], [`page::StyleOracle`] and [`page::ChangeFeed`]. The
//! session only ever goes through those traits.

pub mod cli;
pub mod color;
pub mod core;
pub mod page;
pub mod testdb;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
