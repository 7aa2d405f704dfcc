//! Page interaction module
//!
//! Everything that crosses the boundary between the engine and the host
//! document lives here.
//!
//! # Submodules
//!
//! - `traits` - `DocumentTree`, `StyleOracle` and `ChangeFeed`, the host capabilities
//! - `snapshot` - serializable page descriptions used to replay pages offline

pub mod snapshot;
pub mod traits;

pub use snapshot::{NodeSnapshot, PageSnapshot};
pub use traits::{
    ChangeFeed, ColorProperty, Declaration, DocumentTree, MutationBatch, NodeId, NodeKind,
    ObserverId, Page, StyleOracle,
};
