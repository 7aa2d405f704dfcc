//! Processed-node tracking
//!
//! The scanner only ever sees resolved colors, and once a node carries an
//! override its resolved color *is* the override. Remapping it again would darken
//! an already darkened background a second time. `ProcessedNodes` remembers which
//! nodes a session has already handled so later passes (re-activation, a node
//! being moved and re-inserted) leave them alone.
//!
//! Entries for nodes the host has dropped are pruned before each incremental
//! pass, so a page that keeps inserting and removing content does not grow the
//! set without bound.
//!
//! Tracking can be switched off to get the raw "remap whatever is resolved now"
//! behavior.

use crate::page::NodeId;
use log::trace;
use std::collections::HashSet;

/// Set of nodes a session has already recolored
#[derive(Debug, Clone, Default)]
pub struct ProcessedNodes {
    enabled: bool,
    nodes: HashSet<NodeId>,
}

impl ProcessedNodes {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            nodes: HashSet::new(),
        }
    }

    /// A tracker that never skips anything
    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a pass should touch `node`
    pub fn should_process(&self, node: NodeId) -> bool {
        if self.enabled && self.nodes.contains(&node) {
            trace!("Skipping already processed {}", node);
            return false;
        }
        true
    }

    /// Record that `node` has been handled
    pub fn mark(&mut self, node: NodeId) {
        if self.enabled {
            self.nodes.insert(node);
        }
    }

    /// Forget a single node
    pub fn forget(&mut self, node: NodeId) -> bool {
        self.nodes.remove(&node)
    }

    /// Keep only nodes for which `is_live` holds, returning how many were dropped
    pub fn retain_live<F>(&mut self, mut is_live: F) -> usize
    where
        F: FnMut(NodeId) -> bool,
    {
        let before = self.nodes.len();
        self.nodes.retain(|&node| is_live(node));
        let dropped = before - self.nodes.len();
        if dropped > 0 {
            trace!("Forgot {} detached nodes", dropped);
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
