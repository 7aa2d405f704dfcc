//! Host abstraction traits
//!
//! The engine never touches a real document directly. Everything it needs from
//! the host is expressed through three traits so a live page binding and the
//! in-memory [`MockPage`](crate::testdb::MockPage) can be used interchangeably:
//!
//! - `DocumentTree` - which nodes exist and how they nest
//! - `StyleOracle` - resolved colors in, forced overrides out
//! - `ChangeFeed` - child-list change notifications
//!
//! `Page` is the union of all three and is what the session works against.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use blab::page::{ColorProperty, DocumentTree, StyleOracle};
//!
//! fn print_backgrounds<P: DocumentTree + StyleOracle>(page: &P) {
//!     for node in page.all_elements() {
//!         if let Some(bg) = page.resolved_color(node, ColorProperty::Background) {
//!             println!("{node}: {bg}");
//!         }
//!     }
//! }
//! ```

use crate::color::Tone;
use crate::core::error::Result;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Opaque handle for a node in the host document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Kind of a node, as far as the engine cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Element,
    Text,
    Comment,
}

/// The three resolved color properties the engine reads and overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorProperty {
    #[serde(rename = "background-color")]
    Background,
    #[serde(rename = "color")]
    Foreground,
    #[serde(rename = "border-color")]
    Border,
}

impl ColorProperty {
    pub const ALL: [ColorProperty; 3] = [
        ColorProperty::Background,
        ColorProperty::Foreground,
        ColorProperty::Border,
    ];

    /// CSS property name used for both reading and writing
    pub fn css_name(&self) -> &'static str {
        match self {
            ColorProperty::Background => "background-color",
            ColorProperty::Foreground => "color",
            ColorProperty::Border => "border-color",
        }
    }

    /// Which remap applies to this property
    pub fn tone(&self) -> Tone {
        match self {
            ColorProperty::Background | ColorProperty::Border => Tone::Darken,
            ColorProperty::Foreground => Tone::Lighten,
        }
    }
}

impl Display for ColorProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// A forced (`!important`) inline declaration written onto a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub node: NodeId,
    pub property: ColorProperty,
    pub value: String,
}

/// Handle returned by [`ChangeFeed::observe_child_list`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u64);

/// One delivery of child-list changes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationBatch {
    /// Nodes inserted since the previous batch, in insertion order
    pub added: Vec<NodeId>,
}

/// Node discovery and traversal
pub trait DocumentTree {
    /// The root (`<html>`) element
    fn document_element(&self) -> NodeId;

    /// The `<body>` element, if the document has one
    fn body(&self) -> Option<NodeId>;

    /// Every element in document order, root included
    fn all_elements(&self) -> Vec<NodeId>;

    /// `root` plus every element below it, in document order.
    ///
    /// Returns an empty list when `root` is gone or is not an element.
    fn subtree_elements(&self, root: NodeId) -> Vec<NodeId>;

    /// Kind of the node, `None` if it is not in the document
    fn node_kind(&self, node: NodeId) -> Option<NodeKind>;

    fn is_element(&self, node: NodeId) -> bool {
        self.node_kind(node) == Some(NodeKind::Element)
    }
}

/// Resolved-style reads and forced writes
pub trait StyleOracle {
    /// The resolved value of `property`, exactly as the host reports it
    fn resolved_color(&self, node: NodeId, property: ColorProperty) -> Option<String>;

    /// Write `value` as an inline declaration with maximum precedence
    fn force_property(&mut self, node: NodeId, property: ColorProperty, value: &str) -> Result<()>;

    /// Every property visible on the document element's resolved style
    fn root_properties(&self) -> Vec<(String, String)>;

    /// Overwrite a property on the document element's inline style
    fn set_root_property(&mut self, name: &str, value: &str) -> Result<()>;

    /// Remove the style block carrying `id`; `true` if one existed
    fn remove_style_block(&mut self, id: &str) -> bool;

    /// Append a style block carrying `id` to the document head
    fn append_style_block(&mut self, id: &str, css: &str) -> Result<()>;
}

/// Structural change notifications
pub trait ChangeFeed {
    /// Subscribe to child additions anywhere under `root`
    fn observe_child_list(&mut self, root: NodeId) -> Result<(ObserverId, Receiver<MutationBatch>)>;

    /// Drop a subscription; unknown ids are ignored
    fn disconnect(&mut self, observer: ObserverId);
}

/// Everything a dark-mode session needs from its host
pub trait Page: DocumentTree + StyleOracle + ChangeFeed {}

impl<T: DocumentTree + StyleOracle + ChangeFeed + ?Sized> Page for T {}
