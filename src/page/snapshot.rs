//! Serializable page descriptions
//!
//! A `PageSnapshot` captures what a style oracle would report for a page: the
//! element tree with each element's resolved colors, plus the custom properties
//! on the document element. Snapshots are plain JSON so pages can be dumped from
//! a browser and replayed through the engine.
//!
//! `insertions` lists subtrees the page appends to its body after dark mode is
//! active, each delivered as its own mutation batch.
//!
//! ```json
//! {
//!   "root_properties": { "--accent": "#3366ff" },
//!   "root": {
//!     "tag": "html",
//!     "children": [
//!       { "tag": "body", "background-color": "rgb(255, 255, 255)", "color": "rgb(0, 0, 0)" }
//!     ]
//!   }
//! }
//! ```

use super::traits::{ColorProperty, NodeKind};
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One node of a page snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    /// Tag name for elements, ignored for text/comment nodes
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub kind: NodeKind,

    /// Resolved `background-color`
    #[serde(
        rename = "background-color",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub background: Option<String>,

    /// Resolved `color`
    #[serde(rename = "color", default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,

    /// Resolved `border-color`
    #[serde(
        rename = "border-color",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub border: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn element(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn text() -> Self {
        Self {
            kind: NodeKind::Text,
            ..Default::default()
        }
    }

    pub fn background(mut self, value: &str) -> Self {
        self.background = Some(value.to_string());
        self
    }

    pub fn color(mut self, value: &str) -> Self {
        self.foreground = Some(value.to_string());
        self
    }

    pub fn border(mut self, value: &str) -> Self {
        self.border = Some(value.to_string());
        self
    }

    pub fn child(mut self, child: NodeSnapshot) -> Self {
        self.children.push(child);
        self
    }

    /// Resolved value recorded for `property`
    pub fn resolved(&self, property: ColorProperty) -> Option<&str> {
        match property {
            ColorProperty::Background => self.background.as_deref(),
            ColorProperty::Foreground => self.foreground.as_deref(),
            ColorProperty::Border => self.border.as_deref(),
        }
    }

    /// Number of element nodes in this subtree, self included
    pub fn element_count(&self) -> usize {
        let own = usize::from(self.kind == NodeKind::Element);
        own + self
            .children
            .iter()
            .map(NodeSnapshot::element_count)
            .sum::<usize>()
    }
}

/// A whole page: root custom properties plus the `<html>` tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Properties on the document element's resolved style
    #[serde(default)]
    pub root_properties: BTreeMap<String, String>,

    /// The document element
    pub root: NodeSnapshot,

    /// Subtrees appended to the body after activation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insertions: Vec<NodeSnapshot>,
}

impl Default for PageSnapshot {
    fn default() -> Self {
        Self {
            root_properties: BTreeMap::new(),
            root: NodeSnapshot::element("html")
                .child(NodeSnapshot::element("head"))
                .child(NodeSnapshot::element("body")),
            insertions: Vec::new(),
        }
    }
}

impl PageSnapshot {
    /// A page whose `<body>` holds `children`
    pub fn with_body(body: NodeSnapshot) -> Self {
        Self {
            root_properties: BTreeMap::new(),
            root: NodeSnapshot::element("html")
                .child(NodeSnapshot::element("head"))
                .child(body),
            insertions: Vec::new(),
        }
    }

    pub fn property(mut self, name: &str, value: &str) -> Self {
        self.root_properties
            .insert(name.to_string(), value.to_string());
        self
    }

    /// Append `subtree` to the body once the page is live
    pub fn inserting(mut self, subtree: NodeSnapshot) -> Self {
        self.insertions.push(subtree);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_parses_css_property_names() {
        let json = r##"{
            "root_properties": { "--bg": "#ffffff" },
            "root": {
                "tag": "html",
                "children": [
                    { "tag": "body", "background-color": "rgb(255, 255, 255)", "color": "#000000" },
                    { "kind": "text" }
                ]
            }
        }"##;

        let page = PageSnapshot::from_json(json).unwrap();
        assert_eq!(page.root_properties.get("--bg").map(String::as_str), Some("#ffffff"));

        let body = &page.root.children[0];
        assert_eq!(body.resolved(ColorProperty::Background), Some("rgb(255, 255, 255)"));
        assert_eq!(body.resolved(ColorProperty::Foreground), Some("#000000"));
        assert_eq!(body.resolved(ColorProperty::Border), None);
        assert_eq!(page.root.children[1].kind, NodeKind::Text);
    }

    #[test]
    fn test_insertions_default_to_empty() {
        let page = PageSnapshot::from_json(r#"{ "root": { "tag": "html" } }"#).unwrap();
        assert!(page.insertions.is_empty());

        let json = r##"{
            "root": { "tag": "html", "children": [ { "tag": "body" } ] },
            "insertions": [ { "tag": "aside", "border-color": "#cccccc" } ]
        }"##;
        let page = PageSnapshot::from_json(json).unwrap();
        assert_eq!(page.insertions.len(), 1);
        assert_eq!(page.insertions[0].resolved(ColorProperty::Border), Some("#cccccc"));
    }

    #[test]
    fn test_element_count_ignores_text_nodes() {
        let body = NodeSnapshot::element("body")
            .child(NodeSnapshot::element("p").child(NodeSnapshot::text()))
            .child(NodeSnapshot::text());
        let page = PageSnapshot::with_body(body);
        // html, head, body, p
        assert_eq!(page.root.element_count(), 4);
    }

    #[test]
    fn test_invalid_json_is_snapshot_error() {
        let err = PageSnapshot::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::core::error::DarkModeError::Snapshot(_)));
    }

    #[test]
    fn test_json_round_trip_keeps_tree() {
        let page = PageSnapshot::with_body(
            NodeSnapshot::element("body").child(NodeSnapshot::element("div").border("#cccccc")),
        )
        .property("--text", "rgb(20, 20, 20)");

        let json = page.to_json().unwrap();
        assert!(json.contains("\"border-color\": \"#cccccc\""));
        assert_eq!(PageSnapshot::from_json(&json).unwrap(), page);
    }
}
