//! Mock page implementation for running the engine without a browser
//!
//! `MockPage` keeps an element tree in memory and implements all three host
//! traits. It behaves like a rendering engine in the ways the engine can observe:
//! - forced overrides win over the page's own resolved colors
//! - overridden colors are reported back in `rgb(r, g, b)` form
//! - inserting a subtree notifies every observer whose root contains it
//!
//! Style blocks are stored but not applied; the mock has no cascade.

use crate::color::ColorValue;
use crate::core::error::{DarkModeError, Result};
use crate::page::{
    ChangeFeed, ColorProperty, Declaration, DocumentTree, MutationBatch, NodeId, NodeKind,
    NodeSnapshot, ObserverId, PageSnapshot, StyleOracle,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::{BTreeMap, HashMap, HashSet};

/// A node in the mock tree
#[derive(Debug, Clone)]
struct MockNode {
    kind: NodeKind,
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Colors as the page's own rules resolve them
    declared: HashMap<ColorProperty, String>,
    /// Forced inline overrides
    overrides: BTreeMap<ColorProperty, String>,
}

#[derive(Debug)]
struct MockObserver {
    id: ObserverId,
    root: NodeId,
    sender: Sender<MutationBatch>,
}

/// In-memory host document
#[derive(Debug)]
pub struct MockPage {
    nodes: HashMap<NodeId, MockNode>,
    root: NodeId,
    next_node: u64,
    root_properties: Vec<(String, String)>,
    style_blocks: Vec<(String, String)>,
    observers: Vec<MockObserver>,
    next_observer: u64,
    writes: Vec<Declaration>,
    failing_nodes: HashSet<NodeId>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::from_snapshot(&PageSnapshot::default())
    }
}

impl MockPage {
    /// An empty `html > (head, body)` document
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut page = Self {
            nodes: HashMap::new(),
            root: NodeId(0),
            next_node: 0,
            root_properties: snapshot
                .root_properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            style_blocks: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
            writes: Vec::new(),
            failing_nodes: HashSet::new(),
        };
        page.root = page.build(&snapshot.root, None);
        page
    }

    fn build(&mut self, snapshot: &NodeSnapshot, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;

        let declared = ColorProperty::ALL
            .iter()
            .filter_map(|&p| snapshot.resolved(p).map(|v| (p, v.to_string())))
            .collect();

        self.nodes.insert(
            id,
            MockNode {
                kind: snapshot.kind,
                tag: snapshot.tag.to_ascii_lowercase(),
                parent,
                children: Vec::new(),
                declared,
                overrides: BTreeMap::new(),
            },
        );

        let children: Vec<NodeId> = snapshot
            .children
            .iter()
            .map(|child| self.build(child, Some(id)))
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
        }
        id
    }

    fn node(&self, id: NodeId) -> Result<&MockNode> {
        self.nodes.get(&id).ok_or(DarkModeError::NodeNotFound(id))
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    fn contains(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(&node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn collect_elements(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&id) {
            if node.kind == NodeKind::Element {
                out.push(id);
            }
            for &child in &node.children {
                self.collect_elements(child, out);
            }
        }
    }

    // =========================================================================
    // Page script simulation
    // =========================================================================

    /// Append a subtree under `parent`, notifying observers like a DOM insert would
    pub fn insert_subtree(&mut self, parent: NodeId, subtree: &NodeSnapshot) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.build(subtree, Some(parent));
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        self.notify(vec![id]);
        Ok(id)
    }

    /// Append several siblings under `parent` as one mutation batch
    pub fn insert_batch(&mut self, parent: NodeId, subtrees: &[NodeSnapshot]) -> Result<Vec<NodeId>> {
        self.node(parent)?;
        let ids: Vec<NodeId> = subtrees
            .iter()
            .map(|s| self.build(s, Some(parent)))
            .collect();
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.extend(ids.iter().copied());
        }
        self.notify(ids.clone());
        Ok(ids)
    }

    /// Detach `node` from its parent and re-append it under `new_parent`
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId) -> Result<()> {
        self.node(new_parent)?;
        let old_parent = self.node(node)?.parent;
        if self.contains(node, new_parent) {
            return Err(DarkModeError::Host(format!(
                "cannot move {} under its own subtree",
                node
            )));
        }
        if let Some(old) = old_parent.and_then(|p| self.nodes.get_mut(&p)) {
            old.children.retain(|&c| c != node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(new_parent);
        }
        if let Some(p) = self.nodes.get_mut(&new_parent) {
            p.children.push(node);
        }
        self.notify(vec![node]);
        Ok(())
    }

    /// Remove `node` and its descendants
    pub fn remove_node(&mut self, node: NodeId) -> Result<()> {
        let parent = self.node(node)?.parent;
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|&c| c != node);
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&id) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Change a color the page's own rules resolve to
    pub fn set_declared(&mut self, node: NodeId, property: ColorProperty, value: &str) -> Result<()> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(DarkModeError::NodeNotFound(node))?;
        entry.declared.insert(property, value.to_string());
        Ok(())
    }

    fn notify(&mut self, added: Vec<NodeId>) {
        let relevant: Vec<&MockObserver> = self
            .observers
            .iter()
            .filter(|o| added.iter().any(|&n| self.contains(o.root, n)))
            .collect();
        for observer in relevant {
            // A dropped receiver just means nobody is listening any more
            let _ = observer.sender.send(MutationBatch {
                added: added.clone(),
            });
        }
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Make every forced write to `node` fail
    pub fn fail_writes_on(&mut self, node: NodeId) {
        self.failing_nodes.insert(node);
    }

    /// Forced value currently on `node` for `property`
    pub fn override_of(&self, node: NodeId, property: ColorProperty) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|n| n.overrides.get(&property))
            .map(String::as_str)
    }

    /// Every forced write so far, in order
    pub fn writes(&self) -> &[Declaration] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Current value of a root property (declared or rewritten)
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn style_block(&self, id: &str) -> Option<&str> {
        self.style_blocks
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, css)| css.as_str())
    }

    pub fn style_block_count(&self, id: &str) -> usize {
        self.style_blocks.iter().filter(|(k, _)| k == id).count()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Elements with the given tag, in document order
    pub fn find_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.all_elements()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.tag == tag))
            .collect()
    }

    pub fn first_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.find_by_tag(tag).into_iter().next()
    }

    /// Every override in document order, for reporting
    pub fn overrides(&self) -> Vec<Declaration> {
        self.all_elements()
            .into_iter()
            .flat_map(move |id| {
                self.nodes[&id]
                    .overrides
                    .iter()
                    .map(move |(&property, value)| Declaration {
                        node: id,
                        property,
                        value: value.clone(),
                    })
            })
            .collect()
    }

    pub fn tag_of(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.tag.as_str())
    }

    pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }
}

// =============================================================================
// Host trait implementations
// =============================================================================

impl DocumentTree for MockPage {
    fn document_element(&self) -> NodeId {
        self.root
    }

    fn body(&self) -> Option<NodeId> {
        self.nodes.get(&self.root)?.children.iter().copied().find(|id| {
            self.nodes
                .get(id)
                .is_some_and(|n| n.kind == NodeKind::Element && n.tag == "body")
        })
    }

    fn all_elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_elements(self.root, &mut out);
        out
    }

    fn subtree_elements(&self, root: NodeId) -> Vec<NodeId> {
        if !self.is_element(root) {
            return Vec::new();
        }
        let mut out = Vec::new();
        self.collect_elements(root, &mut out);
        out
    }

    fn node_kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(&node).map(|n| n.kind)
    }
}

impl StyleOracle for MockPage {
    fn resolved_color(&self, node: NodeId, property: ColorProperty) -> Option<String> {
        let node = self.nodes.get(&node)?;
        if node.kind != NodeKind::Element {
            return None;
        }

        if let Some(forced) = node.overrides.get(&property) {
            // engines report resolved colors in functional form
            return Some(match ColorValue::parse(forced).rgb() {
                Some(rgb) => rgb.to_css_rgb(),
                None => forced.clone(),
            });
        }
        node.declared.get(&property).cloned()
    }

    fn force_property(&mut self, node: NodeId, property: ColorProperty, value: &str) -> Result<()> {
        if self.failing_nodes.contains(&node) {
            return Err(DarkModeError::Host(format!(
                "style of {} is read-only",
                node
            )));
        }
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(DarkModeError::NodeNotFound(node))?;
        entry.overrides.insert(property, value.to_string());
        self.writes.push(Declaration {
            node,
            property,
            value: value.to_string(),
        });
        Ok(())
    }

    fn root_properties(&self) -> Vec<(String, String)> {
        self.root_properties.clone()
    }

    fn set_root_property(&mut self, name: &str, value: &str) -> Result<()> {
        match self.root_properties.iter_mut().find(|(k, _)| k == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .root_properties
                .push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    fn remove_style_block(&mut self, id: &str) -> bool {
        let before = self.style_blocks.len();
        self.style_blocks.retain(|(k, _)| k != id);
        self.style_blocks.len() != before
    }

    fn append_style_block(&mut self, id: &str, css: &str) -> Result<()> {
        self.style_blocks.push((id.to_string(), css.to_string()));
        Ok(())
    }
}

impl ChangeFeed for MockPage {
    fn observe_child_list(&mut self, root: NodeId) -> Result<(ObserverId, Receiver<MutationBatch>)> {
        self.node(root)?;
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;

        let (sender, receiver) = unbounded();
        self.observers.push(MockObserver { id, root, sender });
        Ok((id, receiver))
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.observers.retain(|o| o.id != observer);
    }
}
