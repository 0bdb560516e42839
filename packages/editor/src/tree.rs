//! # Tree Operations
//!
//! Pure operations over owned trees. Each one consumes the tree and returns the
//! new one; subtrees off the edited path are moved through untouched.
//!
//! A missing target is not an error. The tree comes back unchanged and callers
//! that care compare before and after.

use serde::{Deserialize, Serialize};
use tracing::warn;
use trellis_parser::ast::{Element, Layout, Node, ROOT_ID};
use trellis_parser::{max_id_suffix, IdGenerator};

/// Sibling direction for [`move_node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// Shallow replacement of node fields. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Node>>,
}

impl NodePatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn layout(layout: Layout) -> Self {
        Self {
            layout: Some(layout),
            ..Default::default()
        }
    }

    pub fn element(element: Element) -> Self {
        Self {
            element: Some(element),
            ..Default::default()
        }
    }

    fn apply_to(&self, node: &mut Node) {
        if let Some(name) = &self.name {
            // The default label and no label generate the same markup
            node.name = (name != node.kind().label()).then(|| name.clone());
        }
        if let Some(layout) = &self.layout {
            node.layout = layout.clone();
        }
        if let Some(element) = &self.element {
            if element.kind() == node.kind() {
                node.element = element.clone();
            } else {
                warn!(
                    node_id = %node.id,
                    kind = %node.kind(),
                    patch_kind = %element.kind(),
                    "ignoring patch that would change the element kind"
                );
            }
        }
        if let Some(children) = &self.children {
            node.children = children.clone();
        }
    }
}

/// Depth-first search for `id`, the root included
pub fn find_node<'a>(root: &'a Node, id: &str) -> Option<&'a Node> {
    if root.id == id {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_node(child, id))
}

pub fn find_node_mut<'a>(root: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if root.id == id {
        return Some(root);
    }
    root.children
        .iter_mut()
        .find_map(|child| find_node_mut(child, id))
}

/// The node whose direct children include `id`
pub fn find_parent<'a>(root: &'a Node, id: &str) -> Option<&'a Node> {
    if root.children.iter().any(|child| child.id == id) {
        return Some(root);
    }
    root.children.iter().find_map(|child| find_parent(child, id))
}

fn find_parent_mut<'a>(root: &'a mut Node, id: &str) -> Option<&'a mut Node> {
    if root.children.iter().any(|child| child.id == id) {
        return Some(root);
    }
    root.children
        .iter_mut()
        .find_map(|child| find_parent_mut(child, id))
}

/// Shallow merge of `patch` into the node with `id`. The element kind never changes.
pub fn update_node(mut root: Node, id: &str, patch: &NodePatch) -> Node {
    if let Some(node) = find_node_mut(&mut root, id) {
        patch.apply_to(node);
    }
    root
}

/// Append `child` to the children of `parent_id`
pub fn add_child(mut root: Node, parent_id: &str, child: Node) -> Node {
    if let Some(parent) = find_node_mut(&mut root, parent_id) {
        parent.children.push(child);
    }
    root
}

/// Drop the node with `id` and its subtree. The root cannot be removed.
pub fn remove_node(mut root: Node, id: &str) -> Node {
    if id == ROOT_ID {
        return root;
    }
    if let Some(parent) = find_parent_mut(&mut root, id) {
        parent.children.retain(|child| child.id != id);
    }
    root
}

/// Swap the node with its previous or next sibling
pub fn move_node(mut root: Node, id: &str, direction: Direction) -> Node {
    let Some(parent) = find_parent_mut(&mut root, id) else {
        return root;
    };
    let Some(index) = parent.children.iter().position(|child| child.id == id) else {
        return root;
    };

    let target = match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|next| *next < parent.children.len()),
    };
    if let Some(target) = target {
        parent.children.swap(index, target);
    }
    root
}

/// Deep copy with a fresh id for the node and every descendant, parents first
pub fn clone_node(node: &Node, ids: &mut IdGenerator) -> Node {
    let id = ids.new_id();
    Node {
        id,
        name: node.name.clone(),
        layout: node.layout.clone(),
        element: node.element.clone(),
        children: node
            .children
            .iter()
            .map(|child| clone_node(child, ids))
            .collect(),
    }
}

/// Every node in pre-order, starting with `node` itself
pub fn flatten_tree(node: &Node) -> Vec<&Node> {
    let mut nodes = Vec::new();
    collect(node, &mut nodes);
    nodes
}

fn collect<'a>(node: &'a Node, nodes: &mut Vec<&'a Node>) {
    nodes.push(node);
    for child in &node.children {
        collect(child, nodes);
    }
}

/// Largest generated id suffix in the tree; the counter value that keeps new
/// ids clear of the loaded ones. Apply it with [`IdGenerator::sync_with`].
pub fn sync_id_counter(root: &Node) -> u64 {
    max_id_suffix(root)
}

/// Replace the whole children list of `parent_id`
pub fn replace_children(mut root: Node, parent_id: &str, children: Vec<Node>) -> Node {
    if let Some(parent) = find_node_mut(&mut root, parent_id) {
        parent.children = children;
    }
    root
}

/// Insert `node` directly after the sibling `sibling_id`
pub fn insert_after(mut root: Node, sibling_id: &str, node: Node) -> Node {
    let Some(parent) = find_parent_mut(&mut root, sibling_id) else {
        return root;
    };
    if let Some(index) = parent.children.iter().position(|child| child.id == sibling_id) {
        parent.children.insert(index + 1, node);
    }
    root
}
