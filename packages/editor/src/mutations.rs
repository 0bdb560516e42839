//! # Mutations
//!
//! Serializable edit requests produced by UI controls (property panel, tree
//! view, keyboard shortcuts). Each one maps onto a tree operation.
//!
//! Mutations never fail: one whose target is gone leaves the tree unchanged.

use crate::tree::{
    add_child, clone_node, find_node, flatten_tree, insert_after, move_node, remove_node,
    replace_children, update_node, Direction, NodePatch,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;
use trellis_parser::{max_id_suffix, IdGenerator, Node, ROOT_ID};

/// A single edit to the tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Shallow-merge a patch into a node
    Update { node_id: String, patch: NodePatch },

    /// Append a node under a parent
    AddChild { parent_id: String, node: Node },

    /// Remove a node and its subtree
    Remove { node_id: String },

    /// Swap a node with its neighbouring sibling
    Move { node_id: String, direction: Direction },

    /// Deep copy with fresh ids, placed right after the original
    Duplicate { node_id: String },

    /// Replace a parent's children wholesale
    ReplaceChildren { parent_id: String, children: Vec<Node> },
}

impl Mutation {
    /// Apply to `root`, allocating ids from `ids` where new nodes appear
    pub fn apply(self, root: Node, ids: &mut IdGenerator) -> Node {
        match self {
            Mutation::Update { node_id, patch } => update_node(root, &node_id, &patch),
            Mutation::AddChild { parent_id, node } => add_child(root, &parent_id, node),
            Mutation::Remove { node_id } => remove_node(root, &node_id),
            Mutation::Move { node_id, direction } => move_node(root, &node_id, direction),
            Mutation::Duplicate { node_id } => {
                let copy = find_node(&root, &node_id)
                    .filter(|node| !node.is_root())
                    .map(|node| clone_node(node, ids));
                match copy {
                    Some(copy) => insert_after(root, &node_id, copy),
                    None => root,
                }
            }
            Mutation::ReplaceChildren {
                parent_id,
                children,
            } => replace_children(root, &parent_id, children),
        }
    }

    /// Re-id incoming subtrees whose ids clash with the tree they join, with
    /// `root`, or with each other. Subtrees without a clash keep their ids.
    pub fn adopt(self, root: &Node, ids: &mut IdGenerator) -> Self {
        match self {
            Mutation::AddChild { parent_id, node } => {
                let mut taken = taken_ids(root, None);
                ids.advance_past(max_id_suffix(&node));
                let node = adopt_node(node, &mut taken, ids);
                Mutation::AddChild { parent_id, node }
            }
            Mutation::ReplaceChildren {
                parent_id,
                children,
            } => {
                let mut taken = taken_ids(root, Some(parent_id.as_str()));
                let children = adopt_nodes(children, &mut taken, ids);
                Mutation::ReplaceChildren {
                    parent_id,
                    children,
                }
            }
            Mutation::Update { node_id, mut patch } => {
                if let Some(children) = patch.children.take() {
                    let mut taken = taken_ids(root, Some(node_id.as_str()));
                    patch.children = Some(adopt_nodes(children, &mut taken, ids));
                }
                Mutation::Update { node_id, patch }
            }
            other => other,
        }
    }

    /// Get a debug name for this mutation
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Update { .. } => "update",
            Mutation::AddChild { .. } => "add_child",
            Mutation::Remove { .. } => "remove",
            Mutation::Move { .. } => "move",
            Mutation::Duplicate { .. } => "duplicate",
            Mutation::ReplaceChildren { .. } => "replace_children",
        }
    }

    /// Id of the node the mutation is aimed at
    pub fn target(&self) -> &str {
        match self {
            Mutation::Update { node_id, .. }
            | Mutation::Remove { node_id }
            | Mutation::Move { node_id, .. }
            | Mutation::Duplicate { node_id } => node_id,
            Mutation::AddChild { parent_id, .. } | Mutation::ReplaceChildren { parent_id, .. } => {
                parent_id
            }
        }
    }
}

/// Ids that stay in `root` after the edit. The children of `replaced` are
/// about to be swapped out, so theirs are free.
fn taken_ids(root: &Node, replaced: Option<&str>) -> HashSet<String> {
    fn collect(node: &Node, replaced: Option<&str>, taken: &mut HashSet<String>) {
        taken.insert(node.id.clone());
        if replaced == Some(node.id.as_str()) {
            return;
        }
        for child in &node.children {
            collect(child, replaced, taken);
        }
    }

    let mut taken = HashSet::from([ROOT_ID.to_string()]);
    collect(root, replaced, &mut taken);
    taken
}

fn adopt_nodes(nodes: Vec<Node>, taken: &mut HashSet<String>, ids: &mut IdGenerator) -> Vec<Node> {
    // Fresh ids must also clear the suffixes the incoming nodes carry
    for node in &nodes {
        ids.advance_past(max_id_suffix(node));
    }
    nodes
        .into_iter()
        .map(|node| adopt_node(node, taken, ids))
        .collect()
}

fn adopt_node(node: Node, taken: &mut HashSet<String>, ids: &mut IdGenerator) -> Node {
    let clashes = {
        let mut seen = HashSet::new();
        flatten_tree(&node)
            .into_iter()
            .any(|n| taken.contains(&n.id) || !seen.insert(n.id.as_str()))
    };

    let node = if clashes {
        let fresh = clone_node(&node, ids);
        debug!(from = %node.id, to = %fresh.id, "re-identified incoming subtree");
        fresh
    } else {
        node
    };
    taken.extend(flatten_tree(&node).into_iter().map(|n| n.id.clone()));
    node
}

/// Result of applying mutation(s) to a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationResult {
    /// Document version after the edit
    pub version: u64,

    /// Whether the tree differs from before
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_parser::ast::{Element, ElementKind};

    fn sample() -> (Node, IdGenerator) {
        let mut ids = IdGenerator::new();
        let text = Node::of_kind(ElementKind::Text, &mut ids).with_name("Label");
        let panel = Node::of_kind(ElementKind::Box, &mut ids).with_children(vec![text]);
        (Node::root().with_children(vec![panel]), ids)
    }

    #[test]
    fn test_duplicate_places_copy_after_original() {
        let (root, mut ids) = sample();
        let root = Mutation::Duplicate {
            node_id: "el-2".into(),
        }
        .apply(root, &mut ids);

        let ids_in_root: Vec<&str> = root.children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids_in_root, vec!["el-2", "el-3"]);
        assert_eq!(root.children[1].children[0].id, "el-4");
        assert!(root.children[0].structurally_eq(&root.children[1]));
    }

    #[test]
    fn test_duplicate_root_is_no_op() {
        let (root, mut ids) = sample();
        let before = root.clone();

        let root = Mutation::Duplicate {
            node_id: "root".into(),
        }
        .apply(root, &mut ids);

        assert_eq!(root, before);
        assert_eq!(ids.count(), 2);
    }

    #[test]
    fn test_json_shape() {
        let mutation = Mutation::Move {
            node_id: "el-1".into(),
            direction: Direction::Down,
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["nodeId"], "el-1");
        assert_eq!(json["direction"], "down");

        let back: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(back, mutation);
    }

    #[test]
    fn test_update_from_json() {
        let (root, mut ids) = sample();
        let mutation: Mutation = serde_json::from_str(
            r#"{"type": "update", "nodeId": "el-1", "patch": {"name": "Caption"}}"#,
        )
        .unwrap();

        assert_eq!(mutation.name(), "update");
        assert_eq!(mutation.target(), "el-1");

        let root = mutation.apply(root, &mut ids);
        assert_eq!(
            find_node(&root, "el-1").and_then(|n| n.name.as_deref()),
            Some("Caption")
        );
    }

    #[test]
    fn test_adopt_keeps_free_ids_and_renames_clashes() {
        let (root, mut ids) = sample();

        let fresh = Node::new("el-7", Element::default_for(ElementKind::Slider));
        let adopted = Mutation::AddChild {
            parent_id: "el-2".into(),
            node: fresh.clone(),
        }
        .adopt(&root, &mut ids);
        assert_eq!(
            adopted,
            Mutation::AddChild {
                parent_id: "el-2".into(),
                node: fresh,
            }
        );

        let clash = Node::new("el-1", Element::default_for(ElementKind::Slider));
        let Mutation::AddChild { node, .. } = (Mutation::AddChild {
            parent_id: "el-2".into(),
            node: clash,
        })
        .adopt(&root, &mut ids)
        else {
            panic!("expected addChild");
        };
        assert_eq!(node.id, "el-8");
        assert_eq!(node.kind(), ElementKind::Slider);
    }
}
