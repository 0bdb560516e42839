//! # Document
//!
//! The single owner of the live tree. Visual edits arrive as [`Mutation`]s,
//! text edits as markup that replaces a parent's children, and every change
//! bumps the version so views know when to regenerate.
//!
//! ```text
//! text edit ──parse──┐                  ┌──generate──▶ code view
//!                    ▼                  │
//!               Document { root, ids, version }
//!                    ▲
//! UI control ──Mutation
//! ```

use crate::mutations::{Mutation, MutationResult};
use crate::tree::find_node;
use crate::EditorError;
use tracing::{debug, info};
use trellis_parser::ast::ElementKind;
use trellis_parser::{generate, parse, parse_multiple, IdGenerator, Node};

/// Editable layout document
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
    ids: IdGenerator,
    version: u64,
}

impl Document {
    /// Empty document: a bare root
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            ids: IdGenerator::new(),
            version: 0,
        }
    }

    /// Adopt a tree loaded from elsewhere. The id counter resumes after the
    /// largest id already in it.
    pub fn from_tree(root: Node) -> Self {
        let mut ids = IdGenerator::new();
        ids.sync_with(&root);

        Self {
            root,
            ids,
            version: 0,
        }
    }

    /// Parse markup holding the root's children. Blank text is an empty document.
    pub fn from_source(source: &str) -> Result<Self, EditorError> {
        if source.trim().is_empty() {
            return Ok(Self::new());
        }

        let mut ids = IdGenerator::new();
        let children = parse_multiple(source, &mut ids)?;
        info!(children = children.len(), "loaded document from source");

        Ok(Self {
            root: Node::root().with_children(children),
            ids,
            version: 0,
        })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        find_node(&self.root, id)
    }

    /// Current version number (increments on each change)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Generated markup for the whole document
    pub fn source(&self) -> String {
        generate(&self.root)
    }

    /// A fresh node with a document-unique id, ready for [`Mutation::AddChild`]
    pub fn create_node(&mut self, kind: ElementKind) -> Node {
        Node::of_kind(kind, &mut self.ids)
    }

    /// Apply a mutation. The version moves only when the tree changed.
    pub fn apply(&mut self, mutation: Mutation) -> MutationResult {
        let name = mutation.name();
        let target = mutation.target().to_string();

        let mutation = mutation.adopt(&self.root, &mut self.ids);
        let before = self.root.clone();
        let root = std::mem::replace(&mut self.root, Node::root());
        self.root = mutation.apply(root, &mut self.ids);

        let changed = self.root != before;
        if changed {
            self.version += 1;
            // Nodes added from outside may carry ids ahead of the counter
            self.ids.sync_with(&self.root);
        }

        debug!(mutation = name, %target, changed, version = self.version, "applied mutation");
        MutationResult {
            version: self.version,
            changed,
        }
    }

    /// Apply mutations in order, reporting the final version
    pub fn apply_batch(&mut self, mutations: impl IntoIterator<Item = Mutation>) -> MutationResult {
        let mut changed = false;
        for mutation in mutations {
            changed |= self.apply(mutation).changed;
        }
        MutationResult {
            version: self.version,
            changed,
        }
    }

    /// Apply a JSON array of mutations
    pub fn apply_json(&mut self, json: &str) -> Result<MutationResult, EditorError> {
        let mutations: Vec<Mutation> = serde_json::from_str(json)?;
        Ok(self.apply_batch(mutations))
    }

    /// Replace a parent's children with parsed markup. Blank text clears them.
    /// On a parse error the tree is left as it was.
    pub fn replace_children_from_source(
        &mut self,
        parent_id: &str,
        source: &str,
    ) -> Result<MutationResult, EditorError> {
        if self.find(parent_id).is_none() {
            return Ok(self.unchanged());
        }

        let children = if source.trim().is_empty() {
            Vec::new()
        } else {
            parse_multiple(source, &mut self.ids)?
        };

        Ok(self.apply(Mutation::ReplaceChildren {
            parent_id: parent_id.to_string(),
            children,
        }))
    }

    /// Parse a single element and append it under `parent_id`.
    /// Returns the new node's id, or `None` when the parent does not exist.
    pub fn paste(&mut self, parent_id: &str, source: &str) -> Result<Option<String>, EditorError> {
        if self.find(parent_id).is_none() {
            return Ok(None);
        }

        let node = parse(source, &mut self.ids)?;
        let id = node.id.clone();
        self.apply(Mutation::AddChild {
            parent_id: parent_id.to_string(),
            node,
        });
        Ok(Some(id))
    }

    fn unchanged(&self) -> MutationResult {
        MutationResult {
            version: self.version,
            changed: false,
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
