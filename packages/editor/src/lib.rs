//! # Trellis Editor
//!
//! Editing core behind the Trellis layout builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup → Node tree → markup         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + mutations                │
//! │  - Pure tree operations (tree)              │
//! │  - Serializable edit requests (mutations)   │
//! │  - Version tracking and id management       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use trellis_editor::{Direction, Document, Mutation};
//!
//! let mut doc = Document::from_source("<box /><text>Hi</text>").unwrap();
//! doc.apply(Mutation::Move {
//!     node_id: "el-2".to_string(),
//!     direction: Direction::Up,
//! });
//! assert_eq!(doc.source(), "<text name=\"Text\">Hi</text>\n<box name=\"Box\" />\n");
//! ```

mod document;
mod errors;
mod mutations;
pub mod tree;

pub use document::Document;
pub use errors::EditorError;
pub use mutations::{Mutation, MutationResult};
pub use tree::{Direction, NodePatch};

// Re-export common types for convenience
pub use trellis_parser::ast::{Element, ElementKind, Node};
pub use trellis_parser::IdGenerator;
