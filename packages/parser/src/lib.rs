//! Markup front end for Trellis layouts.
//!
//! A layout is a tree of terminal UI elements (`box`, `text`, `select`, ...)
//! written as JSX-like markup. This crate turns that text into a [`Node`] tree
//! and generates canonical markup back from a tree:
//!
//! ```
//! use trellis_parser::{generate, parse_multiple, IdGenerator, Node};
//!
//! let mut ids = IdGenerator::new();
//! let children = parse_multiple(r#"<text name="Title">Hello</text>"#, &mut ids).unwrap();
//! let root = Node::root().with_children(children);
//! assert_eq!(generate(&root), "<text name=\"Title\">Hello</text>\n");
//! ```

pub mod ast;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

#[cfg(test)]
mod tests_roundtrip;

pub use ast::{Element, ElementKind, Layout, Node, ROOT_ID};
pub use error::{ParseError, ParseResult, Span};
pub use id_generator::{max_id_suffix, parse_id_suffix, IdGenerator};
pub use parser::{parse, parse_multiple, Parser};
pub use serializer::{generate, generate_node, Serializer};
pub use tokenizer::{tokenize, Token};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;
