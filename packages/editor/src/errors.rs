//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] trellis_parser::ParseError),

    #[error("Invalid mutation batch: {0}")]
    Json(#[from] serde_json::Error),
}
