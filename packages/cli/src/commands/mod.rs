pub mod check;
pub mod fmt;
pub mod tree;

pub use check::{check, CheckArgs};
pub use fmt::{fmt, FmtArgs};
pub use tree::{tree, TreeArgs};

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use trellis_editor::EditorError;
use walkdir::WalkDir;

/// Layout files under `path`, or `path` itself when it is a file
pub fn find_layout_files(path: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.exists() {
        return Err(anyhow!("Path does not exist: {}", path.display()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some(extension) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Render an editor error against its source, with an excerpt for parse errors
pub fn describe_error(error: &EditorError, file: &Path, source: &str) -> String {
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    match error {
        EditorError::Parse(parse_error) => {
            trellis_parser::format_error(source, file_name, parse_error)
        }
        other => other.to_string(),
    }
}
