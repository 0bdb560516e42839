use super::describe_error;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_editor::{Document, Node};

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Layout file to parse
    pub file: PathBuf,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn tree(args: TreeArgs, cwd: &Path) -> Result<()> {
    let file = cwd.join(&args.file);
    let source = fs::read_to_string(&file)
        .with_context(|| format!("Cannot read {}", file.display()))?;

    let doc = Document::from_source(&source)
        .map_err(|e| anyhow!("\n{}", describe_error(&e, &file, &source)))?;

    println!("{}", render_tree(doc.root(), args.pretty)?);
    Ok(())
}

/// JSON form of a tree, root included
pub fn render_tree(root: &Node, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(root)
    } else {
        serde_json::to_string(root)
    }
}
