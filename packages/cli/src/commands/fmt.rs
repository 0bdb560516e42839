use super::{describe_error, find_layout_files};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_editor::{Document, EditorError};
use trellis_parser::Serializer;

#[derive(Debug, Args)]
pub struct FmtArgs {
    /// File or directory to format (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Fail when a file is not already formatted, without touching it
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Rewrite files in place instead of printing them
    #[arg(short, long)]
    pub write: bool,
}

/// Canonical markup for `source`: parsed into a document and regenerated
pub fn format_source(source: &str, config: &Config) -> Result<String, EditorError> {
    let doc = Document::from_source(source)?;
    Ok(Serializer::with_indent(&config.indent()).serialize(doc.root()))
}

pub fn fmt(args: FmtArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let files = find_layout_files(&cwd.join(&args.path), &config.extension)?;

    if files.is_empty() {
        println!("{}", format!("No .{} files found", config.extension).yellow());
        return Ok(());
    }

    let mut unformatted = 0;
    let mut error_count = 0;

    for file in &files {
        let source = fs::read_to_string(file)?;
        let relative_path = file.strip_prefix(cwd).unwrap_or(file);

        let formatted = match format_source(&source, &config) {
            Ok(formatted) => formatted,
            Err(e) => {
                error_count += 1;
                eprintln!("{}", describe_error(&e, file, &source));
                continue;
            }
        };

        if args.check {
            if formatted != source {
                unformatted += 1;
                println!("  {} {}", "✗".red(), relative_path.display());
            }
        } else if args.write {
            if formatted != source {
                fs::write(file, &formatted)?;
                println!("  {} {}", "✓".green(), relative_path.display());
            }
        } else {
            if files.len() > 1 {
                println!("{}", format!("// {}", relative_path.display()).dimmed());
            }
            print!("{}", formatted);
        }
    }

    tracing::info!(files = files.len(), unformatted, error_count, "formatting finished");

    if error_count > 0 {
        return Err(anyhow!("{} file(s) failed to parse", error_count));
    }
    if unformatted > 0 {
        return Err(anyhow!("{} file(s) need formatting", unformatted));
    }
    if args.check {
        println!("{} {} file(s) already formatted", "✓".green(), files.len());
    }

    Ok(())
}
