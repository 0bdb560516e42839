use super::{describe_error, find_layout_files};
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_editor::tree::flatten_tree;
use trellis_editor::Document;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// File or directory to check (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

pub fn check(args: CheckArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let files = find_layout_files(&cwd.join(&args.path), &config.extension)?;

    if files.is_empty() {
        println!("{}", format!("No .{} files found", config.extension).yellow());
        return Ok(());
    }

    println!("{}", "Checking layout files...".bright_blue().bold());

    let mut error_count = 0;

    for file in &files {
        let source = fs::read_to_string(file)?;
        let relative_path = file.strip_prefix(cwd).unwrap_or(file);

        match Document::from_source(&source) {
            Ok(doc) => {
                // The root is not an element of the file
                let elements = flatten_tree(doc.root()).len() - 1;
                println!(
                    "  {} {} ({} elements)",
                    "✓".green(),
                    relative_path.display(),
                    elements
                );
            }
            Err(e) => {
                error_count += 1;
                eprintln!("  {} {}", "✗".red(), relative_path.display());
                eprintln!("{}", describe_error(&e, file, &source));
            }
        }
    }

    println!();
    if error_count == 0 {
        println!("{} Checked {} files", "✓".green(), files.len());
        Ok(())
    } else {
        Err(anyhow!(
            "{} of {} files have errors",
            error_count,
            files.len()
        ))
    }
}
