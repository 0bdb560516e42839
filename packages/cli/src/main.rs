mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, fmt, tree, CheckArgs, FmtArgs, TreeArgs};
use tracing_subscriber::EnvFilter;

/// Trellis CLI - format and check terminal UI layout files
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate layout files in canonical form
    Fmt(FmtArgs),

    /// Parse layout files and report errors
    Check(CheckArgs),

    /// Print the parsed tree of a layout file as JSON
    Tree(TreeArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Fmt(args) => fmt(args, &cwd),
            Command::Check(args) => check(args, &cwd),
            Command::Tree(args) => tree(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
