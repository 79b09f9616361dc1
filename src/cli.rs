use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chaptersplit")]
#[command(about = "Split a PDF into one file per top-level bookmark chapter")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// PDF file to split; omit to choose a file and chapters interactively
    pub path: Option<PathBuf>,

    /// Chapters to split (e.g., "1-3,5,7-end"); defaults to all
    #[arg(short, long, requires = "path")]
    pub chapters: Option<String>,

    /// Log diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the chapters a split would produce
    List {
        /// PDF file to inspect
        path: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the full table of contents / bookmarks
    Toc {
        /// PDF file to inspect
        path: PathBuf,
    },

    /// Run as MCP server on stdio
    Mcp,
}
