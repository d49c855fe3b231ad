use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tunes", version, about = "Search the iTunes music catalog from your terminal")]
pub struct Cli {
    /// Read configuration from this file instead of ~/.tunes/config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the interactive console (default)
    Ui,
    /// Line-mode console on stdin/stdout
    Repl,
    /// Search once and print the results
    Search {
        /// Artist, album or song
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
        /// Max results
        #[arg(long)]
        limit: Option<u32>,
        /// Print the raw iTunes payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show album details for an iTunes collection id
    Lookup {
        id: u64,
        /// Print the raw iTunes record as JSON
        #[arg(long)]
        json: bool,
    },
}
