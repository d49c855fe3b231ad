mod cli;
mod config;
mod console;
mod gateway;
mod logging;
mod repl;
mod tui;

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use config::settings::Config;
use gateway::{ItunesClient, SearchGateway};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init(&config::settings::log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("{} {:#}", "warning: logging disabled:".yellow(), e);
            None
        }
    };

    let cfg = config::settings::load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Ui) => handle_ui(&cfg)?,
        None if std::io::stdin().is_terminal() => handle_ui(&cfg)?,
        None | Some(Commands::Repl) => {
            let client = ItunesClient::new(&cfg.itunes)?;
            repl::run_repl(&client).await?;
        }
        Some(Commands::Search { term, limit, json }) => {
            handle_search(&cfg, &term.join(" "), limit, json).await?
        }
        Some(Commands::Lookup { id, json }) => handle_lookup(&cfg, id, json).await?,
    }

    Ok(())
}

fn handle_ui(cfg: &Config) -> Result<()> {
    let gateway: Arc<dyn SearchGateway> = Arc::new(ItunesClient::new(&cfg.itunes)?);
    tui::app::run_tui(cfg, gateway)
}

async fn handle_search(cfg: &Config, term: &str, limit: Option<u32>, json: bool) -> Result<()> {
    let mut client = ItunesClient::new(&cfg.itunes)?;
    if let Some(limit) = limit {
        client = client.with_limit(limit);
    }

    if json {
        let response = client.query(term).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    repl::run_once(&format!("search {}", term), &client).await
}

async fn handle_lookup(cfg: &Config, id: u64, json: bool) -> Result<()> {
    let client = ItunesClient::new(&cfg.itunes)?;

    if json {
        let Some(item) = client.lookup(id).await? else {
            bail!("No album found with id {}.", id);
        };
        println!("{}", serde_json::to_string_pretty(&item)?);
        return Ok(());
    }

    repl::run_once(&format!("lookup {}", id), &client).await
}
