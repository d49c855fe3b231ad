use std::io::{IsTerminal, Write};

use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::console::{Console, EntryKind, LogEntry};
use crate::gateway::SearchGateway;

pub fn paint(entry: &LogEntry) -> String {
    let text = entry.text.as_str();
    match entry.kind {
        EntryKind::Command => text.cyan().bold().to_string(),
        EntryKind::Info => text.dimmed().to_string(),
        EntryKind::Error => text.red().to_string(),
        EntryKind::Warning => text.yellow().to_string(),
        EntryKind::Help => text.green().to_string(),
        EntryKind::About => text.magenta().to_string(),
        EntryKind::Result => text.to_string(),
    }
}

/// Entries appended by the last command. A `clear` shrinks the log, in which
/// case everything left is new.
fn fresh(entries: &[LogEntry], before: usize) -> &[LogEntry] {
    if entries.len() > before {
        &entries[before..]
    } else {
        entries
    }
}

fn print_entries<'a>(entries: impl IntoIterator<Item = &'a LogEntry>, echo: bool) {
    for entry in entries {
        if entry.kind == EntryKind::Command && !echo {
            continue;
        }
        for line in paint(entry).lines() {
            println!("  {}", line);
        }
    }
}

/// Line-at-a-time console over stdin. Each search finishes before the next
/// line is read. `exit`, `quit` or EOF end the session.
pub async fn run_repl(gateway: &dyn SearchGateway) -> Result<()> {
    let interactive = std::io::stdin().is_terminal();
    let mut console = Console::new();
    print_entries(console.entries(), !interactive);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if interactive {
            print!("{} ", ">".cyan().bold());
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        let before = console.entries().len();
        console.execute(&line, gateway).await;
        print_entries(fresh(console.entries(), before), !interactive);
    }

    tracing::info!(commands = console.history().len(), "repl session ended");
    Ok(())
}

/// Split one-shot output into the entries to print and the failure, if any.
/// The failure text is reported once, through the returned error.
fn one_shot_output(entries: &[LogEntry]) -> (Vec<&LogEntry>, Option<&str>) {
    let failure = entries
        .iter()
        .find(|e| e.kind == EntryKind::Error)
        .map(|e| e.text.as_str());
    let shown = entries
        .iter()
        .filter(|e| e.kind != EntryKind::Error)
        .collect();
    (shown, failure)
}

/// Run a single console line and print its output. Fails if the command
/// ended in an error entry.
pub async fn run_once(line: &str, gateway: &dyn SearchGateway) -> Result<()> {
    let mut console = Console::new();
    let before = console.entries().len();
    console.execute(line, gateway).await;

    let (shown, failure) = one_shot_output(fresh(console.entries(), before));
    print_entries(shown, false);

    if let Some(text) = failure {
        anyhow::bail!("{}", text);
    }
    Ok(())
}
