use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::gateway::{GatewayError, SearchGateway, SearchResultItem};

use super::command::{self, Command};
use super::format;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SEARCH_HINT: &str =
    "To search for music: type search followed by an artist name (e.g., \"search metallica\")";

const HELP_TEXT: &str = "Available commands:
  search <artist>  Search for music by artist name (e.g., \"search metallica\")
  lookup <id>      Show album details for an iTunes collection id
  clear            Clear the console
  help             Show this help message
  about            About this application
Example: Type \"search metallica\" to find Metallica's music
Use arrow up/down keys to navigate command history.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Info,
    Error,
    Warning,
    Help,
    About,
    Command,
    Result,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub text: String,
    pub kind: EntryKind,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recall {
    Older,
    Newer,
}

/// A gateway call the console asked for but does not run itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Search { term: String },
    Lookup { id: u64 },
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub ticket: Uuid,
    pub request: Request,
}

#[derive(Debug)]
pub enum Completion {
    Search {
        ticket: Uuid,
        term: String,
        outcome: Result<Vec<SearchResultItem>, GatewayError>,
    },
    Lookup {
        ticket: Uuid,
        id: u64,
        outcome: Result<Option<SearchResultItem>, GatewayError>,
    },
}

impl PendingRequest {
    fn new(request: Request) -> Self {
        Self {
            ticket: Uuid::new_v4(),
            request,
        }
    }

    pub async fn run(self, gateway: &dyn SearchGateway) -> Completion {
        match self.request {
            Request::Search { term } => {
                let outcome = gateway.query(&term).await.map(|r| r.results);
                Completion::Search {
                    ticket: self.ticket,
                    term,
                    outcome,
                }
            }
            Request::Lookup { id } => Completion::Lookup {
                ticket: self.ticket,
                id,
                outcome: gateway.lookup(id).await,
            },
        }
    }
}

/// Per-session console state: scrollback, history and the recall cursor.
///
/// The console never performs I/O. Commands that need the gateway hand back a
/// [`PendingRequest`]; whoever runs it feeds the result to [`Console::complete`].
#[derive(Debug)]
pub struct Console {
    entries: Vec<LogEntry>,
    history: Vec<String>,
    cursor: usize,
    in_flight: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        let mut console = Self {
            entries: Vec::new(),
            history: Vec::new(),
            cursor: 0,
            in_flight: 0,
        };
        console.push(
            EntryKind::Info,
            format!(
                "Welcome to Music Search Console v{}\n{}\nType help to see all available commands.",
                VERSION, SEARCH_HINT
            ),
        );
        console
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// True while at least one gateway call is outstanding. Advisory only.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Record a line, echo it, and run it.
    pub fn submit(&mut self, raw_line: &str) -> Option<PendingRequest> {
        if raw_line.trim().is_empty() {
            return None;
        }

        self.history.push(raw_line.to_string());
        self.cursor = self.history.len();
        self.push(EntryKind::Command, format!("> {}", raw_line));
        self.dispatch(raw_line)
    }

    /// Move through history. Returns the text the input should now show.
    pub fn recall(&mut self, direction: Recall) -> Option<&str> {
        if self.history.is_empty() {
            return None;
        }

        self.cursor = match direction {
            Recall::Older => self.cursor.saturating_sub(1),
            Recall::Newer => (self.cursor + 1).min(self.history.len()),
        };

        Some(self.history.get(self.cursor).map_or("", String::as_str))
    }

    pub fn dispatch(&mut self, raw_line: &str) -> Option<PendingRequest> {
        let command = command::parse(raw_line)?;
        debug!(?command, "dispatch");

        match command {
            Command::Help => self.push(EntryKind::Help, HELP_TEXT.to_string()),
            Command::About => self.push(EntryKind::About, about_text()),
            Command::Clear => {
                self.entries.clear();
                self.push(
                    EntryKind::Info,
                    format!("Console cleared.\n{}", SEARCH_HINT),
                );
            }
            Command::Search("") => self.push(
                EntryKind::Error,
                "Error: Please provide an artist name. Example: search Beatles".to_string(),
            ),
            Command::Search(term) => {
                self.push(EntryKind::Info, format!("Searching for \"{}\"...", term));
                return Some(self.begin(Request::Search {
                    term: term.to_string(),
                }));
            }
            Command::Lookup(args) => match args.parse::<u64>() {
                Ok(id) if id > 0 => {
                    self.push(EntryKind::Info, format!("Looking up album {}...", id));
                    return Some(self.begin(Request::Lookup { id }));
                }
                _ => self.push(
                    EntryKind::Error,
                    "Error: Please provide a numeric collection id. Example: lookup 1440857781"
                        .to_string(),
                ),
            },
            Command::Unknown(name) => self.push(
                EntryKind::Error,
                format!(
                    "Command not found: {}. Type 'help' to see available commands.",
                    name
                ),
            ),
        }
        None
    }

    /// Fold a finished gateway call into the scrollback, in arrival order.
    pub fn complete(&mut self, completion: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match completion {
            Completion::Search {
                ticket,
                term,
                outcome,
            } => match outcome {
                Ok(items) if items.is_empty() => {
                    info!(%ticket, term = %term, "search returned no results");
                    self.push(
                        EntryKind::Warning,
                        format!("No results found for \"{}\".", term),
                    );
                }
                Ok(items) => {
                    info!(%ticket, term = %term, results = items.len(), "search completed");
                    self.push(EntryKind::Result, format::results_table(&term, &items));
                }
                Err(err) => {
                    warn!(%ticket, term = %term, error = %err, "search failed");
                    self.push(
                        EntryKind::Error,
                        format!("Error searching for \"{}\": {}", term, err),
                    );
                }
            },
            Completion::Lookup {
                ticket,
                id,
                outcome,
            } => match outcome {
                Ok(Some(item)) => {
                    info!(%ticket, id, "lookup completed");
                    self.push(EntryKind::Result, format::album_detail(&item));
                }
                Ok(None) => {
                    info!(%ticket, id, "lookup found nothing");
                    self.push(EntryKind::Warning, format!("No album found with id {}.", id));
                }
                Err(err) => {
                    warn!(%ticket, id, error = %err, "lookup failed");
                    self.push(
                        EntryKind::Error,
                        format!("Error looking up album {}: {}", id, err),
                    );
                }
            },
        }
    }

    /// `submit`, then run any gateway call to completion before returning.
    pub async fn execute(&mut self, raw_line: &str, gateway: &dyn SearchGateway) {
        if let Some(pending) = self.submit(raw_line) {
            let completion = pending.run(gateway).await;
            self.complete(completion);
        }
    }

    fn begin(&mut self, request: Request) -> PendingRequest {
        self.in_flight += 1;
        let pending = PendingRequest::new(request);
        info!(ticket = %pending.ticket, request = ?pending.request, "gateway request issued");
        pending
    }

    fn push(&mut self, kind: EntryKind, text: String) {
        self.entries.push(LogEntry {
            text,
            kind,
            at: Local::now(),
        });
    }
}

fn about_text() -> String {
    format!(
        "Music Search Console v{}\n\
         A simple console interface for searching the iTunes music catalog.\n\
         Built with Rust on ratatui and reqwest.\n\
         To search for an artist, type \"search\" followed by the artist name.",
        VERSION
    )
}
