use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::config::settings::Config;
use crate::console::{Completion, Console, PendingRequest, Recall};
use crate::gateway::SearchGateway;

use super::console_view;

pub struct App {
    pub console: Console,
    pub input: String,
    /// Rows scrolled up from the bottom of the log; 0 follows new output.
    pub scroll: usize,
    pub page: usize,
    pub ticks: usize,
    pub show_timestamps: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            console: Console::new(),
            input: String::new(),
            scroll: 0,
            page: 10,
            ticks: 0,
            show_timestamps: config.ui.show_timestamps,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<PendingRequest> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('l') if ctrl => {
                self.scroll = 0;
                return self.console.dispatch("clear");
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input);
                self.scroll = 0;
                return self.console.submit(&line);
            }
            KeyCode::Up => {
                if let Some(text) = self.console.recall(Recall::Older) {
                    self.input = text.to_string();
                }
            }
            KeyCode::Down => {
                if let Some(text) = self.console.recall(Recall::Newer) {
                    self.input = text.to_string();
                }
            }
            KeyCode::PageUp => self.scroll = self.scroll.saturating_add(self.page),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_sub(self.page),
            KeyCode::Home => self.scroll = usize::MAX,
            KeyCode::End => self.scroll = 0,
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !ctrl && !alt => self.input.push(c),
            _ => {}
        }
        None
    }

    pub fn complete(&mut self, completion: Completion) {
        self.console.complete(completion);
        self.scroll = 0;
    }

    pub fn clamp_scroll(&mut self, total_rows: usize, visible_rows: usize) {
        self.scroll = self.scroll.min(total_rows.saturating_sub(visible_rows));
        self.page = visible_rows.max(1);
    }
}

fn spawn_request(
    pending: PendingRequest,
    gateway: &Arc<dyn SearchGateway>,
    tx: &UnboundedSender<Completion>,
) {
    debug!(ticket = %pending.ticket, "spawning gateway request");
    let gateway = Arc::clone(gateway);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = pending.run(gateway.as_ref()).await;
        let _ = tx.send(completion);
    });
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    gateway: &Arc<dyn SearchGateway>,
    tx: &UnboundedSender<Completion>,
    rx: &mut UnboundedReceiver<Completion>,
    tick: Duration,
) -> Result<()> {
    loop {
        while let Ok(completion) = rx.try_recv() {
            app.complete(completion);
        }
        app.ticks = app.ticks.wrapping_add(1);

        let height = terminal.size()?.height;
        let total = console_view::log_lines(app).len();
        app.clamp_scroll(total, console_view::log_rows(height));
        terminal.draw(|frame| console_view::render(frame, app))?;

        if event::poll(tick)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(pending) = app.handle_key(key) {
                        spawn_request(pending, gateway, tx);
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

pub fn run_tui(config: &Config, gateway: Arc<dyn SearchGateway>) -> Result<()> {
    let mut app = App::new(config);
    let tick = Duration::from_millis(config.ui.tick_ms.max(10));
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
        default_hook(panic);
    }));

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    info!("tui started");

    let result = event_loop(&mut terminal, &mut app, &gateway, &tx, &mut rx, tick);

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    info!("tui stopped");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::EntryKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_line(app: &mut App, line: &str) -> Option<PendingRequest> {
        for c in line.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter))
    }

    #[test]
    fn test_enter_submits_and_clears_input() {
        let mut app = App::new(&Config::default());
        assert!(type_line(&mut app, "help").is_none());
        assert!(app.input.is_empty());
        assert_eq!(app.console.history(), ["help".to_string()]);
        assert_eq!(app.console.entries().last().unwrap().kind, EntryKind::Help);
    }

    #[test]
    fn test_search_yields_pending_request() {
        let mut app = App::new(&Config::default());
        let pending = type_line(&mut app, "search abba");
        assert!(pending.is_some());
        assert!(app.console.is_loading());
    }

    #[test]
    fn test_arrows_recall_history() {
        let mut app = App::new(&Config::default());
        type_line(&mut app, "help");
        type_line(&mut app, "about");

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.input, "about");
        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.input, "help");
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.input, "");
    }

    #[test]
    fn test_backspace_edits() {
        let mut app = App::new(&Config::default());
        for c in "helpp".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.input, "help");
    }

    #[test]
    fn test_ctrl_l_clears_without_history() {
        let mut app = App::new(&Config::default());
        type_line(&mut app, "help");
        app.handle_key(ctrl('l'));
        assert_eq!(app.console.entries().len(), 1);
        assert_eq!(app.console.history().len(), 1);
    }

    #[test]
    fn test_modifier_chords_do_not_type() {
        let mut app = App::new(&Config::default());
        app.handle_key(ctrl('a'));
        app.handle_key(KeyEvent::new(KeyCode::Char('b'), KeyModifiers::ALT));
        assert!(app.input.is_empty());

        app.handle_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT));
        assert_eq!(app.input, "A");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(&Config::default());
        app.handle_key(ctrl('c'));
        assert!(app.should_quit);

        let mut app = App::new(&Config::default());
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_scroll_clamps() {
        let mut app = App::new(&Config::default());
        app.handle_key(key(KeyCode::Home));
        app.clamp_scroll(50, 20);
        assert_eq!(app.scroll, 30);

        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.scroll, 10);
        app.handle_key(key(KeyCode::End));
        assert_eq!(app.scroll, 0);

        app.handle_key(key(KeyCode::PageUp));
        app.clamp_scroll(5, 20);
        assert_eq!(app.scroll, 0);
    }
}
