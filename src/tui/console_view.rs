use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::console::{EntryKind, LogEntry};

use super::app::App;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Header, input and footer rows plus the log block's borders.
const CHROME_ROWS: u16 = 3 + 3 + 1 + 2;

pub fn log_rows(frame_height: u16) -> usize {
    frame_height.saturating_sub(CHROME_ROWS) as usize
}

fn kind_style(kind: EntryKind) -> Style {
    match kind {
        EntryKind::Command => Style::default().fg(Color::Cyan).bold(),
        EntryKind::Info => Style::default().fg(Color::Gray),
        EntryKind::Error => Style::default().fg(Color::Red),
        EntryKind::Warning => Style::default().fg(Color::Yellow),
        EntryKind::Help => Style::default().fg(Color::Green),
        EntryKind::About => Style::default().fg(Color::Magenta),
        EntryKind::Result => Style::default().fg(Color::White),
    }
}

fn entry_lines(entry: &LogEntry, show_timestamps: bool) -> Vec<Line<'_>> {
    let style = kind_style(entry.kind);
    entry
        .text
        .lines()
        .enumerate()
        .map(|(i, text)| {
            let mut spans = Vec::with_capacity(2);
            if show_timestamps {
                let gutter = if i == 0 {
                    entry.at.format("%H:%M:%S ").to_string()
                } else {
                    " ".repeat(9)
                };
                spans.push(Span::styled(gutter, Style::default().fg(Color::DarkGray)));
            }
            spans.push(Span::styled(text, style));
            Line::from(spans)
        })
        .collect()
}

/// One row per text line; the log is never soft-wrapped.
pub fn log_lines(app: &App) -> Vec<Line<'_>> {
    app.console
        .entries()
        .iter()
        .flat_map(|entry| entry_lines(entry, app.show_timestamps))
        .collect()
}

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled("  tunes", Style::default().fg(Color::Cyan).bold()),
        Span::styled("  music search console", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, chunks[0]);

    let lines = log_lines(app);
    let visible = chunks[1].height.saturating_sub(2) as usize;
    let total = lines.len();
    let end = total.saturating_sub(app.scroll);
    let start = end.saturating_sub(visible);

    let position = if app.scroll > 0 {
        format!(" {}-{} of {} ", start + 1, end, total)
    } else {
        String::new()
    };

    let log = Paragraph::new(lines[start..end].to_vec()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Output ")
            .title_style(Style::default().fg(Color::White).bold())
            .title_bottom(Line::from(position).right_aligned()),
    );
    frame.render_widget(log, chunks[1]);

    let title = if app.console.is_loading() {
        format!(" Searching {} ", SPINNER[app.ticks / 2 % SPINNER.len()])
    } else if app.console.cursor() < app.console.history().len() {
        format!(
            " History {}/{} ",
            app.console.cursor() + 1,
            app.console.history().len()
        )
    } else {
        " Command ".to_string()
    };
    let input = Paragraph::new(Line::from(vec![
        Span::styled("  > ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("{}_", app.input), Style::default().fg(Color::White)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title)
            .title_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(input, chunks[2]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled(" Enter", Style::default().fg(Color::Cyan)),
        Span::styled(" run  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Up/Down", Style::default().fg(Color::Cyan)),
        Span::styled(" history  ", Style::default().fg(Color::DarkGray)),
        Span::styled("PgUp/PgDn", Style::default().fg(Color::Cyan)),
        Span::styled(" scroll  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Ctrl-L", Style::default().fg(Color::Cyan)),
        Span::styled(" clear  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::styled(" quit", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(help, chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Config;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_multiline_entries_split_into_rows() {
        let mut app = App::new(&Config::default());
        app.console.submit("help");
        let help_rows = app.console.entries().last().unwrap().text.lines().count();
        let welcome_rows = app.console.entries()[0].text.lines().count();

        assert_eq!(log_lines(&app).len(), welcome_rows + 1 + help_rows);
    }

    #[test]
    fn test_timestamp_gutter_only_on_first_row() {
        let mut app = App::new(&Config::default());
        app.show_timestamps = true;
        let lines = log_lines(&app);
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[1].spans[0].content, " ".repeat(9));

        app.show_timestamps = false;
        assert_eq!(log_lines(&app)[0].spans.len(), 1);
    }

    #[test]
    fn test_render_shows_input_and_output() {
        let mut app = App::new(&Config::default());
        app.show_timestamps = false;
        app.console.submit("bogus");
        app.input = "search abba".to_string();

        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let screen: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(screen.contains("Command not found: bogus."));
        assert!(screen.contains("> search abba_"));
    }
}
