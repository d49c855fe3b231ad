//! Pure rendering helpers for search results.
//!
//! Nothing here touches the scrollback or the terminal, so the field
//! fallback rules can be tested on plain `SearchResultItem` values.

use chrono::{DateTime, Datelike};

use crate::gateway::models::SearchResultItem;

/// Widest a table cell may grow before it is cut with an ellipsis.
pub const MAX_CELL_WIDTH: usize = 40;

const UNKNOWN: &str = "Unknown";

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Upper-case the first character, leave the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `kind`, falling back to `wrapperType`, capitalized for display.
pub fn item_type(item: &SearchResultItem) -> String {
    let raw = present(&item.kind)
        .or_else(|| present(&item.wrapper_type))
        .unwrap_or(UNKNOWN);
    capitalize_first(raw)
}

pub fn artist(item: &SearchResultItem) -> &str {
    present(&item.artist_name).unwrap_or(UNKNOWN)
}

/// Track name, then collection name, then the artist (artist rows have neither).
pub fn display_name(item: &SearchResultItem) -> &str {
    present(&item.track_name)
        .or_else(|| present(&item.collection_name))
        .unwrap_or_else(|| artist(item))
}

pub fn artwork(item: &SearchResultItem) -> Option<&str> {
    present(&item.artwork_url100).or_else(|| present(&item.artwork_url60))
}

/// iTunes serves any square size from the same path; swap the size token.
pub fn high_res_artwork(url: &str) -> String {
    url.replace("100x100", "600x600").replace("60x60", "600x600")
}

pub fn release_year(date: &str) -> Option<i32> {
    DateTime::parse_from_rfc3339(date).ok().map(|dt| dt.year())
}

pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// The body of a `result` entry: a count line followed by a Type/Artist/Name table.
pub fn results_table(term: &str, items: &[SearchResultItem]) -> String {
    let header = ["Type", "Artist", "Name"];

    let rows: Vec<[String; 3]> = items
        .iter()
        .map(|item| {
            [
                truncate(&item_type(item), MAX_CELL_WIDTH),
                truncate(artist(item), MAX_CELL_WIDTH),
                truncate(display_name(item), MAX_CELL_WIDTH),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("Found {} results for \"{}\":\n", items.len(), term);
    out.push_str(&table_line(&header.map(String::from), &widths));
    out.push_str(&table_line(&widths.map(|w| "─".repeat(w)), &widths));
    for row in &rows {
        out.push_str(&table_line(row, &widths));
    }
    out.truncate(out.trim_end().len());
    out
}

fn table_line(cells: &[String; 3], widths: &[usize; 3]) -> String {
    let line = format!(
        "{:<w0$}  {:<w1$}  {}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1],
    );
    format!("{}\n", line.trim_end())
}

/// The body of a `result` entry for `lookup`.
pub fn album_detail(item: &SearchResultItem) -> String {
    let mut lines = vec![
        format!("Album:   {}", present(&item.collection_name).unwrap_or_else(|| display_name(item))),
        format!("Artist:  {}", artist(item)),
        format!("Type:    {}", item_type(item)),
    ];

    if let Some(year) = item.release_date.as_deref().and_then(release_year) {
        lines.push(format!("Year:    {}", year));
    }
    if let Some(genre) = present(&item.primary_genre_name) {
        lines.push(format!("Genre:   {}", genre));
    }
    if let Some(count) = item.track_count {
        lines.push(format!("Tracks:  {}", count));
    }
    match artwork(item) {
        Some(url) => lines.push(format!("Artwork: {}", high_res_artwork(url))),
        None => lines.push("Artwork: No image".to_string()),
    }

    lines.join("\n")
}
