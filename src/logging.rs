//! File logging. Stdout belongs to the console, so traces go to
//! `~/.tunes/logs/tunes.log.<date>` instead.
//!
//! Filter priority: `TUNES_LOG`, then `RUST_LOG`, then `tunes=info`.

use std::path::Path;

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::settings::ensure_dir;

const LOG_PREFIX: &str = "tunes.log";
const DEFAULT_DIRECTIVE: &str = "tunes=info";

pub fn env_filter() -> EnvFilter {
    std::env::var("TUNES_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Keep the guard alive until exit or the
/// tail of the log is lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    ensure_dir(log_dir)?;
    prune_old_logs(log_dir, &chrono::Local::now().format("%Y-%m-%d").to_string());

    let appender = tracing_appender::rolling::daily(log_dir, LOG_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("tunes v{} starting", env!("CARGO_PKG_VERSION"));
    Ok(guard)
}

/// Keep only today's file.
fn prune_old_logs(log_dir: &Path, today: &str) {
    let Ok(entries) = std::fs::read_dir(log_dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(LOG_PREFIX) && !name.ends_with(today) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_today_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "tunes.log.2026-10-17",
            "tunes.log.2026-10-19",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        prune_old_logs(dir.path(), "2026-10-19");

        let mut left: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        left.sort();
        assert_eq!(left, vec!["notes.txt", "tunes.log.2026-10-19"]);
    }
}
