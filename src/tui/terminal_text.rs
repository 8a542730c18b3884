use std::collections::VecDeque;
use std::time::Duration;

use ratatui::style::{Color, Style};

use super::config::MAX_LOG_LINES;
use super::state::LogEntry;

pub(super) fn push_entry(buffer: &mut VecDeque<LogEntry>, entry: LogEntry) {
    buffer.push_back(entry);
    while buffer.len() > MAX_LOG_LINES {
        buffer.pop_front();
    }
}

/// Drops control bytes, escape sequences included; tor output is plain text.
pub(super) fn sanitize_log_text(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !ch.is_control() || *ch == '\t')
        .map(|ch| if ch == '\t' { ' ' } else { ch })
        .collect()
}

/// Colour for one log line by tor severity.
pub(super) fn log_line_style(line: &str) -> Style {
    if line.starts_with("ERROR: ") || line.contains("[err]") {
        Style::default().fg(Color::Red)
    } else if line.contains("[warn]") {
        Style::default().fg(Color::Yellow)
    } else if line.contains("Bootstrapped") {
        Style::default().fg(Color::LightMagenta)
    } else {
        Style::default().fg(Color::Gray)
    }
}

pub(super) fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h{minutes:02}m{secs:02}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs:02}s")
    } else {
        format!("{secs}s")
    }
}
