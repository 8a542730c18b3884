use std::collections::VecDeque;

use crate::bootstrap::{PanelKind, PanelPager};
use crate::config::Config;

use super::terminal_text::{push_entry, sanitize_log_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LogEntryKind {
    Stdout,
    Stderr,
    Exit,
    Note,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LogEntry {
    pub(super) kind: LogEntryKind,
    pub(super) line: String,
}

pub(super) struct SessionState {
    pub(super) titles: Vec<String>,
    pub(super) kinds: Vec<PanelKind>,
    pub(super) active_index: usize,
    pub(super) logs: VecDeque<LogEntry>,
    pub(super) scroll_offset: usize,
    pub(super) follow: bool,
    pub(super) show_help: bool,
    pub(super) show_settings: bool,
    pub(super) spinner_tick: usize,
    pub(super) last_exit: Option<String>,
    pub(super) settings: Vec<(String, String)>,
}

impl SessionState {
    pub(super) fn new(pager: &PanelPager, config: &Config) -> Self {
        Self {
            titles: pager.page_titles(),
            kinds: pager.panels().iter().map(|panel| panel.kind).collect(),
            active_index: 0,
            logs: VecDeque::new(),
            scroll_offset: 0,
            follow: true,
            show_help: false,
            show_settings: false,
            spinner_tick: 0,
            last_exit: None,
            settings: settings_rows(config),
        }
    }

    pub(super) fn active_kind(&self) -> Option<PanelKind> {
        self.kinds.get(self.active_index).copied()
    }

    pub(super) fn next_panel(&mut self) {
        self.active_index = next_index(self.active_index, self.kinds.len());
    }

    pub(super) fn prev_panel(&mut self) {
        self.active_index = prev_index(self.active_index, self.kinds.len());
    }

    pub(super) fn push_log(&mut self, kind: LogEntryKind, line: &str) {
        push_entry(
            &mut self.logs,
            LogEntry {
                kind,
                line: sanitize_log_text(line),
            },
        );
    }

    pub(super) fn note(&mut self, line: &str) {
        self.push_log(LogEntryKind::Note, &format!("[onionboot] {line}"));
    }

    pub(super) fn max_scroll(&self, viewport: usize) -> usize {
        self.logs.len().saturating_sub(viewport.max(1))
    }

    /// Follow pins the view to the newest line; otherwise the offset is only
    /// clamped to what is still in the buffer.
    pub(super) fn clamp_scroll(&mut self, max_offset: usize) {
        self.scroll_offset = if self.follow {
            max_offset
        } else {
            self.scroll_offset.min(max_offset)
        };
    }
}

pub(super) fn next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

pub(super) fn prev_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if current == 0 {
        len - 1
    } else {
        current - 1
    }
}

fn settings_rows(config: &Config) -> Vec<(String, String)> {
    vec![
        ("service".to_owned(), config.service.run.clone()),
        (
            "working dir".to_owned(),
            config
                .service
                .cwd
                .as_ref()
                .map(|cwd| cwd.display().to_string())
                .unwrap_or_else(|| "<current>".to_owned()),
        ),
        (
            "normalize notices".to_owned(),
            config.service.normalize_notices.to_string(),
        ),
        (
            "shutdown grace".to_owned(),
            format!("{}ms", config.service.shutdown_grace_ms),
        ),
        (
            "pulse interval".to_owned(),
            format!("{}ms", config.pulse.interval_ms),
        ),
        ("pulse step".to_owned(), config.pulse.step.to_string()),
    ]
}
