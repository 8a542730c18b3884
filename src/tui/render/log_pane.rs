use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::tui::state::{LogEntryKind, SessionState};
use crate::tui::terminal_text::log_line_style;

use super::header::panel_block;

pub(super) fn render_log_pane(frame: &mut Frame<'_>, area: Rect, session: &SessionState) {
    let viewport = usize::from(area.height.saturating_sub(2));
    let panel = panel_block(None, Color::DarkGray);

    if session.logs.is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "no tor output yet; press c to connect",
            Style::default().fg(Color::DarkGray),
        )))
        .block(panel);
        frame.render_widget(waiting, area);
        return;
    }

    let lines = session
        .logs
        .iter()
        .map(|entry| match entry.kind {
            LogEntryKind::Stdout => Line::from(Span::styled(
                entry.line.clone(),
                log_line_style(&entry.line),
            )),
            LogEntryKind::Stderr => Line::from(vec![
                Span::styled("[stderr] ", Style::default().fg(Color::Red)),
                Span::styled(entry.line.clone(), log_line_style(&entry.line)),
            ]),
            LogEntryKind::Exit => Line::from(vec![
                Span::styled("[exit] ", Style::default().fg(Color::Yellow)),
                Span::styled(entry.line.clone(), Style::default().fg(Color::Gray)),
            ]),
            LogEntryKind::Note => Line::from(Span::styled(
                entry.line.clone(),
                Style::default().fg(Color::LightBlue),
            )),
        })
        .collect::<Vec<Line>>();

    let max_offset = session.logs.len().saturating_sub(viewport.max(1));
    let offset = session.scroll_offset.min(max_offset);
    let logs = Paragraph::new(lines)
        .block(panel)
        .scroll((offset.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(logs, area);

    let mut scrollbar_state = ScrollbarState::new(max_offset.saturating_add(viewport).max(1))
        .viewport_content_length(viewport.max(1))
        .position(offset);
    frame.render_stateful_widget(
        Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
        area,
        &mut scrollbar_state,
    );
}
