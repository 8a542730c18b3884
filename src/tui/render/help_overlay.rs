use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use super::header::panel_block;

pub(super) fn render_help_overlay(frame: &mut Frame<'_>, area: Rect) {
    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let help_lines = vec![
        heading("Bootstrap"),
        Line::from("c               connect to tor (from any page)"),
        Line::from("s               stop bootstrapping"),
        Line::from("g               stop and open settings"),
        Line::from(""),
        heading("Pages"),
        Line::from("left/right      switch pages"),
        Line::from("up/down         scroll the tor log line-by-line"),
        Line::from("pgup/pgdn       scroll the tor log by page"),
        Line::from("home/end        jump to top/bottom (end re-enables follow)"),
        Line::from(""),
        Line::from("h               toggle this help"),
        Line::from("q / ctrl+c      quit and shut tor down"),
    ];
    let help = Paragraph::new(help_lines).block(panel_block(Some(" Help "), Color::Magenta));
    frame.render_widget(help, area);
}

pub(super) fn render_settings_overlay(frame: &mut Frame<'_>, settings: &[(String, String)]) {
    let area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, area);
    let width = settings
        .iter()
        .map(|(key, _)| key.chars().count())
        .max()
        .unwrap_or(0);
    let mut lines = vec![
        Line::from(Span::styled(
            "bootstrapping stopped",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    lines.extend(settings.iter().map(|(key, value)| {
        Line::from(vec![
            Span::styled(format!("{key:<width$}  "), Style::default().fg(Color::LightMagenta)),
            Span::styled(value.clone(), Style::default().fg(Color::Gray)),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "esc to close",
        Style::default().fg(Color::DarkGray),
    )));
    let paragraph = Paragraph::new(lines).block(panel_block(Some(" Settings "), Color::Magenta));
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
