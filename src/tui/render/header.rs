use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Tabs};
use ratatui::Frame;

use crate::bootstrap::PanelState;

pub(super) fn state_color(state: PanelState) -> Color {
    match state {
        PanelState::Idle => Color::DarkGray,
        PanelState::Connecting => Color::Magenta,
        PanelState::BootstrapError => Color::Red,
        PanelState::Connected => Color::Green,
    }
}

pub(super) fn render_tabs(
    frame: &mut Frame<'_>,
    area: ratatui::layout::Rect,
    titles: &[String],
    active_index: usize,
    state: PanelState,
) {
    let titles = titles
        .iter()
        .enumerate()
        .map(|(idx, title)| {
            // The primary page carries the bootstrap state colour.
            let style = if idx == 0 && state != PanelState::Idle {
                Style::default().fg(state_color(state))
            } else if idx == active_index {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Line::from(Span::styled(title.clone(), style))
        })
        .collect::<Vec<Line>>();

    let tabs = Tabs::new(titles)
        .select(active_index)
        .block(panel_block(Some(" ONIONBOOT "), Color::Magenta).title_bottom(state_badge(state)))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

pub(super) fn panel_block(title: Option<&str>, border_color: Color) -> Block<'_> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(border::ROUNDED)
        .border_style(Style::default().fg(border_color));
    match title {
        Some(title) => block.title_top(
            Line::from(Span::styled(
                title,
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ))
            .left_aligned(),
        ),
        None => block,
    }
}

/// Bottom-right badge: current state and crate version.
fn state_badge(state: PanelState) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {state} "), Style::default().fg(state_color(state))),
        Span::styled(
            format!("v{} ", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::LightMagenta),
        ),
    ])
    .right_aligned()
}
