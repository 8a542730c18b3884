use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::bootstrap::PanelState;
use crate::tui::state::SessionState;

use super::header::state_color;

pub(super) fn render_footer(
    frame: &mut Frame<'_>,
    area: ratatui::layout::Rect,
    state: PanelState,
    session: &SessionState,
) {
    let muted = Style::default().fg(Color::DarkGray);
    let active = Style::default().fg(Color::Yellow);
    let separator = || Span::styled("  |  ", muted);
    let mut spans = vec![
        Span::styled(
            state.to_string(),
            Style::default()
                .fg(state_color(state))
                .add_modifier(Modifier::BOLD),
        ),
        separator(),
        Span::styled("connect (c)", muted),
        separator(),
        Span::styled("stop (s)", muted),
        separator(),
        Span::styled("settings (g)", if session.show_settings { active } else { muted }),
        separator(),
        Span::styled("help (h)", if session.show_help { active } else { muted }),
    ];
    if !session.follow {
        spans.push(separator());
        spans.push(Span::styled("follow off (end)", active));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
