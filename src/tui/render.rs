use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::bootstrap::{PanelKind, PanelState};

use super::state::SessionState;
use super::view::BootstrapView;

mod bootstrap_pane;
mod footer;
mod header;
mod help_overlay;
mod log_pane;

use bootstrap_pane::render_bootstrap_pane;
use footer::render_footer;
use header::{panel_block, render_tabs};
use help_overlay::{render_help_overlay, render_settings_overlay};
use log_pane::render_log_pane;

pub(super) fn render_ui(
    frame: &mut Frame<'_>,
    session: &SessionState,
    view: &BootstrapView,
    state: PanelState,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_tabs(frame, chunks[0], &session.titles, session.active_index, state);

    if session.show_help {
        render_help_overlay(frame, chunks[1]);
    } else {
        match session.active_kind() {
            Some(PanelKind::Bootstrap) => render_bootstrap_pane(
                frame,
                chunks[1],
                view,
                state,
                session.last_exit.as_deref(),
            ),
            Some(PanelKind::Log) => render_log_pane(frame, chunks[1], session),
            None => {
                let empty = Paragraph::new("no panels configured; connect requests are ignored")
                    .style(Style::default().fg(Color::DarkGray))
                    .block(panel_block(None, Color::DarkGray));
                frame.render_widget(empty, chunks[1]);
            }
        }
    }

    if session.show_settings {
        render_settings_overlay(frame, &session.settings);
    }

    render_footer(frame, chunks[2], state, session);
}
