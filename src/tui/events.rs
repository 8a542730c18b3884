use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::bootstrap::{BootstrapControl, BootstrapController, PanelPager, PanelRenderer};
use crate::service::{ServiceEvent, ServiceStream, ServiceSupervisor};

use super::config::{EVENT_DRAIN_WAIT, EXIT_SETTLE_WAIT, PAGE_SCROLL_LINES};
use super::state::{LogEntryKind, SessionState};

pub(super) enum LoopControl {
    Continue,
    Quit,
}

/// Moves queued service output into the log and through the controller.
/// Lines still in flight when the process exits are applied before the exit.
pub(super) fn drain_service_events<R: PanelRenderer>(
    controller: &mut BootstrapController<R, ServiceSupervisor>,
    session: &mut SessionState,
    max_events: usize,
) {
    for _ in 0..max_events {
        let Some(event) = controller.service().next_event_timeout(EVENT_DRAIN_WAIT) else {
            break;
        };
        match event {
            ServiceEvent::Line { stream, text } => apply_line(controller, session, stream, &text),
            ServiceEvent::Exit { diagnostic } => {
                while let Some(ServiceEvent::Line { stream, text }) =
                    controller.service().next_event_timeout(EXIT_SETTLE_WAIT)
                {
                    apply_line(controller, session, stream, &text);
                }
                session.push_log(LogEntryKind::Exit, &diagnostic);
                session.last_exit = Some(diagnostic.clone());
                controller.on_service_exit(&diagnostic);
            }
        }
    }
}

fn apply_line<R: PanelRenderer>(
    controller: &mut BootstrapController<R, ServiceSupervisor>,
    session: &mut SessionState,
    stream: ServiceStream,
    text: &str,
) {
    let kind = match stream {
        ServiceStream::Stdout => LogEntryKind::Stdout,
        ServiceStream::Stderr => LogEntryKind::Stderr,
    };
    session.push_log(kind, text);
    controller.on_status(Some(text));
}

/// Start/stop keys go through the active panel's own handle, so every page
/// reaches the primary panel the same way.
pub(super) fn handle_key_event(
    key: &KeyEvent,
    pager: &PanelPager,
    session: &mut SessionState,
    max_offset: usize,
) -> LoopControl {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        return LoopControl::Quit;
    }

    if session.show_settings {
        match key.code {
            KeyCode::Char('q') => return LoopControl::Quit,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('g') => session.show_settings = false,
            _ => {}
        }
        return LoopControl::Continue;
    }

    let control = pager
        .get(session.active_index)
        .map(|panel| panel.control.clone())
        .unwrap_or_default();

    match key.code {
        KeyCode::Char('q') => return LoopControl::Quit,
        KeyCode::Char('c') => {
            debug!(panel = session.active_index, "connect key");
            control.start_bootstrapping();
            session.note("connect requested");
        }
        KeyCode::Char('s') => {
            debug!(panel = session.active_index, "stop key");
            control.stop_bootstrapping();
            session.note("stop requested");
        }
        KeyCode::Char('g') => {
            control.stop_bootstrapping();
            session.show_settings = true;
            session.show_help = false;
        }
        KeyCode::Char('h') => {
            session.show_help = !session.show_help;
        }
        KeyCode::Right | KeyCode::Tab => session.next_panel(),
        KeyCode::Left | KeyCode::BackTab => session.prev_panel(),
        KeyCode::Up => {
            session.follow = false;
            session.scroll_offset = session.scroll_offset.saturating_sub(1);
        }
        KeyCode::Down => {
            session.scroll_offset = session.scroll_offset.saturating_add(1).min(max_offset);
        }
        KeyCode::PageUp => {
            session.follow = false;
            session.scroll_offset = session.scroll_offset.saturating_sub(PAGE_SCROLL_LINES);
        }
        KeyCode::PageDown => {
            session.scroll_offset = session
                .scroll_offset
                .saturating_add(PAGE_SCROLL_LINES)
                .min(max_offset);
        }
        KeyCode::Home => {
            session.follow = false;
            session.scroll_offset = 0;
        }
        KeyCode::End => {
            session.follow = true;
            session.scroll_offset = max_offset;
        }
        KeyCode::Esc => {
            session.show_help = false;
        }
        _ => {}
    }

    LoopControl::Continue
}
