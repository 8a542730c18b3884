use std::io;
use std::time::Instant;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnableLineWrap, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use tracing::info;

use crate::bootstrap::{BootstrapController, PanelRenderer, PanelState};
use crate::service::{ServiceSupervisor, ShutdownProgress};
use crate::ui::{KeyValue, OutputMode, PlainRenderer, Renderer, StepState};

use super::config::CHROME_ROWS;
use super::terminal_text::format_elapsed;
use super::BootstrapTuiError;

pub(super) type TuiTerminal = Terminal<CrosstermBackend<std::io::Stdout>>;

pub(super) fn init_terminal() -> Result<TuiTerminal, io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

pub(super) fn log_viewport_height(terminal_rows: u16) -> usize {
    usize::from(terminal_rows.saturating_sub(CHROME_ROWS))
}

/// Stops the service with on-screen progress, restores the terminal and
/// prints the session summary. Returns the service's final diagnostic.
pub(super) fn shutdown_and_render_summary<R: PanelRenderer>(
    terminal: &mut TuiTerminal,
    controller: &mut BootstrapController<R, ServiceSupervisor>,
    started_at: Instant,
) -> Result<Option<String>, BootstrapTuiError> {
    let grace = controller.service().spec().shutdown_grace;
    controller
        .service_mut()
        .terminate_graceful_with_progress(grace, |progress| {
            let label = match progress {
                ShutdownProgress::SendingTerm => "Shutdown: sending SIGTERM to tor...",
                ShutdownProgress::Waiting => "Shutdown: waiting for tor to exit...",
                ShutdownProgress::ForceKilling => "Shutdown: tor is still running; killing it...",
                ShutdownProgress::Complete { .. } => "Shutdown: complete.",
            };
            let _ = draw_shutdown_status(terminal, label);
        });

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, EnableLineWrap)?;
    terminal.show_cursor()?;

    let state = controller.state();
    let diagnostic = controller.service().exit_diagnostic();
    let elapsed = format_elapsed(started_at.elapsed());
    info!(%state, diagnostic = ?diagnostic, %elapsed, "bootstrap pager closed");

    let mut renderer = PlainRenderer::stdout(OutputMode::from_env());
    renderer.section("Bootstrap Summary")?;
    renderer.key_values(&[
        KeyValue::new("state", state.to_string()),
        KeyValue::new("elapsed", elapsed),
        KeyValue::new(
            "tor",
            diagnostic
                .clone()
                .unwrap_or_else(|| "never started".to_owned()),
        ),
    ])?;
    if state == PanelState::Connected {
        renderer.step("bootstrap reached 100%", StepState::Done)?;
    } else {
        renderer.step("bootstrap did not complete", StepState::Failed)?;
    }
    renderer.text("")?;

    Ok(diagnostic)
}

fn draw_shutdown_status(terminal: &mut TuiTerminal, status: &str) -> Result<(), io::Error> {
    terminal.draw(|frame| {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let footer = Paragraph::new(status.to_owned()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(footer, chunks[1]);
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::log_viewport_height;

    #[test]
    fn viewport_excludes_chrome_rows() {
        assert_eq!(log_viewport_height(30), 24);
        assert_eq!(log_viewport_height(3), 0);
    }
}
