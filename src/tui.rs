use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use thiserror::Error;
use tracing::info;

use crate::bootstrap::{BootstrapController, PanelKind, PanelPager, PanelState};
use crate::config::Config;
use crate::service::{ServiceSpec, ServiceSupervisor};
use crate::ui::UiError;

mod config;
mod events;
mod lifecycle;
mod render;
mod state;
mod terminal_text;
mod view;

pub use view::BootstrapView;

use config::{INPUT_POLL_WAIT, MAX_EVENTS_PER_TICK};
use events::{drain_service_events, handle_key_event, LoopControl};
use lifecycle::{init_terminal, log_viewport_height, shutdown_and_render_summary};
use render::render_ui;
use state::SessionState;

#[derive(Debug, Error)]
pub enum BootstrapTuiError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Ui(#[from] UiError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapTuiOutcome {
    pub state: PanelState,
    pub service_exit: Option<String>,
    pub elapsed: Duration,
}

/// Runs the interactive pager until the primary panel closes or the user
/// quits. The service is always shut down before this returns.
pub fn run_bootstrap_tui(
    config: &Config,
    cwd: PathBuf,
) -> Result<BootstrapTuiOutcome, BootstrapTuiError> {
    let pager = PanelPager::from_config(&config.panels);
    let has_target = pager
        .primary()
        .is_some_and(|panel| panel.kind == PanelKind::Bootstrap);
    let supervisor = ServiceSupervisor::new(ServiceSpec::from_config(config, cwd));
    let mut controller = BootstrapController::new(
        BootstrapView::new(has_target),
        supervisor,
        config.pulse_settings(),
    );
    let mut session = SessionState::new(&pager, config);
    let started_at = Instant::now();

    let mut terminal = init_terminal()?;
    info!(panels = pager.len(), "bootstrap pager opened");

    let result: Result<(), BootstrapTuiError> = loop {
        drain_service_events(&mut controller, &mut session, MAX_EVENTS_PER_TICK);
        pager.drain_requests(&mut controller);
        controller.pump_pulses();
        session.spinner_tick = session.spinner_tick.wrapping_add(1);
        if controller.is_closed() {
            info!("primary panel closed; ending session");
            break Ok(());
        }

        let size = match terminal.size() {
            Ok(size) => size,
            Err(err) => break Err(err.into()),
        };
        let max_offset = session.max_scroll(log_viewport_height(size.height));
        session.clamp_scroll(max_offset);
        let state = controller.state();
        if let Err(err) = terminal.draw(|frame| {
            render_ui(frame, &session, controller.renderer(), state);
        }) {
            break Err(err.into());
        }

        match event::poll(INPUT_POLL_WAIT) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => break Err(err.into()),
        }
        match event::read() {
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if let LoopControl::Quit = handle_key_event(&key, &pager, &mut session, max_offset)
                {
                    break Ok(());
                }
            }
            Ok(_) => {}
            Err(err) => break Err(err.into()),
        }
    };

    let state = controller.state();
    let service_exit = shutdown_and_render_summary(&mut terminal, &mut controller, started_at)?;
    result?;
    Ok(BootstrapTuiOutcome {
        state,
        service_exit,
        elapsed: started_at.elapsed(),
    })
}
