use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::bootstrap::{
    BootstrapController, DisplayText, PanelRenderer, PanelState, PulseValue, RenderError,
};
use crate::config::Config;
use crate::service::{ServiceEvent, ServiceSpec, ServiceSupervisor};
use crate::ui::{MessageBlock, PlainRenderer, Renderer, SpinnerHandle, UiError};

const EVENT_WAIT: Duration = Duration::from_millis(50);
const EXIT_SETTLE_WAIT: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Ui(#[from] UiError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to encode status record: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchOutcome {
    pub state: PanelState,
    pub service_exit: Option<String>,
}

impl WatchOutcome {
    pub fn connected(&self) -> bool {
        self.state == PanelState::Connected
    }
}

/// Headless panel: keeps the latest text and flags. Writes never fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchView {
    text: String,
    error_visible: bool,
    closed: bool,
    last_pulse: Option<PulseValue>,
}

impl WatchView {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn last_pulse(&self) -> Option<PulseValue> {
        self.last_pulse
    }
}

impl PanelRenderer for WatchView {
    fn set_pulse_value(&mut self, value: PulseValue) -> Result<(), RenderError> {
        self.last_pulse = Some(value);
        Ok(())
    }

    fn set_display_text(&mut self, text: &DisplayText) -> Result<(), RenderError> {
        self.text = text.to_string();
        Ok(())
    }

    fn set_error_visible(&mut self, visible: bool) -> Result<(), RenderError> {
        self.error_visible = visible;
        Ok(())
    }

    fn set_bootstrapping(&mut self, _bootstrapping: bool) -> Result<(), RenderError> {
        Ok(())
    }

    fn close_panel(&mut self) -> Result<(), RenderError> {
        self.closed = true;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WatchRecord<'a> {
    state: PanelState,
    text: &'a str,
    error: bool,
    elapsed_ms: u64,
}

enum Output {
    Json,
    Spinner(Box<dyn SpinnerHandle>),
    Lines,
}

/// Starts bootstrapping at once and reports every change of state or text
/// until the primary panel closes or the service goes away. An error line is
/// reported but does not end the watch; tor may still finish.
pub fn run_watch<W: Write>(
    config: &Config,
    cwd: PathBuf,
    json: bool,
    renderer: &mut PlainRenderer<W>,
) -> Result<WatchOutcome, WatchError> {
    let supervisor = ServiceSupervisor::new(ServiceSpec::from_config(config, cwd));
    let mut controller =
        BootstrapController::new(WatchView::default(), supervisor, config.pulse_settings());
    let started_at = Instant::now();

    let mut output = if json {
        Output::Json
    } else if renderer.progress_enabled() {
        Output::Spinner(renderer.spinner(&DisplayText::Starting.to_string())?)
    } else {
        Output::Lines
    };

    controller.start();
    let mut last: Option<(PanelState, String)> = None;
    let mut service_exit: Option<String> = None;

    loop {
        let snapshot = (controller.state(), controller.renderer().text().to_owned());
        if last.as_ref() != Some(&snapshot) {
            let (state, text) = &snapshot;
            emit(
                &mut output,
                renderer,
                *state,
                text,
                controller.renderer().error_visible(),
                started_at,
            )?;
            last = Some(snapshot);
        }

        if controller.is_closed() || service_exit.is_some() {
            break;
        }

        if let Some(event) = controller.service().next_event_timeout(EVENT_WAIT) {
            match event {
                ServiceEvent::Line { text, .. } => {
                    controller.on_status(Some(&text));
                }
                ServiceEvent::Exit { diagnostic } => {
                    while let Some(ServiceEvent::Line { text, .. }) =
                        controller.service().next_event_timeout(EXIT_SETTLE_WAIT)
                    {
                        controller.on_status(Some(&text));
                    }
                    if !controller.is_closed() {
                        controller.on_service_exit(&diagnostic);
                    }
                    service_exit = Some(diagnostic);
                }
            }
        }
        controller.pump_pulses();
    }

    let state = controller.state();
    finish(&mut output, renderer, state)?;
    info!(%state, exit = ?service_exit, "watch finished");

    let grace = controller.service().spec().shutdown_grace;
    controller
        .service_mut()
        .terminate_graceful_with_progress(grace, |progress| debug!(?progress, "watch shutdown"));

    Ok(WatchOutcome {
        state,
        service_exit,
    })
}

fn emit<W: Write>(
    output: &mut Output,
    renderer: &mut PlainRenderer<W>,
    state: PanelState,
    text: &str,
    error: bool,
    started_at: Instant,
) -> Result<(), WatchError> {
    match output {
        Output::Json => {
            let record = WatchRecord {
                state,
                text,
                error,
                elapsed_ms: u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX),
            };
            renderer.text(&serde_json::to_string(&record)?)?;
        }
        Output::Spinner(spinner) => {
            if !text.is_empty() {
                spinner.set_message(text);
            }
        }
        Output::Lines => renderer.state_line(state, text)?,
    }
    Ok(())
}

/// Failures are reported by the caller; only success is announced here.
fn finish<W: Write>(
    output: &mut Output,
    renderer: &mut PlainRenderer<W>,
    state: PanelState,
) -> Result<(), WatchError> {
    let connected = state == PanelState::Connected;
    match output {
        Output::Json => return Ok(()),
        Output::Spinner(spinner) if connected => spinner.finish_success("Connected to Tor"),
        Output::Spinner(spinner) => spinner.finish_error(&DisplayText::ServiceError.to_string()),
        Output::Lines => {}
    }
    if connected {
        renderer.success_block(&MessageBlock::new(
            "Tor is ready",
            "bootstrap reached 100%",
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_view_keeps_rendered_text_and_close_flag() {
        let mut view = WatchView::default();
        view.set_display_text(&DisplayText::Notice("Bootstrapped 5%".to_owned()))
            .expect("text");
        view.set_pulse_value(PulseValue::new(40)).expect("pulse");
        view.close_panel().expect("close");

        assert_eq!(view.text(), "Bootstrapped 5%");
        assert_eq!(view.last_pulse(), Some(PulseValue::new(40)));
        assert!(view.is_closed());
        assert!(!view.error_visible());
    }

    #[test]
    fn json_record_uses_kebab_case_state() {
        let record = WatchRecord {
            state: PanelState::BootstrapError,
            text: "Tor failed to start. Check the log panel or restart the app.",
            error: true,
            elapsed_ms: 12,
        };
        let encoded = serde_json::to_value(&record).expect("json");
        assert_eq!(encoded["state"], "bootstrap-error");
        assert_eq!(encoded["error"], true);
        assert_eq!(encoded["elapsed_ms"], 12);
    }

    #[test]
    fn outcome_is_connected_only_in_connected_state() {
        let outcome = WatchOutcome {
            state: PanelState::Connected,
            service_exit: None,
        };
        assert!(outcome.connected());
        let outcome = WatchOutcome {
            state: PanelState::BootstrapError,
            service_exit: Some("exit=1".to_owned()),
        };
        assert!(!outcome.connected());
    }
}
