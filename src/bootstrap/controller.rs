use std::fmt::{Display, Formatter};
use std::sync::mpsc::{self, Receiver};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::pulse::{PulseDirection, PulseFrame, PulseGenerator, PulseSettings, PulseValue};
use super::status::{interpret, DisplayText};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelState {
    Idle,
    Connecting,
    BootstrapError,
    Connected,
}

impl PanelState {
    pub fn is_terminal(self) -> bool {
        self == PanelState::Connected
    }
}

impl Display for PanelState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PanelState::Idle => "idle",
            PanelState::Connecting => "connecting",
            PanelState::BootstrapError => "bootstrap-error",
            PanelState::Connected => "connected",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("render target `{0}` is not present on the visible panel")]
    MissingTarget(&'static str),
    #[error("render sink closed: {0}")]
    Closed(String),
}

/// Sink for everything the controller derives. Implementations own no
/// controller state; a missing element is reported, never panicked on.
pub trait PanelRenderer {
    fn set_pulse_value(&mut self, value: PulseValue) -> Result<(), RenderError>;
    fn set_display_text(&mut self, text: &DisplayText) -> Result<(), RenderError>;
    fn set_error_visible(&mut self, visible: bool) -> Result<(), RenderError>;
    /// Hides the connect affordance and reveals the status line while true.
    fn set_bootstrapping(&mut self, bootstrapping: bool) -> Result<(), RenderError>;
    fn close_panel(&mut self) -> Result<(), RenderError>;
}

/// Fire-and-forget commands to the process doing the actual bootstrap.
pub trait BootstrapService {
    fn request_start(&mut self);
    fn request_stop(&mut self);
}

fn guarded(operation: &'static str, result: Result<(), RenderError>) {
    if let Err(err) = result {
        warn!(operation, error = %err, "render call skipped");
    }
}

pub struct BootstrapController<R, S> {
    state: PanelState,
    renderer: R,
    service: S,
    pulse: PulseGenerator,
    frames: Receiver<PulseFrame>,
    closed: bool,
}

impl<R: PanelRenderer, S: BootstrapService> BootstrapController<R, S> {
    pub fn new(renderer: R, service: S, settings: PulseSettings) -> Self {
        let (frames_tx, frames_rx) = mpsc::channel();
        Self {
            state: PanelState::Idle,
            renderer,
            service,
            pulse: PulseGenerator::new(settings, frames_tx),
            frames: frames_rx,
            closed: false,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn pulse(&self) -> &PulseGenerator {
        &self.pulse
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Begins a bootstrap attempt from `Idle` or `BootstrapError`.
    pub fn start(&mut self) -> bool {
        match self.state {
            PanelState::Idle | PanelState::BootstrapError => {}
            PanelState::Connecting | PanelState::Connected => {
                warn!(state = %self.state, "start ignored");
                return false;
            }
        }

        info!(from = %self.state, "bootstrap starting");
        self.state = PanelState::Connecting;
        // An error leaves the worker running; retire it so the new session
        // is seeded from full intensity.
        self.pulse.stop();
        self.pulse.start(PulseValue::MAX, PulseDirection::Decreasing);
        guarded("set_pulse_value", self.renderer.set_pulse_value(PulseValue::MAX));
        guarded("set_error_visible", self.renderer.set_error_visible(false));
        guarded(
            "set_display_text",
            self.renderer.set_display_text(&DisplayText::Starting),
        );
        guarded("set_bootstrapping", self.renderer.set_bootstrapping(true));
        self.service.request_start();
        true
    }

    /// Halts the pulse and the service and returns to `Idle`. The worker
    /// drains on its own; this never blocks on it.
    pub fn stop(&mut self) -> bool {
        if self.state.is_terminal() {
            warn!("stop ignored after connection completed");
            return false;
        }

        info!(from = %self.state, "bootstrap stopping");
        self.pulse.stop();
        guarded("set_pulse_value", self.renderer.set_pulse_value(PulseValue::MAX));
        guarded(
            "set_display_text",
            self.renderer.set_display_text(&DisplayText::Cleared),
        );
        guarded("set_error_visible", self.renderer.set_error_visible(false));
        guarded("set_bootstrapping", self.renderer.set_bootstrapping(false));
        self.service.request_stop();
        self.state = PanelState::Idle;
        true
    }

    /// Feeds one raw service line through the interpreter and applies it.
    /// `Idle` is left only through `start()`, so lines arriving while idle
    /// are late output of a stopped service and change nothing.
    pub fn on_status(&mut self, raw: Option<&str>) -> PanelState {
        match self.state {
            PanelState::Connected => {
                debug!("status ignored after connection completed");
                return self.state;
            }
            PanelState::Idle => {
                debug!("status ignored while idle");
                return self.state;
            }
            PanelState::Connecting | PanelState::BootstrapError => {}
        }

        let outcome = interpret(raw);
        if outcome.is_unchanged() {
            return self.state;
        }

        if let Some(text) = &outcome.text {
            guarded("set_display_text", self.renderer.set_display_text(text));
        }

        // The error text survives a completion marker on the same line, the
        // state does not.
        if outcome.text == Some(DisplayText::ServiceError) {
            if self.state != PanelState::BootstrapError {
                info!(from = %self.state, "service reported an error");
            }
            self.state = PanelState::BootstrapError;
            guarded("set_error_visible", self.renderer.set_error_visible(true));
            guarded("set_bootstrapping", self.renderer.set_bootstrapping(true));
        }

        if outcome.completed {
            self.complete();
        }
        self.state
    }

    /// The service process went away. Only meaningful mid-bootstrap.
    pub fn on_service_exit(&mut self, diagnostic: &str) -> PanelState {
        if self.state != PanelState::Connecting {
            debug!(state = %self.state, diagnostic, "service exit ignored");
            return self.state;
        }
        warn!(diagnostic, "service exited before bootstrap completed");
        self.pulse.stop();
        self.state = PanelState::BootstrapError;
        guarded(
            "set_display_text",
            self.renderer.set_display_text(&DisplayText::ServiceError),
        );
        guarded("set_error_visible", self.renderer.set_error_visible(true));
        self.state
    }

    /// Forwards queued pulse frames of the active session to the renderer.
    /// Call on the update thread; returns how many values were applied.
    pub fn pump_pulses(&mut self) -> usize {
        let mut applied = 0usize;
        while let Ok(frame) = self.frames.try_recv() {
            if self.pulse.active_session() != Some(frame.session) {
                continue;
            }
            guarded("set_pulse_value", self.renderer.set_pulse_value(frame.value));
            applied += 1;
        }
        applied
    }

    fn complete(&mut self) {
        info!(from = %self.state, "bootstrap completed");
        self.pulse.stop();
        self.state = PanelState::Connected;
        if !self.closed {
            self.closed = true;
            guarded("close_panel", self.renderer.close_panel());
        }
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
