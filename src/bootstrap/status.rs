use std::fmt::{Display, Formatter};

use super::controller::PanelState;

/// Prefix the service puts on informational status lines.
pub const NOTICE_PREFIX: &str = "NOTICE: ";

/// Fragment the service emits once bootstrap progress reaches 100%.
pub const BOOTSTRAP_DONE_MARKER: &str = "Bootstrapped 100%";

/// Text handed to the rendering collaborator. Fixed variants are localised by
/// the collaborator; `Display` gives the stock English strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayText {
    Starting,
    Notice(String),
    ServiceError,
    Cleared,
}

impl DisplayText {
    pub fn is_empty(&self) -> bool {
        matches!(self, DisplayText::Cleared)
    }
}

impl Display for DisplayText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayText::Starting => write!(f, "Starting Tor..."),
            DisplayText::Notice(message) => write!(f, "{message}"),
            DisplayText::ServiceError => write!(
                f,
                "Tor failed to start. Check the log panel or restart the app."
            ),
            DisplayText::Cleared => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusOutcome {
    pub state: Option<PanelState>,
    pub text: Option<DisplayText>,
    pub completed: bool,
}

impl StatusOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.state.is_none() && self.text.is_none() && !self.completed
    }
}

/// Maps one raw service status line to the state and text it implies.
///
/// The error branch is a substring heuristic over free text: it can fire on
/// benign lines that merely mention "error". Completion is checked on its own,
/// so a notice that carries the done marker yields both text and `Connected`.
pub fn interpret(raw: Option<&str>) -> StatusOutcome {
    let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
        return StatusOutcome::default();
    };

    let mut outcome = if let Some(message) = raw.strip_prefix(NOTICE_PREFIX) {
        StatusOutcome {
            state: Some(PanelState::Connecting),
            text: Some(DisplayText::Notice(message.to_owned())),
            completed: false,
        }
    } else if raw.to_lowercase().contains("error") {
        StatusOutcome {
            state: Some(PanelState::BootstrapError),
            text: Some(DisplayText::ServiceError),
            completed: false,
        }
    } else {
        StatusOutcome::default()
    };

    if raw.contains(BOOTSTRAP_DONE_MARKER) {
        outcome.state = Some(PanelState::Connected);
        outcome.completed = true;
    }
    outcome
}

#[cfg(test)]
#[path = "../tests/status_tests.rs"]
mod tests;
