use indicatif::ProgressBar;

use crate::ui::renderer::SpinnerHandle;

/// Used when stdout is not a terminal; the caller prints state lines instead.
#[derive(Debug, Default)]
pub struct NoopSpinnerHandle;

impl SpinnerHandle for NoopSpinnerHandle {
    fn set_message(&self, _message: &str) {}

    fn finish_success(&self, _message: &str) {}

    fn finish_error(&self, _message: &str) {}
}

#[derive(Debug, Clone)]
pub struct IndicatifSpinnerHandle {
    bar: ProgressBar,
}

impl IndicatifSpinnerHandle {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

impl SpinnerHandle for IndicatifSpinnerHandle {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_owned());
    }

    fn finish_success(&self, message: &str) {
        self.bar.finish_with_message(format!("✓ {message}"));
    }

    fn finish_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("✕ {message}"));
    }
}
