use crate::bootstrap::{DisplayText, PanelRenderer, PulseValue, RenderError};

const TARGET: &str = "bootstrap panel";

/// What the bootstrap page draws. The controller writes it through
/// [`PanelRenderer`]; the pager only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapView {
    has_target: bool,
    pulse: PulseValue,
    text: DisplayText,
    error_visible: bool,
    bootstrapping: bool,
    closed: bool,
}

impl BootstrapView {
    /// `has_target` is false when no bootstrap panel is on screen; every
    /// write then reports a missing target.
    pub fn new(has_target: bool) -> Self {
        Self {
            has_target,
            pulse: PulseValue::MAX,
            text: DisplayText::Cleared,
            error_visible: false,
            bootstrapping: false,
            closed: false,
        }
    }

    pub fn pulse(&self) -> PulseValue {
        self.pulse
    }

    /// Pulse mapped to `0.0..=1.0`.
    pub fn intensity(&self) -> f64 {
        f64::from(self.pulse.get()) / f64::from(PulseValue::MAX.get())
    }

    pub fn text(&self) -> &DisplayText {
        &self.text
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn bootstrapping(&self) -> bool {
        self.bootstrapping
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn target(&self) -> Result<(), RenderError> {
        if !self.has_target {
            return Err(RenderError::MissingTarget(TARGET));
        }
        if self.closed {
            return Err(RenderError::Closed(TARGET.to_owned()));
        }
        Ok(())
    }
}

impl PanelRenderer for BootstrapView {
    fn set_pulse_value(&mut self, value: PulseValue) -> Result<(), RenderError> {
        self.target()?;
        self.pulse = value;
        Ok(())
    }

    fn set_display_text(&mut self, text: &DisplayText) -> Result<(), RenderError> {
        self.target()?;
        self.text = text.clone();
        Ok(())
    }

    fn set_error_visible(&mut self, visible: bool) -> Result<(), RenderError> {
        self.target()?;
        self.error_visible = visible;
        Ok(())
    }

    fn set_bootstrapping(&mut self, bootstrapping: bool) -> Result<(), RenderError> {
        self.target()?;
        self.bootstrapping = bootstrapping;
        Ok(())
    }

    fn close_panel(&mut self) -> Result<(), RenderError> {
        self.target()?;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_records_the_latest_values() {
        let mut view = BootstrapView::new(true);
        view.set_pulse_value(PulseValue::new(0)).expect("pulse");
        view.set_display_text(&DisplayText::Starting).expect("text");
        view.set_bootstrapping(true).expect("bootstrapping");

        assert_eq!(view.pulse(), PulseValue::MIN);
        assert_eq!(view.intensity(), 0.0);
        assert_eq!(view.text(), &DisplayText::Starting);
        assert!(view.bootstrapping());
        assert!(!view.error_visible());
    }

    #[test]
    fn view_without_bootstrap_panel_reports_missing_target() {
        let mut view = BootstrapView::new(false);
        assert_eq!(
            view.set_error_visible(true),
            Err(RenderError::MissingTarget(TARGET))
        );
        assert!(!view.error_visible());
    }

    #[test]
    fn closed_view_rejects_further_writes() {
        let mut view = BootstrapView::new(true);
        view.close_panel().expect("close");
        assert!(view.is_closed());
        assert!(matches!(
            view.set_pulse_value(PulseValue::MIN),
            Err(RenderError::Closed(_))
        ));
        assert_eq!(view.pulse(), PulseValue::MAX);
    }
}
