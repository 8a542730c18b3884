use anstyle::{AnsiColor, Color, Style};

use crate::bootstrap::PanelState;

pub const COLOR_ENV: &str = "ONIONBOOT_COLOR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Auto,
    Always,
    Never,
}

impl OutputMode {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(COLOR_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("always") => OutputMode::Always,
            Some("never") => OutputMode::Never,
            _ => OutputMode::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Style,
    pub muted: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub label: Style,
    pub value: Style,
}

fn fg(color: AnsiColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(color)))
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: fg(AnsiColor::Magenta).bold(),
            muted: fg(AnsiColor::BrightBlack),
            success: fg(AnsiColor::Green).bold(),
            warning: fg(AnsiColor::Yellow).bold(),
            error: fg(AnsiColor::Red).bold(),
            label: fg(AnsiColor::BrightMagenta),
            value: fg(AnsiColor::White),
        }
    }
}

impl Theme {
    pub fn for_state(&self, state: PanelState) -> Style {
        match state {
            PanelState::Idle => self.muted,
            PanelState::Connecting => self.accent,
            PanelState::BootstrapError => self.error,
            PanelState::Connected => self.success,
        }
    }
}

pub fn resolve_color_enabled(mode: OutputMode, is_tty: bool) -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    match mode {
        OutputMode::Always => true,
        OutputMode::Never => false,
        OutputMode::Auto => is_tty,
    }
}

pub fn is_ci_environment() -> bool {
    std::env::var_os("CI").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_parses_known_values_only() {
        assert_eq!(OutputMode::parse(Some("always")), OutputMode::Always);
        assert_eq!(OutputMode::parse(Some("never")), OutputMode::Never);
        assert_eq!(OutputMode::parse(Some("sometimes")), OutputMode::Auto);
        assert_eq!(OutputMode::parse(None), OutputMode::Auto);
    }

    #[test]
    fn error_state_uses_error_style() {
        let theme = Theme::default();
        assert_eq!(theme.for_state(PanelState::BootstrapError), theme.error);
        assert_eq!(theme.for_state(PanelState::Connected), theme.success);
    }
}
