use std::io::{IsTerminal, Write};

use anstream::{AutoStream, ColorChoice};
use anstyle::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::bootstrap::PanelState;
use crate::ui::progress::{IndicatifSpinnerHandle, NoopSpinnerHandle};
use crate::ui::renderer::{Renderer, SpinnerHandle, UiResult};
use crate::ui::table::render_table;
use crate::ui::theme::{is_ci_environment, resolve_color_enabled, OutputMode, Theme};
use crate::ui::widgets::{KeyValue, MessageBlock, NoticeLevel, StepState, TableSpec};

const SPINNER_TICK: std::time::Duration = std::time::Duration::from_millis(80);

pub struct PlainRenderer<W: Write> {
    writer: W,
    color_enabled: bool,
    progress_enabled: bool,
    theme: Theme,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(writer: W, color_enabled: bool) -> Self {
        Self {
            writer,
            color_enabled,
            progress_enabled: false,
            theme: Theme::default(),
        }
    }

    pub fn with_progress_enabled(mut self, enabled: bool) -> Self {
        self.progress_enabled = enabled;
        self
    }

    pub fn progress_enabled(&self) -> bool {
        self.progress_enabled
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// One `state: text` line, coloured by panel state.
    pub fn state_line(&mut self, state: PanelState, text: &str) -> UiResult<()> {
        let label = self.style_text(self.theme.for_state(state), &state.to_string());
        if text.is_empty() {
            writeln!(self.writer, "{label}")?;
        } else {
            writeln!(self.writer, "{label}: {text}")?;
        }
        Ok(())
    }

    fn style_text(&self, style: Style, text: &str) -> String {
        if !self.color_enabled {
            return text.to_owned();
        }
        format!("{}{}{}", style.render(), text, style.render_reset())
    }

    fn write_block(&mut self, label: &str, style: Style, block: &MessageBlock) -> UiResult<()> {
        let marker = self.style_text(style, label);
        writeln!(self.writer, "{marker} {}", block.title)?;
        writeln!(self.writer, "  {}", block.body)?;
        if let Some(hint) = &block.hint {
            let hint_label = self.style_text(self.theme.muted, "hint");
            writeln!(self.writer, "  {hint_label}: {hint}")?;
        }
        Ok(())
    }
}

fn color_choice(mode: OutputMode) -> ColorChoice {
    match mode {
        OutputMode::Auto => ColorChoice::Auto,
        OutputMode::Always => ColorChoice::AlwaysAnsi,
        OutputMode::Never => ColorChoice::Never,
    }
}

impl PlainRenderer<AutoStream<std::io::Stdout>> {
    pub fn stdout(mode: OutputMode) -> Self {
        let is_tty = std::io::stdout().is_terminal();
        let stream = AutoStream::new(std::io::stdout(), color_choice(mode));
        Self::new(stream, resolve_color_enabled(mode, is_tty))
            .with_progress_enabled(is_tty && !is_ci_environment())
    }
}

impl PlainRenderer<AutoStream<std::io::Stderr>> {
    pub fn stderr(mode: OutputMode) -> Self {
        let is_tty = std::io::stderr().is_terminal();
        let stream = AutoStream::new(std::io::stderr(), color_choice(mode));
        Self::new(stream, resolve_color_enabled(mode, is_tty))
            .with_progress_enabled(is_tty && !is_ci_environment())
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn text(&mut self, body: &str) -> UiResult<()> {
        write!(self.writer, "{body}")?;
        if !body.ends_with('\n') {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn section(&mut self, title: &str) -> UiResult<()> {
        let rendered = self.style_text(self.theme.accent, title);
        let underline = self.style_text(self.theme.muted, &"─".repeat(title.chars().count()));
        writeln!(self.writer, "{rendered}")?;
        writeln!(self.writer, "{underline}")?;
        Ok(())
    }

    fn notice(&mut self, level: NoticeLevel, body: &str) -> UiResult<()> {
        let (label, style) = match level {
            NoticeLevel::Info => ("info", self.theme.accent),
            NoticeLevel::Success => ("ok", self.theme.success),
            NoticeLevel::Warning => ("warn", self.theme.warning),
            NoticeLevel::Error => ("error", self.theme.error),
        };
        let marker = self.style_text(style, "•");
        let label = self.style_text(self.theme.muted, label);
        writeln!(self.writer, "{marker} {label}: {body}")?;
        Ok(())
    }

    fn success_block(&mut self, block: &MessageBlock) -> UiResult<()> {
        self.write_block("[connected]", self.theme.success, block)
    }

    fn error_block(&mut self, block: &MessageBlock) -> UiResult<()> {
        self.write_block("[error]", self.theme.error, block)
    }

    fn key_values(&mut self, items: &[KeyValue]) -> UiResult<()> {
        for item in items {
            let key = self.style_text(self.theme.label, &item.key);
            let value = self.style_text(self.theme.value, &item.value);
            writeln!(self.writer, "{key}: {value}")?;
        }
        Ok(())
    }

    fn step(&mut self, label: &str, state: StepState) -> UiResult<()> {
        let (symbol, style) = match state {
            StepState::Running => ("◌", self.theme.accent),
            StepState::Done => ("✓", self.theme.success),
            StepState::Failed => ("✕", self.theme.error),
        };
        let symbol = self.style_text(style, symbol);
        writeln!(self.writer, "{symbol} {label}")?;
        Ok(())
    }

    fn table(&mut self, spec: &TableSpec) -> UiResult<()> {
        let rendered = render_table(spec);
        writeln!(self.writer, "{rendered}")?;
        Ok(())
    }

    fn spinner(&mut self, label: &str) -> UiResult<Box<dyn SpinnerHandle>> {
        if self.progress_enabled {
            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template("{spinner:.magenta} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message(label.to_owned());
            spinner.enable_steady_tick(SPINNER_TICK);
            return Ok(Box::new(IndicatifSpinnerHandle::new(spinner)));
        }
        self.step(label, StepState::Running)?;
        Ok(Box::new(NoopSpinnerHandle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(renderer: PlainRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).expect("utf8")
    }

    #[test]
    fn renders_error_block_with_hint_without_color() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);

        renderer
            .error_block(
                &MessageBlock::new("Config invalid", "pulse.interval_ms must be greater than zero")
                    .with_hint("Edit onionboot.toml or pass `--config <path>`"),
            )
            .expect("render error block");

        assert_eq!(
            rendered(renderer),
            "[error] Config invalid\n  pulse.interval_ms must be greater than zero\n  hint: Edit onionboot.toml or pass `--config <path>`\n"
        );
    }

    #[test]
    fn renders_section_and_state_lines_without_color() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);

        renderer.section("Bootstrap").expect("section");
        renderer
            .state_line(PanelState::Connecting, "Starting Tor...")
            .expect("state line");
        renderer.state_line(PanelState::Idle, "").expect("state line");

        assert_eq!(
            rendered(renderer),
            "Bootstrap\n─────────\nconnecting: Starting Tor...\nidle\n"
        );
    }

    #[test]
    fn spinner_falls_back_to_step_output_when_progress_disabled() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false).with_progress_enabled(false);

        let spinner = renderer.spinner("Starting Tor...").expect("spinner");
        spinner.set_message("Bootstrapped 45%");
        spinner.finish_success("Connected");

        assert_eq!(rendered(renderer), "◌ Starting Tor...\n");
    }

    #[test]
    fn renders_key_values_and_table_without_color() {
        let mut renderer = PlainRenderer::new(Vec::<u8>::new(), false);
        renderer
            .key_values(&[KeyValue::new("pulse interval", "100ms")])
            .expect("key values");
        renderer
            .table(&TableSpec::new(
                vec!["page".to_owned(), "kind".to_owned()],
                vec![vec!["WELCOME".to_owned(), "bootstrap".to_owned()]],
            ))
            .expect("table");

        let output = rendered(renderer);
        assert!(output.starts_with("pulse interval: 100ms\n"));
        assert!(output.contains("WELCOME"));
        assert!(output.contains("bootstrap"));
    }
}
