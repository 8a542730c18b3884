use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use thiserror::Error;
use tracing::info;

use crate::config::{Config, ConfigError};
use crate::tui::{run_bootstrap_tui, BootstrapTuiError};
use crate::ui::theme::resolve_color_enabled;
use crate::ui::{KeyValue, NoticeLevel, OutputMode, PlainRenderer, Renderer, TableSpec, UiError};
use crate::watch::{run_watch, WatchError};
use crate::{Command, PanelsArgs, RunArgs, WatchArgs};

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to resolve current directory: {0}")]
    Cwd(#[source] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Tui(#[from] BootstrapTuiError),
    #[error(transparent)]
    Watch(#[from] WatchError),
    #[error(transparent)]
    Ui(#[from] UiError),
    #[error("ui render failed: invalid utf-8 in rendered output: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("tor did not finish bootstrapping ({0})")]
    NotConnected(String),
}

pub fn run_command(cmd: Command) -> Result<String, RunnerError> {
    match cmd {
        Command::Help => Ok(String::new()),
        Command::Run(args) => run_pager(args),
        Command::Watch(args) => run_watch_command(args),
        Command::Panels(args) => run_panels(args),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>, PathBuf), RunnerError> {
    let cwd = std::env::current_dir().map_err(RunnerError::Cwd)?;
    let (config, source) = Config::resolve(explicit, &cwd)?;
    info!(
        source = %source
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "defaults".to_owned()),
        panels = config.panels.len(),
        "config loaded"
    );
    Ok((config, source, cwd))
}

pub fn run_pager(args: RunArgs) -> Result<String, RunnerError> {
    let (config, _, cwd) = load_config(args.config.as_deref())?;
    let config = if args.connect_only {
        config.connect_only()
    } else {
        config
    };
    let outcome = run_bootstrap_tui(&config, cwd)?;
    info!(state = %outcome.state, "pager session ended");
    Ok(String::new())
}

pub fn run_watch_command(args: WatchArgs) -> Result<String, RunnerError> {
    let (config, _, cwd) = load_config(args.config.as_deref())?;
    let mut renderer = PlainRenderer::stdout(OutputMode::from_env());
    let outcome = run_watch(&config, cwd, args.json, &mut renderer)?;
    if !outcome.connected() {
        let reason = outcome
            .service_exit
            .map(|exit| format!("{}, tor {exit}", outcome.state))
            .unwrap_or_else(|| outcome.state.to_string());
        return Err(RunnerError::NotConnected(reason));
    }
    Ok(String::new())
}

pub fn run_panels(args: PanelsArgs) -> Result<String, RunnerError> {
    let (config, source, _) = load_config(args.config.as_deref())?;
    let color_enabled =
        resolve_color_enabled(OutputMode::from_env(), std::io::stdout().is_terminal());
    render_panels(&config, source.as_deref(), color_enabled)
}

pub fn render_panels(
    config: &Config,
    source: Option<&Path>,
    color_enabled: bool,
) -> Result<String, RunnerError> {
    let mut renderer = PlainRenderer::new(Vec::<u8>::new(), color_enabled);
    renderer.section("Panels")?;
    if config.panels.is_empty() {
        renderer.notice(
            NoticeLevel::Warning,
            "no panels configured; connect requests will be ignored",
        )?;
    } else {
        let rows = config
            .panels
            .iter()
            .enumerate()
            .map(|(idx, panel)| {
                let args = panel
                    .args
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .collect::<Vec<String>>()
                    .join(" ");
                vec![
                    idx.to_string(),
                    panel.title.to_uppercase(),
                    panel.kind.label().to_owned(),
                    if idx == 0 { "yes" } else { "" }.to_owned(),
                    if args.is_empty() { "-".to_owned() } else { args },
                ]
            })
            .collect::<Vec<Vec<String>>>();
        renderer.table(&TableSpec::new(
            vec![
                "#".to_owned(),
                "page".to_owned(),
                "kind".to_owned(),
                "primary".to_owned(),
                "args".to_owned(),
            ],
            rows,
        ))?;
    }
    renderer.text("")?;

    renderer.section("Settings")?;
    renderer.key_values(&[
        KeyValue::new(
            "config",
            source
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "built-in defaults".to_owned()),
        ),
        KeyValue::new("service.run", config.service.run.clone()),
        KeyValue::new(
            "service.cwd",
            config
                .service
                .cwd
                .as_ref()
                .map(|cwd| cwd.display().to_string())
                .unwrap_or_else(|| "<current>".to_owned()),
        ),
        KeyValue::new(
            "service.normalize_notices",
            config.service.normalize_notices.to_string(),
        ),
        KeyValue::new(
            "service.shutdown_grace_ms",
            config.service.shutdown_grace_ms.to_string(),
        ),
        KeyValue::new("pulse.interval_ms", config.pulse.interval_ms.to_string()),
        KeyValue::new("pulse.step", config.pulse.step.to_string()),
    ])?;

    Ok(String::from_utf8(renderer.into_inner())?)
}

#[cfg(test)]
#[path = "tests/runner_tests.rs"]
mod tests;
