pub mod bootstrap;
pub mod config;
pub mod logging;
pub mod runner;
pub mod service;
pub mod tui;
pub mod ui;
pub mod watch;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunArgs),
    Watch(WatchArgs),
    Panels(PanelsArgs),
    Help,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub connect_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchArgs {
    pub config: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelsArgs {
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CliParseError {
    #[error("--config requires a value")]
    MissingConfigValue,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// `onionboot` with no arguments opens the bootstrap pager.
pub fn parse_command<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(Command::Run(RunArgs::default()));
    };

    match cmd.as_str() {
        "--help" | "-h" | "help" => Ok(Command::Help),
        "run" => parse_run(args),
        "watch" => parse_watch(args),
        "panels" => parse_panels(args),
        other if other.starts_with('-') => parse_run(std::iter::once(cmd).chain(args)),
        other => Err(CliParseError::UnknownCommand(other.to_owned())),
    }
}

fn take_config<I>(args: &mut I) -> Result<PathBuf, CliParseError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .map(PathBuf::from)
        .ok_or(CliParseError::MissingConfigValue)
}

fn parse_run<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = RunArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(take_config(&mut args)?),
            "--connect-only" => parsed.connect_only = true,
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(CliParseError::UnknownArgument(other.to_owned())),
        }
    }

    Ok(Command::Run(parsed))
}

fn parse_watch<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = WatchArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(take_config(&mut args)?),
            "--json" => parsed.json = true,
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(CliParseError::UnknownArgument(other.to_owned())),
        }
    }

    Ok(Command::Watch(parsed))
}

fn parse_panels<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = PanelsArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(take_config(&mut args)?),
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(CliParseError::UnknownArgument(other.to_owned())),
        }
    }

    Ok(Command::Panels(parsed))
}

pub fn usage() -> &'static str {
    "onionboot\n\nUSAGE:\n  onionboot [run] [--config <PATH>] [--connect-only]\n  onionboot watch [--config <PATH>] [--json]\n  onionboot panels [--config <PATH>]\n\nCOMMANDS:\n  run               Open the bootstrap pager and drive Tor from the connect panel\n  watch             Start Tor immediately and follow bootstrap progress on stdout\n  panels            List the configured pager panels and settings\n\nOPTIONS:\n  --config <PATH>   Read settings from PATH instead of onionboot.toml\n  --connect-only    Show only the connect panel (run)\n  --json            Emit one JSON object per status change (watch)\n\nGENERAL:\n  -h, --help        Print help\n\nENVIRONMENT:\n  ONIONBOOT_CONFIG      Config path when --config is absent\n  ONIONBOOT_COLOR       auto | always | never\n  ONIONBOOT_LOG_FILE    Append tracing output to this file\n  ONIONBOOT_LOG_STDERR  Send tracing output to stderr when truthy\n"
}

pub fn print_usage() {
    eprintln!("{}", usage());
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
