use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bootstrap::{bootstrap_panels, PanelConfig, PanelKind, PulseSettings};

pub const CONFIG_FILE_NAME: &str = "onionboot.toml";
pub const CONFIG_ENV: &str = "ONIONBOOT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed reading config {path}: {error}")]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("failed parsing config {path}: {error}")]
    Parse {
        path: PathBuf,
        error: toml::de::Error,
    },
    #[error("pulse.interval_ms must be greater than zero")]
    ZeroInterval,
    #[error("pulse.step must be between 1 and 255, got {0}")]
    StepOutOfRange(u16),
    #[error("first panel must be `bootstrap`, got `{0}`")]
    PrimaryPanelKind(&'static str),
    #[error("service.run must not be empty")]
    EmptyServiceCommand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub run: String,
    pub cwd: Option<PathBuf>,
    pub normalize_notices: bool,
    pub shutdown_grace_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            run: "tor --Log \"notice stdout\"".to_owned(),
            cwd: None,
            normalize_notices: true,
            shutdown_grace_ms: 3000,
        }
    }
}

impl ServiceConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PulseConfig {
    pub interval_ms: u64,
    pub step: u16,
}

impl Default for PulseConfig {
    fn default() -> Self {
        let settings = PulseSettings::default();
        Self {
            interval_ms: settings.interval.as_millis() as u64,
            step: u16::from(settings.step),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub pulse: PulseConfig,
    #[serde(default = "bootstrap_panels")]
    pub panels: Vec<PanelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            pulse: PulseConfig::default(),
            panels: bootstrap_panels(),
        }
    }
}

impl Config {
    pub fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Config>(raw).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        Self::parse(path, &raw)
    }

    /// Explicit path, then `$ONIONBOOT_CONFIG`, then `./onionboot.toml`,
    /// then built-in defaults.
    pub fn resolve(explicit: Option<&Path>, cwd: &Path) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let candidate = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let local = cwd.join(CONFIG_FILE_NAME);
                local.is_file().then_some(local)
            });
        match candidate {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pulse.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if !(1..=255).contains(&self.pulse.step) {
            return Err(ConfigError::StepOutOfRange(self.pulse.step));
        }
        if let Some(first) = self.panels.first() {
            if first.kind != PanelKind::Bootstrap {
                return Err(ConfigError::PrimaryPanelKind(first.kind.label()));
            }
        }
        if self.service.run.trim().is_empty() {
            return Err(ConfigError::EmptyServiceCommand);
        }
        Ok(())
    }

    pub fn pulse_settings(&self) -> PulseSettings {
        PulseSettings {
            interval: Duration::from_millis(self.pulse.interval_ms),
            step: u8::try_from(self.pulse.step).unwrap_or(u8::MAX),
        }
    }

    /// Keeps only the primary panel, the layout shown before connecting.
    pub fn connect_only(mut self) -> Self {
        self.panels.truncate(1);
        self
    }

    pub fn service_cwd(&self, fallback: &Path) -> PathBuf {
        match &self.service.cwd {
            Some(cwd) if cwd.is_absolute() => cwd.clone(),
            Some(cwd) => fallback.join(cwd),
            None => fallback.to_path_buf(),
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
