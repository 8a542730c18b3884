use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::controller::{BootstrapController, BootstrapService, PanelRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapRequest {
    Start,
    Stop,
}

/// What any panel may ask of the primary panel.
pub trait BootstrapControl {
    fn start_bootstrapping(&self);
    fn stop_bootstrapping(&self);
}

/// Shared capability handed to every panel at construction. A detached
/// handle (no primary panel configured) swallows requests.
#[derive(Debug, Clone, Default)]
pub struct BootstrapHandle {
    requests: Option<Sender<BootstrapRequest>>,
}

impl BootstrapHandle {
    pub fn detached() -> Self {
        Self { requests: None }
    }

    pub fn is_attached(&self) -> bool {
        self.requests.is_some()
    }

    fn send(&self, request: BootstrapRequest) {
        let Some(requests) = &self.requests else {
            debug!(?request, "no primary panel; request dropped");
            return;
        };
        if requests.send(request).is_err() {
            warn!(?request, "primary panel is gone; request dropped");
        }
    }
}

impl BootstrapControl for BootstrapHandle {
    fn start_bootstrapping(&self) {
        self.send(BootstrapRequest::Start);
    }

    fn stop_bootstrapping(&self) {
        self.send(BootstrapRequest::Stop);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Bootstrap,
    Log,
}

impl PanelKind {
    pub fn label(self) -> &'static str {
        match self {
            PanelKind::Bootstrap => "bootstrap",
            PanelKind::Log => "log",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    pub kind: PanelKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, String>,
}

impl PanelConfig {
    pub fn new(kind: PanelKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            args: BTreeMap::new(),
        }
    }
}

/// Panel set shown before the user connects.
pub fn connect_panels() -> Vec<PanelConfig> {
    vec![PanelConfig::new(PanelKind::Bootstrap, "Welcome")]
}

/// Panel set shown while bootstrapping: the primary panel plus the log.
pub fn bootstrap_panels() -> Vec<PanelConfig> {
    vec![
        PanelConfig::new(PanelKind::Bootstrap, "Welcome"),
        PanelConfig::new(PanelKind::Log, "Tor log"),
    ]
}

#[derive(Debug, Clone)]
pub struct Panel {
    pub kind: PanelKind,
    pub title: String,
    pub args: BTreeMap<String, String>,
    pub control: BootstrapHandle,
}

impl Panel {
    pub fn page_title(&self) -> String {
        self.title.to_uppercase()
    }
}

pub struct PanelPager {
    panels: Vec<Panel>,
    requests: Option<Receiver<BootstrapRequest>>,
}

impl PanelPager {
    pub fn from_config(configs: &[PanelConfig]) -> Self {
        let (handle, requests) = if configs.is_empty() {
            (BootstrapHandle::detached(), None)
        } else {
            let (tx, rx) = mpsc::channel();
            (BootstrapHandle { requests: Some(tx) }, Some(rx))
        };
        let panels = configs
            .iter()
            .map(|config| Panel {
                kind: config.kind,
                title: config.title.clone(),
                args: config.args.clone(),
                control: handle.clone(),
            })
            .collect::<Vec<Panel>>();
        Self { panels, requests }
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Panel> {
        self.panels.get(index)
    }

    /// The panel at index 0 owns bootstrap state.
    pub fn primary(&self) -> Option<&Panel> {
        self.panels.first()
    }

    pub fn has_kind(&self, kind: PanelKind) -> bool {
        self.panels.iter().any(|panel| panel.kind == kind)
    }

    /// Handle for callers outside any panel (key bindings, signal handlers).
    pub fn handle(&self) -> BootstrapHandle {
        self.primary()
            .map(|panel| panel.control.clone())
            .unwrap_or_default()
    }

    pub fn page_titles(&self) -> Vec<String> {
        self.panels.iter().map(Panel::page_title).collect()
    }

    /// Applies queued requests to the primary panel's controller. Returns the
    /// number of requests applied.
    pub fn drain_requests<R, S>(&self, controller: &mut BootstrapController<R, S>) -> usize
    where
        R: PanelRenderer,
        S: BootstrapService,
    {
        let Some(requests) = &self.requests else {
            return 0;
        };
        let mut applied = 0usize;
        while let Ok(request) = requests.try_recv() {
            match request {
                BootstrapRequest::Start => controller.start(),
                BootstrapRequest::Stop => controller.stop(),
            };
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
#[path = "../tests/control_tests.rs"]
mod tests;
