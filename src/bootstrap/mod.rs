pub mod control;
pub mod controller;
pub mod pulse;
pub mod status;

pub use control::{
    bootstrap_panels, connect_panels, BootstrapControl, BootstrapHandle, BootstrapRequest, Panel,
    PanelConfig, PanelKind, PanelPager,
};
pub use controller::{
    BootstrapController, BootstrapService, PanelRenderer, PanelState, RenderError,
};
pub use pulse::{PulseDirection, PulseFrame, PulseGenerator, PulseSettings, PulseValue};
pub use status::{interpret, DisplayText, StatusOutcome, BOOTSTRAP_DONE_MARKER, NOTICE_PREFIX};
