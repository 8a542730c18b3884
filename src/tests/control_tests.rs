use super::{
    bootstrap_panels, connect_panels, BootstrapControl, BootstrapHandle, PanelConfig, PanelKind,
    PanelPager,
};
use crate::bootstrap::controller::{
    BootstrapController, BootstrapService, PanelRenderer, PanelState, RenderError,
};
use crate::bootstrap::pulse::{PulseSettings, PulseValue};
use crate::bootstrap::status::DisplayText;

#[derive(Debug, Default)]
struct CountingRenderer {
    calls: usize,
}

impl PanelRenderer for CountingRenderer {
    fn set_pulse_value(&mut self, _value: PulseValue) -> Result<(), RenderError> {
        self.calls += 1;
        Ok(())
    }

    fn set_display_text(&mut self, _text: &DisplayText) -> Result<(), RenderError> {
        self.calls += 1;
        Ok(())
    }

    fn set_error_visible(&mut self, _visible: bool) -> Result<(), RenderError> {
        self.calls += 1;
        Ok(())
    }

    fn set_bootstrapping(&mut self, _bootstrapping: bool) -> Result<(), RenderError> {
        self.calls += 1;
        Ok(())
    }

    fn close_panel(&mut self) -> Result<(), RenderError> {
        self.calls += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct NullService {
    starts: usize,
    stops: usize,
}

impl BootstrapService for NullService {
    fn request_start(&mut self) {
        self.starts += 1;
    }

    fn request_stop(&mut self) {
        self.stops += 1;
    }
}

fn controller() -> BootstrapController<CountingRenderer, NullService> {
    BootstrapController::new(
        CountingRenderer::default(),
        NullService::default(),
        PulseSettings::default(),
    )
}

#[test]
fn secondary_panel_stops_primary_through_shared_handle() {
    let pager = PanelPager::from_config(&bootstrap_panels());
    let mut controller = controller();
    pager.primary().expect("primary").control.start_bootstrapping();
    assert_eq!(pager.drain_requests(&mut controller), 1);
    assert_eq!(controller.state(), PanelState::Connecting);

    let log_panel = pager.get(1).expect("log panel");
    assert_eq!(log_panel.kind, PanelKind::Log);
    log_panel.control.stop_bootstrapping();
    assert_eq!(pager.drain_requests(&mut controller), 1);
    assert_eq!(controller.state(), PanelState::Idle);
    assert_eq!(controller.service().stops, 1);
}

#[test]
fn empty_configuration_makes_requests_no_ops() {
    let pager = PanelPager::from_config(&[]);
    assert!(pager.is_empty());
    assert!(pager.primary().is_none());

    let handle = pager.handle();
    assert!(!handle.is_attached());
    handle.stop_bootstrapping();
    handle.start_bootstrapping();

    let mut controller = controller();
    assert_eq!(pager.drain_requests(&mut controller), 0);
    assert_eq!(controller.renderer().calls, 0);
    assert_eq!(controller.service().starts, 0);
    assert_eq!(controller.state(), PanelState::Idle);
}

#[test]
fn detached_handle_swallows_requests() {
    let handle = BootstrapHandle::detached();
    handle.start_bootstrapping();
    handle.stop_bootstrapping();
    assert!(!handle.is_attached());
}

#[test]
fn requests_apply_in_order() {
    let pager = PanelPager::from_config(&bootstrap_panels());
    let handle = pager.handle();
    handle.start_bootstrapping();
    handle.stop_bootstrapping();
    handle.start_bootstrapping();

    let mut controller = controller();
    assert_eq!(pager.drain_requests(&mut controller), 3);
    assert_eq!(controller.state(), PanelState::Connecting);
    assert_eq!(controller.service().starts, 2);
    assert_eq!(controller.service().stops, 1);
}

#[test]
fn handle_outliving_pager_is_harmless() {
    let handle = {
        let pager = PanelPager::from_config(&connect_panels());
        pager.handle()
    };
    assert!(handle.is_attached());
    handle.stop_bootstrapping();
}

#[test]
fn page_titles_are_upper_case() {
    let mut log = PanelConfig::new(PanelKind::Log, "Tor log");
    log.args.insert("follow".to_owned(), "true".to_owned());
    let pager = PanelPager::from_config(&[PanelConfig::new(PanelKind::Bootstrap, "Welcome"), log]);
    assert_eq!(pager.page_titles(), vec!["WELCOME".to_owned(), "TOR LOG".to_owned()]);
    assert_eq!(pager.get(1).expect("log").args.get("follow").map(String::as_str), Some("true"));
    assert!(pager.has_kind(PanelKind::Log));
}

#[test]
fn stock_panel_sets_lead_with_the_bootstrap_panel() {
    assert_eq!(connect_panels().len(), 1);
    assert_eq!(bootstrap_panels().len(), 2);
    assert!(connect_panels()
        .iter()
        .chain(bootstrap_panels().iter())
        .take(1)
        .all(|panel| panel.kind == PanelKind::Bootstrap));
    assert_eq!(bootstrap_panels()[0].kind, PanelKind::Bootstrap);
}
