use std::time::Duration;

pub(super) const MAX_LOG_LINES: usize = 2000;
pub(super) const MAX_EVENTS_PER_TICK: usize = 200;
pub(super) const PAGE_SCROLL_LINES: usize = 10;

pub(super) const EVENT_DRAIN_WAIT: Duration = Duration::from_millis(1);
pub(super) const EXIT_SETTLE_WAIT: Duration = Duration::from_millis(50);
pub(super) const INPUT_POLL_WAIT: Duration = Duration::from_millis(40);

/// Rows taken by the tab header, footer and pane borders.
pub(super) const CHROME_ROWS: u16 = 6;
