use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

pub const DEFAULT_PULSE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_PULSE_STEP: u8 = 5;

/// Indicator intensity. The `u8` keeps it inside [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PulseValue(u8);

impl PulseValue {
    pub const MIN: PulseValue = PulseValue(0);
    pub const MAX: PulseValue = PulseValue(u8::MAX);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn is_bound(self) -> bool {
        self == Self::MIN || self == Self::MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseDirection {
    Increasing,
    Decreasing,
}

impl PulseDirection {
    pub fn reversed(self) -> Self {
        match self {
            PulseDirection::Increasing => PulseDirection::Decreasing,
            PulseDirection::Decreasing => PulseDirection::Increasing,
        }
    }
}

/// One pulse cycle. Reaching or crossing a bound clamps to it and reverses in
/// the same cycle, so a bound value is never delivered twice in a row.
pub fn advance(value: PulseValue, direction: PulseDirection, step: u8) -> (PulseValue, PulseDirection) {
    let current = i16::from(value.get());
    let step = i16::from(step);
    let next = match direction {
        PulseDirection::Increasing => current + step,
        PulseDirection::Decreasing => current - step,
    };
    if next >= i16::from(u8::MAX) {
        (PulseValue::MAX, PulseDirection::Decreasing)
    } else if next <= 0 {
        (PulseValue::MIN, PulseDirection::Increasing)
    } else {
        (PulseValue::new(next as u8), direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseSettings {
    pub interval: Duration,
    pub step: u8,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_PULSE_INTERVAL,
            step: DEFAULT_PULSE_STEP,
        }
    }
}

/// A value produced by the worker of one pulse session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseFrame {
    pub session: u64,
    pub value: PulseValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PulseCommand {
    Stop,
}

struct PulseWorker {
    session: u64,
    commands: Sender<PulseCommand>,
    handle: JoinHandle<()>,
    draining: bool,
}

impl PulseWorker {
    fn request_stop(&mut self) {
        if self.draining {
            return;
        }
        // A closed channel means the worker already left its loop.
        let _ = self.commands.send(PulseCommand::Stop);
        self.draining = true;
    }

    fn await_exit(self) {
        let session = self.session;
        if self.handle.join().is_err() {
            warn!(session, "pulse worker panicked before exiting");
        }
    }
}

/// Counts live workers and remembers the highest concurrent count seen.
#[derive(Debug, Default)]
struct WorkerCensus {
    active: AtomicUsize,
    peak: AtomicUsize,
}

struct CensusGuard(Arc<WorkerCensus>);

impl CensusGuard {
    fn enter(census: Arc<WorkerCensus>) -> Self {
        let now = census.active.fetch_add(1, Ordering::SeqCst) + 1;
        census.peak.fetch_max(now, Ordering::SeqCst);
        Self(census)
    }
}

impl Drop for CensusGuard {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the background pulse worker. At most one worker delivers frames at a
/// time; each worker exclusively owns its value and direction and is driven
/// through a command channel.
pub struct PulseGenerator {
    settings: PulseSettings,
    frames: Sender<PulseFrame>,
    worker: Option<PulseWorker>,
    next_session: u64,
    census: Arc<WorkerCensus>,
}

impl PulseGenerator {
    pub fn new(settings: PulseSettings, frames: Sender<PulseFrame>) -> Self {
        Self {
            settings,
            frames,
            worker: None,
            next_session: 1,
            census: Arc::new(WorkerCensus::default()),
        }
    }

    pub fn settings(&self) -> PulseSettings {
        self.settings
    }

    /// Spawns a worker seeded with `value`/`direction`. Returns false when a
    /// live worker already exists.
    pub fn start(&mut self, value: PulseValue, direction: PulseDirection) -> bool {
        if let Some(worker) = &self.worker {
            if !worker.draining && !worker.handle.is_finished() {
                warn!(
                    session = worker.session,
                    "pulse worker already running; ignoring start"
                );
                return false;
            }
        }

        if let Some(worker) = self.worker.take() {
            if worker.draining {
                debug!(session = worker.session, "awaiting draining pulse worker");
            } else {
                info!(session = worker.session, "pulse worker exited on its own");
            }
            worker.await_exit();
        }

        let session = self.next_session;
        self.next_session += 1;
        let (commands_tx, commands_rx) = mpsc::channel::<PulseCommand>();
        let frames = self.frames.clone();
        let census = self.census.clone();
        let settings = self.settings;
        let handle = thread::spawn(move || {
            let _guard = CensusGuard::enter(census);
            let mut value = value;
            let mut direction = direction;
            loop {
                (value, direction) = advance(value, direction, settings.step);
                if frames.send(PulseFrame { session, value }).is_err() {
                    break;
                }
                match commands_rx.recv_timeout(settings.interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(PulseCommand::Stop) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        debug!(session, "pulse worker started");
        self.worker = Some(PulseWorker {
            session,
            commands: commands_tx,
            handle,
            draining: false,
        });
        true
    }

    /// Asks the current worker to exit and returns without waiting.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.as_mut() {
            if !worker.draining {
                debug!(session = worker.session, "pulse worker stop requested");
            }
            worker.request_stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.draining && !worker.handle.is_finished())
    }

    /// Session whose frames should reach the renderer, if any.
    pub fn active_session(&self) -> Option<u64> {
        self.worker
            .as_ref()
            .filter(|worker| !worker.draining)
            .map(|worker| worker.session)
    }

    pub fn active_workers(&self) -> usize {
        self.census.active.load(Ordering::SeqCst)
    }

    pub fn peak_workers(&self) -> usize {
        self.census.peak.load(Ordering::SeqCst)
    }

    /// Stops the current worker and blocks until it has exited.
    pub fn shutdown(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.request_stop();
            worker.await_exit();
        }
    }
}

impl Drop for PulseGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "../tests/pulse_tests.rs"]
mod tests;
