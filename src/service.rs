use std::borrow::Cow;
use std::io::{BufRead, BufReader, ErrorKind};
#[cfg(unix)]
use std::os::unix::process::CommandExt;
#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{Child, Command as ProcessCommand, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

#[cfg(unix)]
use nix::sys::signal::{kill, Signal};
#[cfg(unix)]
use nix::unistd::{setpgid, Pid};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::bootstrap::{BootstrapService, NOTICE_PREFIX};
use crate::config::Config;

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(40);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub run: String,
    pub cwd: PathBuf,
    pub normalize_notices: bool,
    pub shutdown_grace: Duration,
}

impl ServiceSpec {
    pub fn from_config(config: &Config, cwd: PathBuf) -> Self {
        Self {
            name: "tor".to_owned(),
            run: config.service.run.clone(),
            cwd: config.service_cwd(&cwd),
            normalize_notices: config.service.normalize_notices,
            shutdown_grace: config.service.shutdown_grace(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceEvent {
    Line { stream: ServiceStream, text: String },
    Exit { diagnostic: String },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to spawn service `{service}` with command `{command}`: {error}")]
    Spawn {
        service: String,
        command: String,
        error: std::io::Error,
    },
    #[error("service `{service}` missing stdout/stderr pipe")]
    MissingStdio { service: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownProgress {
    SendingTerm,
    Waiting,
    ForceKilling,
    Complete { forced: bool },
}

type SharedChild = Arc<Mutex<Child>>;

fn lock_child(child: &SharedChild) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Supervises the external bootstrap process. Output lines and the final exit
/// arrive as [`ServiceEvent`]s on one channel.
pub struct ServiceSupervisor {
    spec: ServiceSpec,
    child: Option<SharedChild>,
    generation: u64,
    events_tx: Sender<(u64, ServiceEvent)>,
    events_rx: Receiver<(u64, ServiceEvent)>,
}

impl ServiceSupervisor {
    pub fn new(spec: ServiceSpec) -> Self {
        let (events_tx, events_rx) = mpsc::channel::<(u64, ServiceEvent)>();
        Self {
            spec,
            child: None,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn spec(&self) -> &ServiceSpec {
        &self.spec
    }

    pub fn is_running(&self) -> bool {
        self.child
            .as_ref()
            .is_some_and(|child| matches!(lock_child(child).try_wait(), Ok(None)))
    }

    pub fn spawn(&mut self) -> Result<(), ServiceError> {
        let mut child = shell_command(&self.spec)
            .spawn()
            .map_err(|error| ServiceError::Spawn {
                service: self.spec.name.clone(),
                command: self.spec.run.clone(),
                error,
            })?;
        let missing = || ServiceError::MissingStdio {
            service: self.spec.name.clone(),
        };
        let stdout = child.stdout.take().ok_or_else(missing)?;
        let stderr = child.stderr.take().ok_or_else(missing)?;
        self.generation += 1;
        let generation = self.generation;
        info!(service = %self.spec.name, pid = child.id(), generation, "service spawned");

        let child = Arc::new(Mutex::new(child));
        self.child = Some(child.clone());

        for (stream, reader) in [
            (ServiceStream::Stdout, Box::new(stdout) as Box<dyn std::io::Read + Send>),
            (ServiceStream::Stderr, Box::new(stderr) as Box<dyn std::io::Read + Send>),
        ] {
            let tx = self.events_tx.clone();
            let normalize = self.spec.normalize_notices;
            thread::spawn(move || {
                let reader = BufReader::new(reader);
                for line in reader.lines().map_while(Result::ok) {
                    let text = if normalize {
                        normalize_tor_line(&line).into_owned()
                    } else {
                        line
                    };
                    if tx.send((generation, ServiceEvent::Line { stream, text })).is_err() {
                        break;
                    }
                }
            });
        }

        let tx = self.events_tx.clone();
        thread::spawn(move || loop {
            let status = lock_child(&child).try_wait();
            match status {
                Ok(Some(status)) => {
                    let _ = tx.send((
                        generation,
                        ServiceEvent::Exit {
                            diagnostic: format_exit_diagnostic(status),
                        },
                    ));
                    break;
                }
                Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
                Err(err) => {
                    let _ = tx.send((
                        generation,
                        ServiceEvent::Exit {
                            diagnostic: format!("wait-error={err}"),
                        },
                    ));
                    break;
                }
            }
        });
        Ok(())
    }

    /// Events of earlier spawns are dropped, so a process being replaced can
    /// neither report into nor fail the new one.
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<ServiceEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let wait = deadline.saturating_duration_since(Instant::now());
            let (generation, event) = self.events_rx.recv_timeout(wait).ok()?;
            if let Some(event) = self.current(generation, event) {
                return Some(event);
            }
        }
    }

    pub fn try_next_event(&self) -> Option<ServiceEvent> {
        loop {
            let (generation, event) = self.events_rx.try_recv().ok()?;
            if let Some(event) = self.current(generation, event) {
                return Some(event);
            }
        }
    }

    fn current(&self, generation: u64, event: ServiceEvent) -> Option<ServiceEvent> {
        if generation == self.generation {
            return Some(event);
        }
        match event {
            ServiceEvent::Exit { diagnostic } => {
                debug!(service = %self.spec.name, generation, %diagnostic, "stale exit dropped");
                None
            }
            ServiceEvent::Line { text, .. } => {
                debug!(service = %self.spec.name, generation, %text, "stale line dropped");
                None
            }
        }
    }

    /// Sends SIGTERM and leaves escalation to a reaper thread.
    pub fn terminate(&mut self) {
        let Some(child) = self.child.take() else {
            debug!(service = %self.spec.name, "stop requested with no running service");
            return;
        };
        {
            let mut guard = lock_child(&child);
            if !matches!(guard.try_wait(), Ok(None)) {
                return;
            }
            signal_child(&mut guard, TermSignal::Term);
        }
        let grace = self.spec.shutdown_grace;
        let name = self.spec.name.clone();
        thread::spawn(move || {
            if !wait_for_exit(&child, grace) {
                warn!(service = %name, "service ignored SIGTERM; killing");
                signal_child(&mut lock_child(&child), TermSignal::Kill);
            }
        });
    }

    /// Blocking shutdown used when the session ends.
    pub fn terminate_graceful_with_progress<F>(&mut self, timeout: Duration, mut on_progress: F)
    where
        F: FnMut(ShutdownProgress),
    {
        let Some(child) = self.child.clone() else {
            on_progress(ShutdownProgress::Complete { forced: false });
            return;
        };

        on_progress(ShutdownProgress::SendingTerm);
        {
            let mut guard = lock_child(&child);
            if matches!(guard.try_wait(), Ok(None)) {
                signal_child(&mut guard, TermSignal::Term);
            }
        }

        on_progress(ShutdownProgress::Waiting);
        if wait_for_exit(&child, timeout) {
            on_progress(ShutdownProgress::Complete { forced: false });
            return;
        }

        on_progress(ShutdownProgress::ForceKilling);
        signal_child(&mut lock_child(&child), TermSignal::Kill);
        on_progress(ShutdownProgress::Complete { forced: true });
    }

    /// `running`, `exit=<code>`, `signal=<n>`, or `None` if never spawned.
    pub fn exit_diagnostic(&self) -> Option<String> {
        let child = self.child.as_ref()?;
        let diagnostic = match lock_child(child).try_wait() {
            Ok(Some(status)) => format_exit_diagnostic(status),
            Ok(None) => "running".to_owned(),
            Err(err) => format!("wait-error={err}"),
        };
        Some(diagnostic)
    }
}

impl BootstrapService for ServiceSupervisor {
    fn request_start(&mut self) {
        if self.is_running() {
            warn!(service = %self.spec.name, "service already running; start ignored");
            return;
        }
        if let Err(err) = self.spawn() {
            error!(error = %err, "service start failed");
            let _ = self.events_tx.send((
                self.generation,
                ServiceEvent::Exit {
                    diagnostic: format!("spawn-error={err}"),
                },
            ));
        }
    }

    fn request_stop(&mut self) {
        self.terminate();
    }
}

impl Drop for ServiceSupervisor {
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            let mut guard = lock_child(&child);
            if matches!(guard.try_wait(), Ok(None)) {
                signal_child(&mut guard, TermSignal::Kill);
            }
        }
    }
}

/// Rewrites tor's native `... [notice] msg` log lines to the `NOTICE: msg`
/// form the status interpreter expects, and `[err]` lines to `ERROR: msg`.
pub fn normalize_tor_line(line: &str) -> Cow<'_, str> {
    if line.starts_with(NOTICE_PREFIX) {
        return Cow::Borrowed(line);
    }
    if let Some((_, message)) = line.split_once("[notice] ") {
        return Cow::Owned(format!("{NOTICE_PREFIX}{message}"));
    }
    if let Some((_, message)) = line.split_once("[err] ") {
        return Cow::Owned(format!("ERROR: {message}"));
    }
    Cow::Borrowed(line)
}

pub fn is_expected_shutdown_diagnostic(diagnostic: &str) -> bool {
    matches!(diagnostic, "signal=15" | "signal=9")
}

fn wait_for_exit(child: &SharedChild, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if !matches!(lock_child(child).try_wait(), Ok(None)) {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

fn format_exit_diagnostic(status: std::process::ExitStatus) -> String {
    #[cfg(unix)]
    {
        if let Some(code) = status.code() {
            return format!("exit={code}");
        }
        if let Some(signal) = status.signal() {
            return format!("signal={signal}");
        }
        "exit=unknown".to_owned()
    }
    #[cfg(not(unix))]
    {
        format!("exit={}", status.code().unwrap_or(-1))
    }
}

fn shell_command(spec: &ServiceSpec) -> ProcessCommand {
    let mut process = ProcessCommand::new("sh");
    process
        .arg("-lc")
        .arg(&spec.run)
        .current_dir(&spec.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    unsafe {
        process.pre_exec(|| {
            setpgid(Pid::from_raw(0), Pid::from_raw(0))
                .map_err(|error| std::io::Error::new(ErrorKind::Other, error.to_string()))
        });
    }
    process
}

#[derive(Debug, Clone, Copy)]
enum TermSignal {
    Term,
    Kill,
}

fn signal_child(child: &mut Child, signal: TermSignal) {
    #[cfg(unix)]
    {
        let signal = match signal {
            TermSignal::Term => Signal::SIGTERM,
            TermSignal::Kill => Signal::SIGKILL,
        };
        let pid = child.id() as i32;
        if pid > 0 {
            if let Err(err) = kill(Pid::from_raw(-pid), signal) {
                debug!(pid, error = %err, "signalling service process group failed");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal;
        let _ = child.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tor_notice_lines_gain_the_notice_prefix() {
        let line = "Oct 16 12:00:01.000 [notice] Bootstrapped 5% (conn): Connecting to a relay";
        assert_eq!(
            normalize_tor_line(line),
            "NOTICE: Bootstrapped 5% (conn): Connecting to a relay"
        );
    }

    #[test]
    fn tor_err_lines_become_error_lines() {
        let line = "Oct 16 12:00:01.000 [err] Reading config failed";
        assert_eq!(normalize_tor_line(line), "ERROR: Reading config failed");
    }

    #[test]
    fn other_lines_pass_through_untouched() {
        assert!(matches!(
            normalize_tor_line("[warn] clock skew"),
            Cow::Borrowed("[warn] clock skew")
        ));
        assert!(matches!(
            normalize_tor_line("NOTICE: already [notice] tagged"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn expected_shutdown_diagnostics_are_ignored() {
        assert!(is_expected_shutdown_diagnostic("signal=15"));
        assert!(is_expected_shutdown_diagnostic("signal=9"));
        assert!(!is_expected_shutdown_diagnostic("exit=1"));
    }
}
