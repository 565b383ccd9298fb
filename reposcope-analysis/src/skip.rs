//! Operator skip support
//!
//! A listener thread watches for the skip key and raises a shared
//! [`CancellationSignal`]; the orchestrator polls the signal between units of
//! work and clears it once the current repository is finished.

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use reposcope_core::SkipConfig;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// How long the listener blocks on one poll before re-checking for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Returned by a stage that stopped because the operator asked to skip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("analysis cancelled by operator")]
pub struct Cancelled;

/// Shared skip flag. Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    flag: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` only for the call that raised it.
    pub fn raise(&self) -> bool {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_raised(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Re-arm the flag for the next repository
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// `Err(Cancelled)` once the flag is raised
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.is_raised() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Outcome of one bounded wait for the trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerPoll {
    Triggered,
    Idle,
    /// The source can never trigger again; the listener exits
    Closed,
}

/// Something the listener can wait on for a skip request
pub trait TriggerSource: Send + 'static {
    /// Wait at most `timeout` for the next trigger
    fn poll_trigger(&mut self, timeout: Duration) -> TriggerPoll;
}

/// Skip key read from the controlling terminal.
///
/// The terminal stays in line mode, so the key is delivered once the
/// operator presses Enter.
pub struct KeyboardTrigger {
    key: char,
}

impl KeyboardTrigger {
    /// `None` when stdin is not an interactive terminal
    pub fn detect(key: char) -> Option<Self> {
        if std::io::stdin().is_terminal() {
            Some(Self { key })
        } else {
            None
        }
    }
}

impl TriggerSource for KeyboardTrigger {
    fn poll_trigger(&mut self, timeout: Duration) -> TriggerPoll {
        match event::poll(timeout) {
            Ok(false) => TriggerPoll::Idle,
            Ok(true) => match event::read() {
                Ok(Event::Key(key))
                    if key.kind == KeyEventKind::Press
                        && matches!(key.code, KeyCode::Char(c) if c.eq_ignore_ascii_case(&self.key)) =>
                {
                    TriggerPoll::Triggered
                }
                Ok(_) => TriggerPoll::Idle,
                Err(e) => {
                    warn!(error = %e, "Keyboard listener stopped");
                    TriggerPoll::Closed
                }
            },
            Err(e) => {
                warn!(error = %e, "Keyboard listener stopped");
                TriggerPoll::Closed
            }
        }
    }
}

/// Called by the listener after it raised the signal
pub type Acknowledge = Arc<dyn Fn() + Send + Sync>;

fn log_acknowledgement() -> Acknowledge {
    Arc::new(|| info!("Skip requested, finishing the current step"))
}

/// Owns the listener thread for one run
pub struct SkipController {
    signal: CancellationSignal,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SkipController {
    /// Start listening on `source`
    pub fn start(
        signal: CancellationSignal,
        mut source: Box<dyn TriggerSource>,
        acknowledge: Option<Acknowledge>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let acknowledge = acknowledge.unwrap_or_else(log_acknowledgement);

        let thread_signal = signal.clone();
        let thread_stop = Arc::clone(&stop);
        let spawned = std::thread::Builder::new()
            .name("reposcope-skip".to_string())
            .spawn(move || {
                debug!("Skip listener started");
                while !thread_stop.load(Ordering::Acquire) {
                    match source.poll_trigger(POLL_INTERVAL) {
                        TriggerPoll::Triggered => {
                            if thread_signal.raise() {
                                acknowledge();
                            }
                        }
                        TriggerPoll::Idle => {}
                        TriggerPoll::Closed => break,
                    }
                }
                debug!("Skip listener exited");
            });

        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "Could not start skip listener, skipping is disabled");
                None
            }
        };

        Self {
            signal,
            stop,
            handle,
        }
    }

    /// Controller without a listener; the signal is never raised by it
    pub fn disabled(signal: CancellationSignal) -> Self {
        Self {
            signal,
            stop: Arc::new(AtomicBool::new(true)),
            handle: None,
        }
    }

    /// Keyboard listener when enabled and a terminal is attached, no-op otherwise
    pub fn from_config(
        config: &SkipConfig,
        signal: CancellationSignal,
        acknowledge: Option<Acknowledge>,
    ) -> Self {
        if !config.enabled {
            debug!("Skip listener disabled by configuration");
            return Self::disabled(signal);
        }

        match KeyboardTrigger::detect(config.key) {
            Some(trigger) => Self::start(signal, Box::new(trigger), acknowledge),
            None => {
                debug!("No interactive terminal, skip listener disabled");
                Self::disabled(signal)
            }
        }
    }

    pub fn signal(&self) -> &CancellationSignal {
        &self.signal
    }

    pub fn is_listening(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the listener and wait for its thread
    pub fn shutdown(mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Skip listener panicked");
            }
        }
    }
}

impl Drop for SkipController {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
