//! # Pulse Monitor Module
//!
//! Wires the measurement session to its two event sources: camera frames
//! delivered by a [`FrameSource`] and a periodic progress tick. Both are
//! serialized through one channel onto a dedicated worker thread that owns
//! the session, so no session state is ever mutated concurrently.
//!
//! ## Architecture
//! - **PulseMonitor**: public handle; issues commands and exposes a
//!   read-only snapshot of the live state
//! - **Worker Thread**: owns the session, the frame source, and the
//!   interpreter; drains events and the 100 ms ticker
//! - **FrameSink**: given to the frame source; reduces each frame to its
//!   scalar on the delivery context (a pure read), then sends the scalar
//!   across the channel
//!
//! The worker carries a current-thread Tokio runtime so the one async
//! collaborator, the interpretation service, can be resolved in place once
//! a measurement finishes.

use crate::config::MonitorConfig;
use crate::error::{AcquisitionError, InterpretationError};
use crate::frame::Frame;
use crate::interpret::{Interpreter, FALLBACK_INTERPRETATION};
use crate::session::{AnalysisResult, MeasurementSession, Phase};
use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Interval of the progress tick driving the session clock.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Monotonic session clock measured in seconds since monitor creation.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Event crossing onto the serialized worker thread.
#[derive(Debug)]
enum MonitorEvent {
    Start,
    Sample { timestamp: f64, value: f64 },
    AcquisitionFailed(AcquisitionError),
    Reset,
    Shutdown,
}

/// Handed to the frame source at start; accepts raw frames from the
/// camera's own delivery context.
///
/// Reduction happens here, before the channel, so only a scalar crosses to
/// the worker. An unreadable frame is dropped with a debug log and simply
/// yields one less sample.
#[derive(Clone)]
pub struct FrameSink {
    tx: Sender<MonitorEvent>,
    clock: Clock,
}

impl FrameSink {
    pub fn push_frame(&self, frame: &Frame<'_>) {
        match frame.mean_red() {
            Some(value) => {
                let _ = self.tx.send(MonitorEvent::Sample {
                    timestamp: self.clock.now(),
                    value,
                });
            }
            None => log::debug!("dropping unreadable frame"),
        }
    }

    /// Report a permission/hardware failure detected after start.
    pub fn report_failure(&self, error: AcquisitionError) {
        let _ = self.tx.send(MonitorEvent::AcquisitionFailed(error));
    }
}

/// Camera acquisition collaborator.
///
/// `start` begins frame delivery into the sink and reports permission or
/// hardware problems; `stop` synchronously halts delivery. Implementations
/// live outside this crate.
pub trait FrameSource: Send {
    fn start(&mut self, sink: FrameSink) -> Result<(), AcquisitionError>;
    fn stop(&mut self);
}

/// Read-only view of the live session state, updated only from the worker.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub phase: Phase,
    pub status: &'static str,
    pub progress: f64,
    pub current_bpm: f64,
}

/// Public handle for one measurement pipeline.
///
/// Dropping the monitor shuts the worker down and stops the frame source.
pub struct PulseMonitor {
    event_tx: Sender<MonitorEvent>,
    worker: Option<thread::JoinHandle<()>>,
    shared: Arc<Mutex<Snapshot>>,
}

impl PulseMonitor {
    pub fn new<S, I>(config: MonitorConfig, source: S, interpreter: I) -> Self
    where
        S: FrameSource + 'static,
        I: Interpreter + Send + 'static,
    {
        let (event_tx, event_rx) = unbounded();
        let clock = Clock::new();
        let session = MeasurementSession::new(&config);
        let shared = Arc::new(Mutex::new(snapshot_of(&session)));

        let sink = FrameSink {
            tx: event_tx.clone(),
            clock,
        };
        let shared_worker = shared.clone();
        let worker = thread::spawn(move || {
            worker_loop(event_rx, sink, clock, session, source, interpreter, shared_worker);
        });

        Self {
            event_tx,
            worker: Some(worker),
            shared,
        }
    }

    /// Begin a measurement from idle.
    pub fn start(&self) {
        let _ = self.event_tx.send(MonitorEvent::Start);
    }

    /// Cancel whatever is in flight and return to idle.
    pub fn reset(&self) {
        let _ = self.event_tx.send(MonitorEvent::Reset);
    }

    /// Current live state for display.
    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().unwrap().clone()
    }

    /// The final result, once the session has completed.
    pub fn result(&self) -> Option<AnalysisResult> {
        match self.snapshot().phase {
            Phase::Completed(result) => Some(result),
            _ => None,
        }
    }
}

impl Drop for PulseMonitor {
    fn drop(&mut self) {
        let _ = self.event_tx.send(MonitorEvent::Shutdown);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn snapshot_of(session: &MeasurementSession) -> Snapshot {
    Snapshot {
        phase: session.phase().clone(),
        status: session.status(),
        progress: session.progress(),
        current_bpm: session.current_bpm(),
    }
}

fn worker_loop<S, I>(
    events: Receiver<MonitorEvent>,
    sink: FrameSink,
    clock: Clock,
    mut session: MeasurementSession,
    mut source: S,
    interpreter: I,
    shared: Arc<Mutex<Snapshot>>,
) where
    S: FrameSource,
    I: Interpreter,
{
    // The interpretation seam is async; one current-thread runtime per
    // worker resolves it in place, as with a dedicated connection thread
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => Some(rt),
        Err(e) => {
            log::error!("failed to create runtime, interpretation disabled: {}", e);
            None
        }
    };

    let ticker = tick(TICK_INTERVAL);

    loop {
        select! {
            recv(events) -> event => match event {
                Ok(MonitorEvent::Start) => {
                    session.start(clock.now());
                    if let Err(e) = source.start(sink.clone()) {
                        session.fail(e.to_string());
                    }
                }
                Ok(MonitorEvent::Sample { timestamp, value }) => {
                    session.handle_sample(timestamp, value);
                }
                Ok(MonitorEvent::AcquisitionFailed(e)) => {
                    source.stop();
                    session.fail(e.to_string());
                }
                Ok(MonitorEvent::Reset) => {
                    source.stop();
                    session.reset();
                }
                Ok(MonitorEvent::Shutdown) | Err(_) => {
                    source.stop();
                    log::info!("monitor worker stopped");
                    break;
                }
            },
            recv(ticker) -> _ => {
                if session.tick(clock.now()) {
                    source.stop();
                    finish_measurement(&mut session, &interpreter, runtime.as_ref());
                }
            }
        }

        *shared.lock().unwrap() = snapshot_of(&session);
    }
}

/// Run the final analysis and merge in the interpretation, falling back to
/// the fixed sentinel text when the service fails.
fn finish_measurement<I: Interpreter>(
    session: &mut MeasurementSession,
    interpreter: &I,
    runtime: Option<&tokio::runtime::Runtime>,
) {
    let Some(metrics) = session.begin_analysis() else {
        // Degraded completion was already applied
        return;
    };

    let interpretation = match runtime {
        Some(rt) => rt.block_on(interpreter.interpret(metrics.average_bpm, metrics.hrv)),
        None => Err(InterpretationError::Unavailable),
    }
    .unwrap_or_else(|err| {
        log::warn!("interpretation unavailable: {}", err);
        FALLBACK_INTERPRETATION.to_string()
    });

    session.complete(interpretation);
}
