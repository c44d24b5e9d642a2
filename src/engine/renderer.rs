//! Render loop: animate, composite, encode, then hand the frame to the sink.
//!
//! The loop blocks while the device is disconnected. Once connected it runs
//! free; pacing comes only from each effect's own update interval, and a
//! frame is written only when something actually changed.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chroma_transport::{ConnectionSignal, DeviceSink, TransportError};
use tracing::{debug, info, trace};

use super::animate::animate;
use super::composite::composite;
use super::store::SharedStore;
use crate::color::encode_grid;

/// How long a disconnected loop waits before re-checking the run flag.
const DISCONNECTED_POLL: Duration = Duration::from_millis(250);

/// What a single tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed; nothing was written.
    Idle,
    /// A composited frame was handed to the sink.
    Frame,
    /// The store is empty; a clear was handed to the sink.
    Clear,
}

pub struct Renderer {
    store: SharedStore,
    signal: Arc<ConnectionSignal>,
    sink: Arc<dyn DeviceSink>,
    /// Store revision that the last written frame was built from. `None`
    /// until the first write and again after a reconnect, when the device
    /// shows nothing of ours.
    shown_revision: Option<u64>,
}

impl Renderer {
    pub fn new(store: SharedStore, signal: Arc<ConnectionSignal>, sink: Arc<dyn DeviceSink>) -> Self {
        Self {
            store,
            signal,
            sink,
            shown_revision: None,
        }
    }

    /// Forget what the device shows, so the next tick redraws.
    pub fn invalidate(&mut self) {
        self.shown_revision = None;
    }

    /// One animate → composite → encode → send pass.
    ///
    /// The store lock is held for the whole pass, including the sink call,
    /// so producers never interleave with a half-built frame.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let mut store = self.store.lock();

        let report = animate(&mut store, now);
        if report.expired > 0 {
            debug!("{} effect(s) expired", report.expired);
        }

        let animated = store.take_dirty();
        let changed = match self.shown_revision {
            Some(shown) => animated || store.revision() != shown,
            // A blank device already matches an empty store.
            None => !store.is_empty(),
        };
        if !changed {
            return TickOutcome::Idle;
        }
        self.shown_revision = Some(store.revision());

        if store.is_empty() {
            log_dropped("clear", self.sink.send_clear());
            return TickOutcome::Clear;
        }

        let frame = encode_grid(&composite(store.iter()));
        log_dropped("frame", self.sink.send_frame(&frame));
        TickOutcome::Frame
    }

    /// Run until `running` is cleared.
    pub fn run(mut self, running: Arc<AtomicBool>) {
        let mut connected = false;
        while running.load(Ordering::SeqCst) {
            if !self.signal.wait_timeout(DISCONNECTED_POLL) {
                if connected {
                    info!("Device disconnected, render loop paused");
                    connected = false;
                }
                continue;
            }
            if !connected {
                info!("Device connected, render loop running");
                connected = true;
                self.invalidate();
            }

            self.tick(Instant::now());
            thread::yield_now();
        }
        debug!("Render loop stopped");
    }

    /// Run the loop on its own thread.
    pub fn spawn(self, running: Arc<AtomicBool>) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("chroma-render".into())
            .spawn(move || self.run(running))
    }
}

fn log_dropped(what: &str, result: Result<(), TransportError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_transient() => trace!("Dropped {what}: {e}"),
        Err(e) => debug!("Dropped {what}: {e}"),
    }
}
