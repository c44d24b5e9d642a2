//! Connected/disconnected signal shared by the session and the renderer.

use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// A settable boolean that threads can block on until it becomes true.
#[derive(Debug, Default)]
pub struct ConnectionSignal {
    connected: Mutex<bool>,
    cond: Condvar,
}

impl ConnectionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the device as connected and wake every waiter.
    pub fn set(&self) {
        let mut connected = self.connected.lock();
        *connected = true;
        self.cond.notify_all();
    }

    pub fn clear(&self) {
        *self.connected.lock() = false;
    }

    pub fn is_set(&self) -> bool {
        *self.connected.lock()
    }

    /// Block until the signal is set.
    pub fn wait(&self) {
        let mut connected = self.connected.lock();
        while !*connected {
            self.cond.wait(&mut connected);
        }
    }

    /// Block until the signal is set or `timeout` elapses. Returns the state.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut connected = self.connected.lock();
        if !*connected {
            self.cond.wait_for(&mut connected, timeout);
        }
        *connected
    }
}
