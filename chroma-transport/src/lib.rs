//! Device sink abstraction and Razer Chroma SDK REST session
//!
//! The renderer only ever sees a [`DeviceSink`]: something that accepts a
//! packed frame or a clear command. The Chroma REST session is the real
//! backend; tests and the terminal preview provide their own sinks.

pub mod error;
pub mod protocol;
pub mod session;
pub mod signal;

pub use error::TransportError;
pub use protocol::{AppInfo, Author, KeyboardEffect, PackedFrame, COLS, ROWS};
pub use session::{ChromaSession, SessionConfig};
pub use signal::ConnectionSignal;

use std::sync::Arc;

/// Output surface for composited frames.
///
/// Both calls are best-effort. Implementations report failures, but callers
/// on the render path log and drop them instead of retrying.
pub trait DeviceSink: Send + Sync {
    /// Upload one packed frame.
    fn send_frame(&self, frame: &PackedFrame) -> Result<(), TransportError>;

    /// Turn every key off.
    fn send_clear(&self) -> Result<(), TransportError>;
}

impl<T: DeviceSink + ?Sized> DeviceSink for Arc<T> {
    fn send_frame(&self, frame: &PackedFrame) -> Result<(), TransportError> {
        (**self).send_frame(frame)
    }

    fn send_clear(&self) -> Result<(), TransportError> {
        (**self).send_clear()
    }
}
