//! Chroma SDK REST session: registration, heartbeat, frame upload.
//!
//! ```text
//! POST {base_url}            → { sessionid, uri }
//! PUT  {uri}/heartbeat       every few seconds while connected
//! PUT  {uri}/keyboard        CHROMA_CUSTOM frames / CHROMA_NONE
//! DELETE {uri}               on disconnect
//! ```
//!
//! Frame uploads use a very short timeout and are best-effort: the caller
//! drops the frame and the next tick supersedes it.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::blocking::Client;
use tracing::{debug, error, info, warn};

use crate::error::TransportError;
use crate::protocol::{
    self, path, AppInfo, KeyboardEffect, PackedFrame, ResultResponse, SessionResponse,
};
use crate::signal::ConnectionSignal;
use crate::DeviceSink;

/// Session parameters
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Registration endpoint of the local SDK server
    pub base_url: String,
    pub app: AppInfo,
    /// Timeout for registration and the initial keyboard reset
    pub request_timeout: Duration,
    /// Timeout for frame uploads, heartbeats and disconnect
    pub frame_timeout: Duration,
    pub heartbeat_interval: Duration,
    /// Time the SDK needs after registration before it accepts effects
    pub init_delay: Duration,
}

/// A live (or not yet established) connection to the Chroma SDK.
pub struct ChromaSession {
    client: Client,
    config: SessionConfig,
    uri: Arc<Mutex<Option<String>>>,
    signal: Arc<ConnectionSignal>,
    heartbeat: Mutex<Option<JoinHandle<()>>>,
}

impl ChromaSession {
    pub fn new(config: SessionConfig, signal: Arc<ConnectionSignal>) -> Result<Self, TransportError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            config,
            uri: Arc::new(Mutex::new(None)),
            signal,
            heartbeat: Mutex::new(None),
        })
    }

    /// Session uri handed out by the SDK, if registered.
    pub fn uri(&self) -> Option<String> {
        self.uri.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.signal.is_set()
    }

    /// Register with the SDK, reset the keyboard and start the heartbeat.
    ///
    /// The signal is set only once the reset went through, so the render
    /// loop never writes a frame that the reset would wipe. Any failure
    /// after registration unregisters again. A non-zero result from the
    /// reset is returned as `TransportError::Sdk`.
    pub fn connect(&self) -> Result<(), TransportError> {
        let session: SessionResponse = self
            .client
            .post(&self.config.base_url)
            .json(&self.config.app)
            .timeout(self.config.request_timeout)
            .send()?
            .error_for_status()?
            .json()?;

        debug!("Registered session {:?} at {}", session.session_id, session.uri);
        *self.uri.lock() = Some(session.uri.clone());

        thread::sleep(self.config.init_delay);

        if let Err(e) = self.reset_keyboard(&session.uri) {
            self.disconnect();
            return Err(e);
        }

        self.signal.set();
        self.start_heartbeat();
        info!("Connected to {}", session.uri);
        Ok(())
    }

    fn reset_keyboard(&self, uri: &str) -> Result<(), TransportError> {
        let reset: ResultResponse = self
            .client
            .put(format!("{uri}{}", path::KEYBOARD))
            .json(&KeyboardEffect::None)
            .timeout(self.config.request_timeout)
            .send()?
            .json()?;

        if reset.is_ok() {
            return Ok(());
        }
        if reset.result == protocol::RESULT_SYNAPSE_UNSUPPORTED {
            error!(
                "Failed to set keyboard colour, disconnecting. This is usually caused by a \
                 Synapse build without Chroma REST keyboard support. Code: {}",
                reset.result
            );
        } else {
            error!(
                "Failed to set keyboard colour, disconnecting. Code: {}",
                reset.result
            );
        }
        Err(TransportError::Sdk { code: reset.result })
    }

    /// Clear the signal and unregister best-effort.
    pub fn disconnect(&self) {
        self.signal.clear();
        let Some(uri) = self.uri.lock().take() else {
            return;
        };

        if let Err(e) = self
            .client
            .delete(&uri)
            .timeout(self.config.frame_timeout)
            .send()
        {
            debug!("Disconnect request dropped: {e}");
        }

        // Detached: the heartbeat thread exits after its current sleep.
        self.heartbeat.lock().take();

        info!("Disconnected from {uri}");
    }

    fn start_heartbeat(&self) {
        let client = self.client.clone();
        let uri = Arc::clone(&self.uri);
        let signal = Arc::clone(&self.signal);
        let interval = self.config.heartbeat_interval;
        let timeout = self.config.frame_timeout;

        let spawned = thread::Builder::new()
            .name("chroma-heartbeat".into())
            .spawn(move || {
                while signal.is_set() {
                    let target = uri.lock().clone();
                    if let Some(target) = target {
                        if let Err(e) = client
                            .put(format!("{target}{}", path::HEARTBEAT))
                            .timeout(timeout)
                            .send()
                        {
                            debug!("Heartbeat dropped: {e}");
                        }
                    }
                    thread::sleep(interval);
                }
            });

        match spawned {
            Ok(handle) => *self.heartbeat.lock() = Some(handle),
            Err(e) => warn!("Could not start heartbeat thread: {e}"),
        }
    }

    fn put_keyboard(&self, effect: &KeyboardEffect) -> Result<(), TransportError> {
        let uri = self.uri.lock().clone().ok_or(TransportError::NotConnected)?;
        self.client
            .put(format!("{uri}{}", path::KEYBOARD))
            .json(effect)
            .timeout(self.config.frame_timeout)
            .send()?;
        Ok(())
    }
}

impl DeviceSink for ChromaSession {
    fn send_frame(&self, frame: &PackedFrame) -> Result<(), TransportError> {
        self.put_keyboard(&KeyboardEffect::Custom(*frame))
    }

    fn send_clear(&self) -> Result<(), TransportError> {
        self.put_keyboard(&KeyboardEffect::None)
    }
}

impl Drop for ChromaSession {
    fn drop(&mut self) {
        if self.signal.is_set() {
            self.disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    use super::*;
    use crate::protocol::Author;

    fn config() -> SessionConfig {
        SessionConfig {
            base_url: "http://127.0.0.1:9/razer/chromasdk".to_string(),
            app: AppInfo::keyboard(
                "test",
                "test",
                Author {
                    name: "t".into(),
                    contact: "t".into(),
                },
            ),
            request_timeout: Duration::from_millis(200),
            frame_timeout: Duration::from_millis(10),
            heartbeat_interval: Duration::from_secs(5),
            init_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_frames_require_registration() {
        let session = ChromaSession::new(config(), Arc::new(ConnectionSignal::new())).unwrap();
        assert!(!session.is_connected());
        assert!(matches!(
            session.send_clear(),
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            session.send_frame(&[[0; protocol::COLS]; protocol::ROWS]),
            Err(TransportError::NotConnected)
        ));
    }

    // ── Against a local SDK stand-in ──

    type RequestLog = Arc<Mutex<Vec<(String, bool)>>>;

    /// Minimal Chroma REST server: records "METHOD /path" together with the
    /// signal state at the time of the request.
    fn serve(listener: TcpListener, signal: Arc<ConnectionSignal>, log: RequestLog) {
        let port = listener.local_addr().unwrap().port();
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap_or(0);
                }
            }
            let mut body = vec![0; content_length];
            let _ = reader.read_exact(&mut body);

            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let target = parts.next().unwrap_or_default().to_string();
            log.lock().push((format!("{method} {target}"), signal.is_set()));

            let reply = if method == "POST" {
                format!(r#"{{"sessionid": 1, "uri": "http://127.0.0.1:{port}/s"}}"#)
            } else {
                r#"{"result": 0}"#.to_string()
            };
            let _ = write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.len(),
                reply
            );
        }
    }

    #[test]
    fn test_signal_set_only_after_reset() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let signal = Arc::new(ConnectionSignal::new());
        let log = RequestLog::default();
        {
            let signal = Arc::clone(&signal);
            let log = Arc::clone(&log);
            thread::spawn(move || serve(listener, signal, log));
        }

        let mut cfg = config();
        cfg.base_url = format!("http://127.0.0.1:{port}/razer/chromasdk");
        cfg.request_timeout = Duration::from_secs(2);
        let session = ChromaSession::new(cfg, Arc::clone(&signal)).unwrap();

        session.connect().unwrap();
        assert!(signal.is_set());
        assert_eq!(
            session.uri().as_deref(),
            Some(format!("http://127.0.0.1:{port}/s").as_str())
        );

        let requests = log.lock().clone();
        assert_eq!(requests[0], ("POST /razer/chromasdk".to_string(), false));
        // The reset went out while the render loop was still held back.
        assert_eq!(requests[1], ("PUT /s/keyboard".to_string(), false));

        session.disconnect();
        assert!(!signal.is_set());
    }

    #[test]
    fn test_disconnect_without_session_is_noop() {
        let signal = Arc::new(ConnectionSignal::new());
        let session = ChromaSession::new(config(), Arc::clone(&signal)).unwrap();
        session.disconnect();
        assert!(!signal.is_set());
        assert!(session.uri().is_none());
    }
}
