//! Chroma SDK REST protocol constants and wire types

use serde::{Deserialize, Serialize};

/// Keyboard custom-effect grid dimensions
pub const ROWS: usize = 6;
pub const COLS: usize = 22;

/// One frame in the SDK's packed colour layout (`r + g*256 + b*65536`).
pub type PackedFrame = [[u32; COLS]; ROWS];

/// Default registration endpoint of the local Chroma SDK REST server
pub const DEFAULT_SDK_URL: &str = "http://localhost:54235/razer/chromasdk";

/// Result code the SDK returns when Synapse rejects keyboard effects
pub const RESULT_SYNAPSE_UNSUPPORTED: i64 = 126;

/// Endpoint paths relative to the session uri
pub mod path {
    pub const KEYBOARD: &str = "/keyboard";
    pub const HEARTBEAT: &str = "/heartbeat";
}

/// Application author block sent on registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub contact: String,
}

/// Application registration body (`POST /razer/chromasdk`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub title: String,
    pub description: String,
    pub author: Author,
    pub device_supported: Vec<String>,
    pub category: String,
}

impl AppInfo {
    /// Registration for a keyboard-only application.
    pub fn keyboard(title: &str, description: &str, author: Author) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            author,
            device_supported: vec!["keyboard".to_string()],
            category: "application".to_string(),
        }
    }
}

/// Body of a `PUT {uri}/keyboard` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "param")]
pub enum KeyboardEffect {
    /// Turn every key off
    #[serde(rename = "CHROMA_NONE")]
    None,
    /// Per-key colours in packed layout
    #[serde(rename = "CHROMA_CUSTOM")]
    Custom(PackedFrame),
}

/// Response to a successful registration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    #[serde(rename = "sessionid", default)]
    pub session_id: Option<i64>,
    pub uri: String,
}

/// Generic `{ "result": code }` response
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResultResponse {
    pub result: i64,
}

impl ResultResponse {
    pub fn is_ok(&self) -> bool {
        self.result == 0
    }
}
