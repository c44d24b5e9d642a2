//! User configuration (`$XDG_CONFIG_HOME/gsi-chroma/config.toml`).
//!
//! Every key has a default. A missing file is created with the defaults, and
//! an existing one is rewritten when keys are missing so that users can see
//! every knob.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chroma_transport::protocol::DEFAULT_SDK_URL;
use chroma_transport::{AppInfo, Author, SessionConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Complete configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sdk: SdkConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Chroma SDK connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Registration endpoint of the local REST server
    pub base_url: String,
    pub title: String,
    pub description: String,
    pub author_name: String,
    pub author_contact: String,
    pub request_timeout_ms: u64,
    /// Frame uploads are dropped after this long
    pub frame_timeout_ms: u64,
    pub heartbeat_interval_ms: u64,
    /// Wait after registration before the SDK accepts effects
    pub init_delay_ms: u64,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SDK_URL.to_string(),
            title: "GSI Chroma".to_string(),
            description: "Keyboard lighting driven by game state events".to_string(),
            author_name: "gsi-chroma".to_string(),
            author_contact: "https://localhost".to_string(),
            request_timeout_ms: 2000,
            frame_timeout_ms: 15,
            heartbeat_interval_ms: 5000,
            init_delay_ms: 2000,
        }
    }
}

impl SdkConfig {
    pub fn session_config(&self) -> SessionConfig {
        let author = Author {
            name: self.author_name.clone(),
            contact: self.author_contact.clone(),
        };
        SessionConfig {
            base_url: self.base_url.clone(),
            app: AppInfo::keyboard(&self.title, &self.description, author),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            frame_timeout: Duration::from_millis(self.frame_timeout_ms),
            heartbeat_interval: Duration::from_millis(self.heartbeat_interval_ms),
            init_delay: Duration::from_millis(self.init_delay_ms),
        }
    }
}

/// Renderer and preset settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Preset used when the command line names none
    pub default_preset: String,
    /// Extra preset definitions merged over the built-ins
    pub presets_file: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_preset: "layers".to_string(),
            presets_file: None,
        }
    }
}

/// `$XDG_CONFIG_HOME/gsi-chroma`, falling back to `~/.config/gsi-chroma`.
pub fn config_dir() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("gsi-chroma")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/gsi-chroma")
    } else {
        PathBuf::from("/tmp/gsi-chroma")
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load `path`, writing defaults for the file or any missing keys.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let normalized = toml::to_string_pretty(&config)?;
        if normalized != content {
            debug!("Filling missing keys in {}", path.display());
            config.save(path)?;
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gsi-chroma-test-{}-{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.join("config.toml")
    }

    #[test]
    fn test_default_config_serializes() {
        let toml_str = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml_str.contains("[sdk]"));
        assert!(toml_str.contains("[render]"));
        assert!(toml_str.contains("localhost:54235/razer/chromasdk"));
        assert!(toml_str.contains("heartbeat_interval_ms = 5000"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[sdk]\nframe_timeout_ms = 40\n").unwrap();
        assert_eq!(config.sdk.frame_timeout_ms, 40);
        assert_eq!(config.sdk.heartbeat_interval_ms, 5000);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_session_config_conversion() {
        let session = SdkConfig::default().session_config();
        assert_eq!(session.base_url, DEFAULT_SDK_URL);
        assert_eq!(session.heartbeat_interval, Duration::from_secs(5));
        assert_eq!(session.init_delay, Duration::from_secs(2));
        assert_eq!(session.app.device_supported, vec!["keyboard".to_string()]);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let path = temp_path("create");
        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_or_create_fills_missing_keys() {
        let path = temp_path("fill");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[render]\ndefault_preset = \"wave\"\n").unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.render.default_preset, "wave");

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("frame_timeout_ms"));
        assert!(rewritten.contains("default_preset = \"wave\""));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_file_is_reported() {
        let path = temp_path("invalid");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[sdk]\nframe_timeout_ms = \"soon\"\n").unwrap();
        assert!(matches!(
            Config::load_or_create(&path),
            Err(ConfigError::Parse { .. })
        ));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
