//! Error types for effects, presets and configuration

use std::path::PathBuf;

use thiserror::Error;

/// Validation failures raised while building an effect.
///
/// The store never holds an effect that failed any of these checks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    #[error("Expected {expected} rows, got {actual}")]
    RowCount { expected: usize, actual: usize },

    #[error("Expected row {row} to have {expected} columns, got {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Channel value {value} at ({row}, {col}) is outside 0.0..=1.0")]
    ChannelRange { row: usize, col: usize, value: f64 },

    #[error("Unknown {field} literal: {value:?}")]
    UnknownLiteral { field: &'static str, value: String },

    #[error("Wave effects need a direction")]
    MissingDirection,

    #[error("Invalid decay amount: {0}")]
    InvalidDecay(f64),

    #[error("Invalid update interval: {0}s")]
    InvalidInterval(f64),

    #[error("Palette error: {0}")]
    Palette(String),

    #[error("Invalid colour: {0:?}")]
    InvalidColor(String),

    #[error("Key ({row}, {col}) is outside the 6x22 grid")]
    KeyOutOfRange { row: usize, col: usize },
}

/// Failures loading or writing the config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Failures resolving a preset into effects.
#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Unknown preset: {0}")]
    Unknown(String),

    #[error("Preset {name}: {source}")]
    Effect {
        name: String,
        #[source]
        source: EffectError,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse presets: {0}")]
    Parse(#[from] toml::de::Error),
}
