// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gsi_chroma")]
#[command(author, version, about = "Layered Razer Chroma keyboard effects")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/gsi-chroma/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra presets file, merged over the built-ins
    #[arg(long, global = true, value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. debug, gsi_chroma=trace)
    #[arg(long, global = true, default_value = "gsi_chroma=info,chroma_transport=info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Drive the keyboard through the Chroma SDK until Ctrl+C
    Run {
        /// Preset to play (default from config)
        preset: Option<String>,
    },

    /// Render a preset in the terminal instead of on the keyboard
    #[command(visible_alias = "p")]
    Preview {
        /// Preset to play (default from config)
        preset: Option<String>,
    },

    /// List available presets
    #[command(visible_alias = "ls")]
    Presets,

    /// Show the config file path and resolved values
    Config,
}
