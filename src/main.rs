//! GSI Chroma CLI
//!
//! Plays layered keyboard effects on a Razer Chroma keyboard, or previews
//! them in the terminal.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use chroma_transport::{ChromaSession, ConnectionSignal, DeviceSink};
use gsi_chroma::config::Config;
use gsi_chroma::effect::preview;
use gsi_chroma::engine::{EffectStore, Renderer};
use gsi_chroma::presets::PresetLibrary;

mod cli;
use cli::{Cli, Commands};

/// Delay between connection attempts while the SDK is unreachable.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_create(&config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;

    let presets = load_presets(&config, cli.presets.as_ref())?;

    match cli.command {
        Commands::Presets => {
            for (name, preset) in &presets.presets {
                let desc = preset.description.as_deref().unwrap_or("");
                println!("  {name:<14} {desc}");
            }
        }
        Commands::Config => {
            println!("Config: {}", config_path.display());
            print!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Preview { preset } => {
            let name = preset.unwrap_or_else(|| config.render.default_preset.clone());
            let store = EffectStore::shared();
            presets.apply(&name, &mut store.lock())?;

            let running = shutdown_flag();
            preview::run(store, &name, running).context("terminal preview")?;
        }
        Commands::Run { preset } => {
            let name = preset.unwrap_or_else(|| config.render.default_preset.clone());
            run(&config, &presets, &name)?;
        }
    }

    Ok(())
}

fn load_presets(config: &Config, extra: Option<&PathBuf>) -> Result<PresetLibrary> {
    let mut presets = PresetLibrary::builtin().context("built-in presets")?;
    for path in config.render.presets_file.iter().chain(extra) {
        let user = PresetLibrary::load(path)?;
        info!("Loaded {} presets from {}", user.presets.len(), path.display());
        presets.merge(user);
    }
    Ok(presets)
}

/// Ctrl-C clears the returned flag.
fn shutdown_flag() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    }) {
        warn!("Could not install Ctrl-C handler, stop with SIGKILL: {e}");
    }
    running
}

fn run(config: &Config, presets: &PresetLibrary, name: &str) -> Result<()> {
    let store = EffectStore::shared();
    presets.apply(name, &mut store.lock())?;

    let running = shutdown_flag();
    let signal = Arc::new(ConnectionSignal::new());
    let session = Arc::new(
        ChromaSession::new(config.sdk.session_config(), Arc::clone(&signal))
            .context("create Chroma SDK client")?,
    );

    let sink: Arc<dyn DeviceSink> = session.clone();
    let render = Renderer::new(Arc::clone(&store), signal, sink)
        .spawn(Arc::clone(&running))
        .context("spawn render thread")?;

    info!("Connecting to {}", config.sdk.base_url);
    while running.load(Ordering::SeqCst) && !session.is_connected() {
        match session.connect() {
            Ok(()) => {}
            Err(e) if e.is_transient() => {
                warn!("Chroma SDK unavailable ({e}), retrying");
                thread::sleep(RECONNECT_DELAY);
            }
            Err(e) => {
                running.store(false, Ordering::SeqCst);
                let _ = render.join();
                return Err(e).context("connect to Chroma SDK");
            }
        }
    }

    println!("Playing preset {name}. Ctrl+C to stop.");
    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(100));
    }

    info!("Shutting down");
    let _ = render.join();
    session.disconnect();
    Ok(())
}
