// GSI Chroma - layered keyboard effects for the Razer Chroma SDK
// Effect model, hierarchy-ordered store, animation, compositing and render loop

pub mod color;
pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod grid;
pub mod presets;

pub use color::{encode_grid, Rgb8};
pub use effect::{
    Blend, Direction, Effect, EffectBuilder, EffectDef, EffectHandle, EffectKind, EffectTag,
};
pub use engine::{EffectStore, Renderer, SharedStore, TickOutcome};
pub use error::{ConfigError, EffectError, PresetError};
pub use grid::{Cell, Grid};
