//! The engine: effect store, per-tick animation, compositing and the
//! render loop that drives a [`DeviceSink`](chroma_transport::DeviceSink).

pub mod animate;
pub mod composite;
pub mod renderer;
pub mod store;

pub use animate::{animate, AnimationReport};
pub use composite::composite;
pub use renderer::{Renderer, TickOutcome};
pub use store::{EffectStore, SharedStore};
