//! Effect layers: the unit producers hand to the store.
//!
//! An effect is a full-keyboard [`Grid`] plus the rules for animating it
//! (`kind`, `decay`, `update_interval`, expiry counter) and for combining it
//! with the layers below it (`blend`). Effects can be built in code with
//! [`Effect::builder`] or loaded from TOML via [`EffectDef`].
//!
//! # Example TOML
//!
//! ```toml
//! kind = "WAVE"
//! blend = "FILL_NO_ZERO"
//! direction = "LEFT"
//! update_rate = 0.05
//! pattern = { type = "wave", colors = ["red", "blue"], orientation = "vertical", mode = "cluster" }
//! ```

pub mod patterns;
pub mod preview;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::color::Rgb8;
use crate::error::EffectError;
use crate::grid::{Cell, Grid};
use patterns::{Orientation, WaveMode};

// ── Closed enumerations ──────────────────────────────────────────────

/// Per-tick geometry transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectKind {
    Static,
    Wave,
    Explosion,
}

/// Rule for folding a layer into the running composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Blend {
    Add,
    Fill,
    FillEmpty,
    FillNoZero,
    Multiply,
}

/// Direction a wave travels in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

fn unknown(field: &'static str, value: &str) -> EffectError {
    EffectError::UnknownLiteral {
        field,
        value: value.to_string(),
    }
}

impl FromStr for EffectKind {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STATIC" => Ok(Self::Static),
            "WAVE" => Ok(Self::Wave),
            "EXPLOSION" => Ok(Self::Explosion),
            _ => Err(unknown("kind", s)),
        }
    }
}

impl FromStr for Blend {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADD" => Ok(Self::Add),
            "FILL" => Ok(Self::Fill),
            "FILL_EMPTY" => Ok(Self::FillEmpty),
            "FILL_NO_ZERO" => Ok(Self::FillNoZero),
            "MULTIPLY" => Ok(Self::Multiply),
            _ => Err(unknown("blend", s)),
        }
    }
}

impl FromStr for Direction {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "UP" => Ok(Self::Up),
            "RIGHT" => Ok(Self::Right),
            "DOWN" => Ok(Self::Down),
            "LEFT" => Ok(Self::Left),
            _ => Err(unknown("direction", s)),
        }
    }
}

// ── Hierarchy tags ───────────────────────────────────────────────────

/// Well-known effect ids, ordered by compositing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectTag {
    MovementKeyIndicator,
    InteractionKeyIndicator,
    InventoryKeyIndicator,
    Smoke,
    Fire,
    Flash,
    Kill,
    Shoot,
    Death,
    DefusalIndicator,
    Bomb,
    Result,
}

impl EffectTag {
    /// Lowest to highest.
    pub const LADDER: [EffectTag; 12] = [
        EffectTag::MovementKeyIndicator,
        EffectTag::InteractionKeyIndicator,
        EffectTag::InventoryKeyIndicator,
        EffectTag::Smoke,
        EffectTag::Fire,
        EffectTag::Flash,
        EffectTag::Kill,
        EffectTag::Shoot,
        EffectTag::Death,
        EffectTag::DefusalIndicator,
        EffectTag::Bomb,
        EffectTag::Result,
    ];

    /// Effects tied to the tracked player.
    pub const PLAYER: [EffectTag; 6] = [
        EffectTag::Death,
        EffectTag::Kill,
        EffectTag::Flash,
        EffectTag::Smoke,
        EffectTag::Fire,
        EffectTag::Shoot,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MovementKeyIndicator => "movement_key_indicator",
            Self::InteractionKeyIndicator => "interaction_key_indicator",
            Self::InventoryKeyIndicator => "inventory_key_indicator",
            Self::Smoke => "smoke",
            Self::Fire => "fire",
            Self::Flash => "flash",
            Self::Kill => "kill",
            Self::Shoot => "shoot",
            Self::Death => "death",
            Self::DefusalIndicator => "defusal_indicator",
            Self::Bomb => "bomb",
            Self::Result => "result",
        }
    }

    /// Exact match against the ladder ids.
    pub fn parse(id: &str) -> Option<Self> {
        Self::LADDER.into_iter().find(|tag| tag.as_str() == id)
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Effect ───────────────────────────────────────────────────────────

/// Store-assigned identity of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EffectHandle(pub(crate) u64);

impl fmt::Display for EffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One animated or static layer.
///
/// Shape and rules are fixed at construction; only the animator mutates the
/// colour state, counter and timestamp afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    kind: EffectKind,
    blend: Blend,
    direction: Option<Direction>,
    colors: Grid,
    decay_amount: Option<f64>,
    update_interval: Option<Duration>,
    last_update: Option<Instant>,
    remaining_updates: Option<u32>,
    id: Option<String>,
    pub(crate) handle: Option<EffectHandle>,
    pub(crate) dirty: bool,
}

impl Effect {
    pub fn builder(kind: EffectKind, blend: Blend, colors: Grid) -> EffectBuilder {
        EffectBuilder {
            kind,
            blend,
            colors,
            direction: None,
            decay_amount: None,
            update_interval: None,
            remaining_updates: None,
            id: None,
        }
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn blend(&self) -> Blend {
        self.blend
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn colors(&self) -> &Grid {
        &self.colors
    }

    pub fn decay_amount(&self) -> Option<f64> {
        self.decay_amount
    }

    pub fn update_interval(&self) -> Option<Duration> {
        self.update_interval
    }

    pub fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    pub fn remaining_updates(&self) -> Option<u32> {
        self.remaining_updates
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Ladder tag, if the id is one of the well-known ones.
    pub fn tag(&self) -> Option<EffectTag> {
        self.id.as_deref().and_then(EffectTag::parse)
    }

    /// Handle assigned when the effect was added to a store.
    pub fn handle(&self) -> Option<EffectHandle> {
        self.handle
    }

    /// Whether the effect is due for an animation step at `now`.
    ///
    /// Effects without an interval never animate.
    pub fn is_due(&self, now: Instant) -> bool {
        match (self.update_interval, self.last_update) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(interval), Some(last)) => now.saturating_duration_since(last) >= interval,
        }
    }

    pub(crate) fn colors_mut(&mut self) -> &mut Grid {
        &mut self.colors
    }

    pub(crate) fn remaining_updates_mut(&mut self) -> &mut Option<u32> {
        &mut self.remaining_updates
    }

    pub(crate) fn mark_updated(&mut self, now: Instant) {
        self.last_update = Some(now);
    }
}

/// Validating constructor for [`Effect`].
#[derive(Debug, Clone)]
pub struct EffectBuilder {
    kind: EffectKind,
    blend: Blend,
    colors: Grid,
    direction: Option<Direction>,
    decay_amount: Option<f64>,
    update_interval: Option<Duration>,
    remaining_updates: Option<u32>,
    id: Option<String>,
}

impl EffectBuilder {
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Subtract `amount` from every channel on each due tick.
    pub fn decay(mut self, amount: f64) -> Self {
        self.decay_amount = Some(amount);
        self
    }

    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = Some(interval);
        self
    }

    /// Expire after `updates` more due ticks.
    pub fn expires_after(mut self, updates: u32) -> Self {
        self.remaining_updates = Some(updates);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn build(self) -> Result<Effect, EffectError> {
        if self.kind == EffectKind::Wave && self.direction.is_none() {
            return Err(EffectError::MissingDirection);
        }
        if let Some(decay) = self.decay_amount {
            if !decay.is_finite() || decay < 0.0 {
                return Err(EffectError::InvalidDecay(decay));
            }
        }

        Ok(Effect {
            kind: self.kind,
            blend: self.blend,
            direction: self.direction,
            colors: self.colors,
            decay_amount: self.decay_amount,
            update_interval: self.update_interval,
            last_update: None,
            remaining_updates: self.remaining_updates,
            id: self.id,
            handle: None,
            dirty: false,
        })
    }
}

// ── Serialized definitions ───────────────────────────────────────────

/// Effect definition as loaded from TOML or JSON.
///
/// Literals stay strings here so that unknown values surface as
/// [`EffectError::UnknownLiteral`] when converting into an [`Effect`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDef {
    #[serde(alias = "type")]
    pub kind: String,
    #[serde(alias = "method")]
    pub blend: String,
    pub direction: Option<String>,
    /// Explicit 6×22 grid of float colours.
    pub colors: Option<Vec<Vec<Cell>>>,
    /// Generated grid, used when `colors` is absent.
    pub pattern: Option<PatternDef>,
    pub decay_amount: Option<f64>,
    /// Seconds between animation steps.
    pub update_rate: Option<f64>,
    pub expires_after_updates: Option<u32>,
    pub id: Option<String>,
}

/// Grid generator reference inside an [`EffectDef`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternDef {
    Solid {
        color: String,
    },
    Wave {
        colors: Vec<String>,
        orientation: String,
        mode: String,
    },
    Explosion {
        color: String,
    },
    /// Individual keys lit, given as `[row, col]` pairs.
    Keys {
        color: String,
        keys: Vec<[usize; 2]>,
    },
}

fn parse_color(s: &str) -> Result<Rgb8, EffectError> {
    Rgb8::parse(s).ok_or_else(|| EffectError::InvalidColor(s.to_string()))
}

impl PatternDef {
    pub fn to_grid(&self) -> Result<Grid, EffectError> {
        match self {
            Self::Solid { color } => Ok(patterns::solid_pattern(parse_color(color)?)),
            Self::Explosion { color } => Ok(patterns::explosion_pattern(parse_color(color)?)),
            Self::Keys { color, keys } => patterns::key_pattern(parse_color(color)?, keys),
            Self::Wave {
                colors,
                orientation,
                mode,
            } => {
                let palette = colors
                    .iter()
                    .map(|c| parse_color(c))
                    .collect::<Result<Vec<_>, _>>()?;
                let orientation: Orientation = orientation.parse()?;
                let mode: WaveMode = mode.parse()?;
                patterns::wave_pattern(&palette, orientation, mode)
            }
        }
    }
}

impl TryFrom<EffectDef> for Effect {
    type Error = EffectError;

    fn try_from(def: EffectDef) -> Result<Self, Self::Error> {
        let kind: EffectKind = def.kind.parse()?;
        let blend: Blend = def.blend.parse()?;

        let colors = match (def.colors, &def.pattern) {
            (Some(rows), _) => Grid::from_rows(rows)?,
            (None, Some(pattern)) => pattern.to_grid()?,
            (None, None) => Grid::blank(),
        };

        let mut builder = Effect::builder(kind, blend, colors);
        if let Some(direction) = def.direction {
            builder = builder.direction(direction.parse()?);
        }
        if let Some(decay) = def.decay_amount {
            builder = builder.decay(decay);
        }
        if let Some(rate) = def.update_rate {
            let interval = Duration::try_from_secs_f64(rate)
                .map_err(|_| EffectError::InvalidInterval(rate))?;
            builder = builder.update_interval(interval);
        }
        if let Some(updates) = def.expires_after_updates {
            builder = builder.expires_after(updates);
        }
        if let Some(id) = def.id {
            builder = builder.id(id);
        }
        builder.build()
    }
}
