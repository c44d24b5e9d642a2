//! Named effect compositions.
//!
//! A preset is a list of [`EffectDef`]s that are validated together and then
//! added to the store, where the hierarchy decides their final order. The
//! built-ins mirror the in-game event effects; users can add or override
//! presets with their own TOML file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::effect::{Effect, EffectDef, EffectHandle};
use crate::engine::EffectStore;
use crate::error::PresetError;

/// One named composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Vec<EffectDef>,
}

/// Named presets, keyed by table name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetLibrary {
    #[serde(flatten)]
    pub presets: BTreeMap<String, Preset>,
}

impl PresetLibrary {
    /// The presets compiled into the binary.
    pub fn builtin() -> Result<Self, PresetError> {
        Self::from_toml(DEFAULT_PRESETS_TOML)
    }

    pub fn from_toml(content: &str) -> Result<Self, PresetError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let content = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Add `other`'s presets, replacing any with the same name.
    pub fn merge(&mut self, other: PresetLibrary) {
        self.presets.extend(other.presets);
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.presets.keys().map(|s| s.as_str()).collect()
    }

    /// Validate every effect of `name`.
    pub fn build(&self, name: &str) -> Result<Vec<Effect>, PresetError> {
        let preset = self
            .get(name)
            .ok_or_else(|| PresetError::Unknown(name.to_string()))?;
        preset
            .effects
            .iter()
            .cloned()
            .map(|def| {
                Effect::try_from(def).map_err(|source| PresetError::Effect {
                    name: name.to_string(),
                    source,
                })
            })
            .collect()
    }

    /// Add all effects of `name` to `store`. Nothing is added unless every
    /// effect is valid.
    pub fn apply(&self, name: &str, store: &mut EffectStore) -> Result<Vec<EffectHandle>, PresetError> {
        let effects = self.build(name)?;
        info!("Applying preset {name} ({} effects)", effects.len());
        Ok(effects.into_iter().map(|e| store.add(e)).collect())
    }
}

pub const DEFAULT_PRESETS_TOML: &str = r##"# GSI Chroma presets
# Each table is a preset; its effects are added in order and then placed by id.
# Literals: kind = STATIC | WAVE | EXPLOSION
#           blend = ADD | FILL | FILL_EMPTY | FILL_NO_ZERO | MULTIPLY
#           direction = UP | DOWN | LEFT | RIGHT
# Patterns: solid, wave, explosion, keys

[wave]
description = "Game won: green wave sweeping right"

[[wave.effects]]
id = "result"
kind = "WAVE"
blend = "FILL"
direction = "RIGHT"
update_rate = 0.2
pattern = { type = "wave", colors = ["#00FF00", "#69F668", "#1FC91F"], orientation = "vertical", mode = "cluster" }

[explosion]
description = "Bomb exploded: ring spreading from the centre"

[[explosion.effects]]
id = "bomb"
kind = "EXPLOSION"
blend = "FILL_NO_ZERO"
update_rate = 0.1
expires_after_updates = 14
pattern = { type = "explosion", color = "#FF5100" }

[flash]
description = "Flashbang wearing off"

[[flash.effects]]
id = "flash"
kind = "STATIC"
blend = "ADD"
decay_amount = 0.058823529
update_rate = 0.1
pattern = { type = "solid", color = "white" }

[kill]
description = "Kill confirmation flash"

[[kill.effects]]
id = "kill"
kind = "STATIC"
blend = "FILL"
decay_amount = 0.078431373
update_rate = 0.1
expires_after_updates = 5
pattern = { type = "solid", color = "#DE9B35" }

[kill_streak]
description = "Fifth kill: fading explosion"

[[kill_streak.effects]]
id = "kill"
kind = "EXPLOSION"
blend = "FILL_NO_ZERO"
decay_amount = 0.019607843
update_rate = 0.1
expires_after_updates = 14
pattern = { type = "explosion", color = "#DE9B35" }

[smoke]
description = "Leaving a smoke"

[[smoke.effects]]
id = "smoke"
kind = "STATIC"
blend = "ADD"
decay_amount = 0.098039216
update_rate = 0.05
pattern = { type = "solid", color = "#646464" }

[fire]
description = "Standing in fire"

[[fire.effects]]
id = "fire"
kind = "WAVE"
blend = "ADD"
direction = "UP"
update_rate = 0.2
pattern = { type = "wave", colors = ["#FF5100", "red"], orientation = "horizontal", mode = "alternating" }

[shoot]
description = "Single shot"

[[shoot.effects]]
id = "shoot"
kind = "STATIC"
blend = "ADD"
update_rate = 0.15
expires_after_updates = 1
pattern = { type = "solid", color = "#191919" }

[death]
description = "Dead"

[[death.effects]]
id = "death"
kind = "STATIC"
blend = "FILL"
pattern = { type = "solid", color = "red" }

[layers]
description = "Key indicators under smoke and fire"

[[layers.effects]]
id = "fire"
kind = "WAVE"
blend = "ADD"
direction = "UP"
update_rate = 0.2
pattern = { type = "wave", colors = ["#FF5100", "#400000"], orientation = "horizontal", mode = "cluster" }

[[layers.effects]]
id = "smoke"
kind = "STATIC"
blend = "ADD"
pattern = { type = "solid", color = "#202020" }

[[layers.effects]]
id = "interaction_key_indicator"
kind = "STATIC"
blend = "FILL_NO_ZERO"

[layers.effects.pattern]
type = "keys"
color = "#413A27"
keys = [
    [2, 0], [2, 1], [2, 4], [2, 5], [2, 6], [2, 7], [2, 8],
    [3, 5], [3, 6], [3, 7],
    [4, 3], [4, 5], [4, 6], [4, 7], [4, 9],
]

[[layers.effects]]
id = "movement_key_indicator"
kind = "STATIC"
blend = "FILL_NO_ZERO"

[layers.effects.pattern]
type = "keys"
color = "#DE9B35"
keys = [
    [2, 3], [3, 2], [3, 3], [3, 4],
    [4, 0], [4, 1], [5, 1],
    [5, 4], [5, 5], [5, 6], [5, 7], [5, 8], [5, 9], [5, 10],
]
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{Blend, EffectKind, EffectTag};

    #[test]
    fn test_builtin_presets_parse() {
        let lib = PresetLibrary::builtin().unwrap();
        for name in ["wave", "explosion", "flash", "layers", "kill", "death"] {
            assert!(lib.get(name).is_some(), "missing preset {name}");
        }
    }

    #[test]
    fn test_every_builtin_builds() {
        let lib = PresetLibrary::builtin().unwrap();
        for name in lib.names() {
            let effects = lib.build(name).unwrap();
            assert!(!effects.is_empty(), "{name} has no effects");
        }
    }

    #[test]
    fn test_explosion_preset_shape() {
        let lib = PresetLibrary::builtin().unwrap();
        let effects = lib.build("explosion").unwrap();
        assert_eq!(effects.len(), 1);
        let bomb = &effects[0];
        assert_eq!(bomb.kind(), EffectKind::Explosion);
        assert_eq!(bomb.blend(), Blend::FillNoZero);
        assert_eq!(bomb.remaining_updates(), Some(14));
        assert_eq!(bomb.tag(), Some(EffectTag::Bomb));
    }

    #[test]
    fn test_layers_follow_hierarchy() {
        let lib = PresetLibrary::builtin().unwrap();
        let mut store = EffectStore::new();
        let handles = lib.apply("layers", &mut store).unwrap();
        assert_eq!(handles.len(), 4);
        assert_eq!(
            store.ids(),
            vec![
                Some("movement_key_indicator"),
                Some("interaction_key_indicator"),
                Some("smoke"),
                Some("fire"),
            ]
        );
    }

    #[test]
    fn test_unknown_preset() {
        let lib = PresetLibrary::builtin().unwrap();
        assert!(matches!(
            lib.build("nope"),
            Err(PresetError::Unknown(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_invalid_preset_adds_nothing() {
        let lib = PresetLibrary::from_toml(
            r#"
[broken]
[[broken.effects]]
kind = "STATIC"
blend = "FILL"

[[broken.effects]]
kind = "WAVE"
blend = "FILL"
"#,
        )
        .unwrap();
        let mut store = EffectStore::new();
        let err = lib.apply("broken", &mut store).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_merge_overrides_builtin() {
        let mut lib = PresetLibrary::builtin().unwrap();
        let user = PresetLibrary::from_toml(
            r#"
[death]
description = "Dead, in blue"

[[death.effects]]
id = "death"
type = "STATIC"
method = "FILL"
pattern = { type = "solid", color = "blue" }
"#,
        )
        .unwrap();
        lib.merge(user);

        let effects = lib.build("death").unwrap();
        assert_eq!(effects[0].colors().get(0, 0), [0.0, 0.0, 1.0]);
        assert!(lib.get("wave").is_some());
    }
}
