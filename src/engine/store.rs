//! Ordered, hierarchy-aware list of active effects.
//!
//! Order is compositing order: index 0 is folded first and can be
//! overwritten by anything after it. Tagged effects are kept sorted by the
//! [`EffectTag::LADDER`]; untagged effects go to the tail.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::effect::{Effect, EffectHandle, EffectTag};

/// The lock shared by producers and the renderer.
pub type SharedStore = Arc<Mutex<EffectStore>>;

/// Ordered collection of active effects.
#[derive(Debug, Default)]
pub struct EffectStore {
    effects: Vec<Effect>,
    next_handle: u64,
    /// Bumped on every structural change (insert/remove).
    revision: u64,
}

impl EffectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Insert an effect at its hierarchy position. Returns its handle.
    pub fn add(&mut self, mut effect: Effect) -> EffectHandle {
        self.next_handle += 1;
        let handle = EffectHandle(self.next_handle);
        effect.handle = Some(handle);

        let index = self.insert_position(effect.tag());
        debug!(
            "Adding effect {handle} id={:?} at {index}/{}",
            effect.id(),
            self.effects.len()
        );
        self.effects.insert(index, effect);
        self.revision += 1;
        handle
    }

    /// Walk the ladder from the lowest rank. Every lower-ranked effect found
    /// pushes the insertion point to just after it; reaching the incoming tag
    /// stops the walk.
    fn insert_position(&self, tag: Option<EffectTag>) -> usize {
        let Some(tag) = tag else {
            return self.effects.len();
        };
        if self.effects.is_empty() {
            return 0;
        }

        let mut lowest_free = 0;
        for rung in EffectTag::LADDER {
            if rung == tag {
                return lowest_free;
            }
            if let Some(pos) = self.position_of(rung.as_str()) {
                lowest_free = pos + 1;
                if lowest_free == self.effects.len() {
                    return lowest_free;
                }
            }
        }
        self.effects.len()
    }

    fn position_of(&self, id: &str) -> Option<usize> {
        self.effects.iter().position(|e| e.id() == Some(id))
    }

    fn position_of_handle(&self, handle: EffectHandle) -> Option<usize> {
        self.effects.iter().position(|e| e.handle == Some(handle))
    }

    /// Remove an effect by identity. No-op if it is not present.
    pub fn remove(&mut self, handle: EffectHandle) -> Option<Effect> {
        let index = self.position_of_handle(handle)?;
        self.revision += 1;
        let effect = self.effects.remove(index);
        debug!("Removed effect {handle} id={:?}", effect.id());
        Some(effect)
    }

    /// First effect carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<EffectHandle> {
        self.effects
            .iter()
            .find(|e| e.id() == Some(id))
            .and_then(|e| e.handle)
    }

    pub fn get(&self, handle: EffectHandle) -> Option<&Effect> {
        self.effects.iter().find(|e| e.handle == Some(handle))
    }

    /// Remove the first effect carrying `id`.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Effect> {
        let handle = self.find_by_id(id)?;
        self.remove(handle)
    }

    /// Drop the effects tied to the tracked player (death, kill, flash,
    /// smoke, fire, shoot). Returns how many were removed.
    pub fn remove_player_effects(&mut self) -> usize {
        let mut removed = 0;
        for tag in EffectTag::PLAYER {
            if self.remove_by_id(tag.as_str()).is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        if !self.effects.is_empty() {
            self.effects.clear();
            self.revision += 1;
        }
    }

    /// Effects in compositing order.
    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub(crate) fn effects_mut(&mut self) -> &mut Vec<Effect> {
        &mut self.effects
    }

    /// Ids in compositing order (`None` for untagged effects).
    pub fn ids(&self) -> Vec<Option<&str>> {
        self.effects.iter().map(|e| e.id()).collect()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Clear every effect's dirty flag. Returns whether any was set.
    pub(crate) fn take_dirty(&mut self) -> bool {
        let mut any = false;
        for effect in &mut self.effects {
            any |= std::mem::take(&mut effect.dirty);
        }
        any
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
