use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A typed write to story state, attached to authored choices.
///
/// In catalog RON: `effects: [SetFlag("met_kai", true), AdjustRelationship("Kai", 2)]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryEffect {
    SetFlag(String, bool),
    SetVariable(String, i32),
    IncrementVariable(String, i32),
    AddItem(String),
    RemoveItem(String),
    SetRelationship(String, i32),
    AdjustRelationship(String, i32),
}

/// Per-session facts the story accumulates alongside route points:
/// affinity with individual characters, boolean flags, counters and
/// carried items.
///
/// Unset entries read as `0` / `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryState {
    /// Keyed by character name as it appears in a scene's `characters`.
    #[serde(default)]
    pub relationships: FxHashMap<String, i32>,
    #[serde(default)]
    pub flags: FxHashMap<String, bool>,
    #[serde(default)]
    pub variables: FxHashMap<String, i32>,
    /// Items in the order they were picked up. Duplicates are allowed.
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl StoryState {
    pub fn relationship(&self, character: &str) -> i32 {
        self.relationships.get(character).copied().unwrap_or(0)
    }

    pub fn set_relationship(&mut self, character: &str, value: i32) {
        self.relationships.insert(character.to_string(), value);
    }

    pub fn adjust_relationship(&mut self, character: &str, delta: i32) {
        let entry = self.relationships.entry(character.to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_string(), value);
    }

    pub fn variable(&self, name: &str) -> i32 {
        self.variables.get(name).copied().unwrap_or(0)
    }

    pub fn set_variable(&mut self, name: &str, value: i32) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn increment_variable(&mut self, name: &str, amount: i32) {
        let entry = self.variables.entry(name.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn add_item(&mut self, item: &str) {
        self.inventory.push(item.to_string());
    }

    /// Drop every copy of `item`.
    pub fn remove_item(&mut self, item: &str) {
        self.inventory.retain(|held| held != item);
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held == item)
    }

    pub fn apply(&mut self, effect: &StoryEffect) {
        match effect {
            StoryEffect::SetFlag(name, value) => self.set_flag(name, *value),
            StoryEffect::SetVariable(name, value) => self.set_variable(name, *value),
            StoryEffect::IncrementVariable(name, amount) => self.increment_variable(name, *amount),
            StoryEffect::AddItem(item) => self.add_item(item),
            StoryEffect::RemoveItem(item) => self.remove_item(item),
            StoryEffect::SetRelationship(character, value) => {
                self.set_relationship(character, *value)
            }
            StoryEffect::AdjustRelationship(character, delta) => {
                self.adjust_relationship(character, *delta)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
            && self.flags.is_empty()
            && self.variables.is_empty()
            && self.inventory.is_empty()
    }
}
