use serde::{Deserialize, Serialize};
use std::fmt;

use super::route::{RouteCategory, RouteEffects};
use super::story_state::StoryEffect;

/// Newtype wrapper for scene IDs. Unique across every track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneId(pub u32);

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An authored option offered to the player at the end of a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub route_effects: RouteEffects,
    /// Story-state writes applied alongside the route effects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<StoryEffect>,
}

impl Choice {
    pub fn new(text: &str, route_effects: RouteEffects) -> Self {
        Self {
            text: text.to_string(),
            route_effects,
            effects: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: StoryEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// A pseudo-choice with no effects, used to move on without scoring.
    pub fn pass() -> Self {
        Self::default()
    }
}

/// One dialogue or narration beat within a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSlide {
    /// `None` means narration.
    #[serde(default)]
    pub speaker: Option<String>,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl DialogueSlide {
    pub fn narration(text: &str) -> Self {
        Self {
            speaker: None,
            text: text.to_string(),
            choices: Vec::new(),
        }
    }

    pub fn line(speaker: &str, text: &str) -> Self {
        Self {
            speaker: Some(speaker.to_string()),
            text: text.to_string(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn is_narration(&self) -> bool {
        self.speaker.is_none()
    }
}

/// An authored unit of story, filed under exactly one route track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub title: String,
    pub category: RouteCategory,
    #[serde(default)]
    pub characters: Vec<String>,
    pub slides: Vec<DialogueSlide>,
}

impl Scene {
    pub fn slide(&self, index: usize) -> Option<&DialogueSlide> {
        self.slides.get(index)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn final_slide(&self) -> Option<&DialogueSlide> {
        self.slides.last()
    }

    pub fn is_final_slide(&self, index: usize) -> bool {
        index + 1 == self.slides.len()
    }

    /// Choices offered when the scene ends.
    pub fn choices(&self) -> &[Choice] {
        self.final_slide()
            .map(|s| s.choices.as_slice())
            .unwrap_or(&[])
    }
}
