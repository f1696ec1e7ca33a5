/// Session snapshots — the minimal state needed to resume a play-through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::queue::RouteProgress;
use crate::schema::phase::AppPhase;
use crate::schema::player::Player;
use crate::schema::route::{RouteCategory, RoutePoints};
use crate::schema::scene::SceneId;
use crate::schema::story_state::StoryState;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot references unknown scene {0}")]
    UnknownScene(SceneId),
    #[error("snapshot queues scene {0} before its track reached it")]
    UndispatchedScene(SceneId),
    #[error("snapshot queues scene {0} more than once")]
    DuplicateQueuedScene(SceneId),
    #[error("snapshot phase '{phase}' does not match its queue ({queued} scenes pending)")]
    PhaseMismatch { phase: &'static str, queued: usize },
    #[error("{category} cursor {cursor} is past the end of its track ({len} scenes)")]
    CursorOutOfRange {
        category: RouteCategory,
        cursor: usize,
        len: usize,
    },
    #[error("slide {index} is out of range for scene {scene}")]
    SlideOutOfRange { scene: SceneId, index: usize },
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Everything a save slot needs to put an engine back where it was.
///
/// Scenes are referenced by id; the catalog itself is not saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: AppPhase,
    pub player: Player,
    pub route_points: RoutePoints,
    #[serde(default)]
    pub story_state: StoryState,
    pub route_progress: RouteProgress,
    /// Pending scenes, head (current scene) first.
    pub queued_scenes: Vec<SceneId>,
    #[serde(default)]
    pub slide_index: usize,
    pub choices_made: u32,
    #[serde(default)]
    pub history: Vec<SceneId>,
}

impl SessionSnapshot {
    pub fn current_scene_id(&self) -> Option<SceneId> {
        self.queued_scenes.first().copied()
    }

    pub fn to_ron(&self) -> Result<String, SnapshotError> {
        let pretty = ron::ser::PrettyConfig::default();
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    pub fn from_ron(input: &str) -> Result<SessionSnapshot, SnapshotError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::player::PlayerUpdate;
    use std::collections::BTreeMap;

    fn make_snapshot() -> SessionSnapshot {
        let mut player = Player::default();
        player.apply(PlayerUpdate::Name("Ren".to_string()));
        let mut route_points = RoutePoints::new();
        route_points.add(RouteCategory::Mystery, 4);
        route_points.add(RouteCategory::Romance, -1);

        let mut story_state = StoryState::default();
        story_state.adjust_relationship("Mira", 2);
        story_state.set_flag("met_odo", true);
        story_state.add_item("lantern");

        SessionSnapshot {
            phase: AppPhase::Playing,
            player,
            route_points,
            story_state,
            route_progress: BTreeMap::from([
                (RouteCategory::Main, 2usize),
                (RouteCategory::Mystery, 1),
            ])
            .into(),
            queued_scenes: vec![SceneId(20)],
            slide_index: 1,
            choices_made: 3,
            history: vec![SceneId(1), SceneId(2), SceneId(20)],
        }
    }

    #[test]
    fn ron_round_trip() {
        let snapshot = make_snapshot();
        let serialized = snapshot.to_ron().unwrap();
        let deserialized = SessionSnapshot::from_ron(&serialized).unwrap();
        assert_eq!(deserialized, snapshot);
        assert_eq!(deserialized.current_scene_id(), Some(SceneId(20)));
        assert_eq!(
            deserialized.route_progress.cursor(RouteCategory::Mystery),
            1
        );
        assert_eq!(deserialized.story_state.relationship("Mira"), 2);
        assert!(deserialized.story_state.has_item("lantern"));
    }

    #[test]
    fn optional_fields_default() {
        let input = r#"(
            phase: playing,
            player: (name: "Ren", age: 30),
            route_points: {action: 2},
            route_progress: {main: 1},
            queued_scenes: [SceneId(1)],
            choices_made: 0,
        )"#;
        let snapshot = SessionSnapshot::from_ron(input).unwrap();
        assert_eq!(snapshot.slide_index, 0);
        assert!(snapshot.history.is_empty());
        assert!(snapshot.story_state.is_empty());
        assert_eq!(snapshot.route_points.get(RouteCategory::Action), 2);
        assert_eq!(snapshot.route_points.get(RouteCategory::Main), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            SessionSnapshot::from_ron("not a snapshot"),
            Err(SnapshotError::Ron(_))
        ));
    }
}
