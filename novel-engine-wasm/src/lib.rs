//! WASM bindings for novel-engine — the bridge to a browser presentation layer.

use wasm_bindgen::prelude::*;

use novel_engine::core::catalog::SceneCatalog;
use novel_engine::core::progression::StoryEngine;
use novel_engine::core::snapshot::SessionSnapshot;
use novel_engine::schema::player::{Player, PlayerUpdate};
use novel_engine::schema::route::{RouteCategory, RoutePoints};
use novel_engine::schema::scene::{Choice, DialogueSlide, Scene, SceneId};

// ---------------------------------------------------------------------------
// Embedded story data, compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const DEFAULT_CATALOG: &str = include_str!("../../story_data/default/catalog.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct GameView<'a> {
    phase: &'static str,
    scene: Option<SceneView<'a>>,
    leading_route: Option<RouteCategory>,
    route_points: RoutePoints,
    choices_made: u32,
}

#[derive(serde::Serialize)]
struct SceneView<'a> {
    id: SceneId,
    title: &'a str,
    category: RouteCategory,
    characters: &'a [String],
    slide_index: usize,
    slide_count: usize,
    slide: Option<&'a DialogueSlide>,
    choices: &'a [Choice],
}

#[derive(serde::Serialize)]
struct QueueInfo {
    queue: Vec<Scene>,
    has_more: bool,
    remaining: Vec<(RouteCategory, usize)>,
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// StoryGame: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryGame {
    engine: StoryEngine,
}

#[wasm_bindgen]
impl StoryGame {
    /// Create a game over the bundled story.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<StoryGame, JsError> {
        Self::from_catalog(data::DEFAULT_CATALOG, seed)
    }

    /// Create a game over a catalog supplied as a RON string.
    pub fn from_catalog(catalog_ron: &str, seed: u64) -> Result<StoryGame, JsError> {
        let catalog = SceneCatalog::parse_ron(catalog_ron)
            .map_err(|e| JsError::new(&format!("Catalog parse error: {e}")))?;
        let engine = StoryEngine::builder()
            .seed(seed)
            .with_catalog(catalog)
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(StoryGame { engine })
    }

    /// Everything the UI needs to draw the current moment, as JSON.
    ///
    /// `scene` is `null` once the story is complete.
    pub fn view(&self) -> Result<String, JsError> {
        let scene = self.engine.current_scene().map(|s| SceneView {
            id: s.id,
            title: &s.title,
            category: s.category,
            characters: &s.characters,
            slide_index: self.engine.slide_index(),
            slide_count: s.slide_count(),
            slide: self.engine.active_slide(),
            choices: self.engine.available_choices(),
        });
        to_json(&GameView {
            phase: self.engine.phase().name(),
            scene,
            leading_route: self.engine.leading_route(),
            route_points: *self.engine.route_points(),
            choices_made: self.engine.choices_made(),
        })
    }

    pub fn next_slide(&mut self) -> bool {
        self.engine.advance_slide()
    }

    pub fn previous_slide(&mut self) -> bool {
        self.engine.previous_slide()
    }

    /// Pick a choice on the final slide by index. Returns the new view.
    pub fn choose(&mut self, index: usize) -> Result<String, JsError> {
        self.engine.choose(index);
        self.view()
    }

    /// Apply an ad-hoc choice described by JSON, e.g.
    /// `{"text": "Help", "route_effects": {"friendship": 2}, "effects": [{"AdjustRelationship": ["Aoi", 1]}]}`.
    ///
    /// Unknown route names are rejected.
    pub fn apply_choice(&mut self, choice_json: &str) -> Result<String, JsError> {
        let choice: Choice = serde_json::from_str(choice_json)
            .map_err(|e| JsError::new(&format!("Invalid choice JSON: {e}")))?;
        self.engine.apply_choice(&choice);
        self.view()
    }

    /// Move to the next scene without scoring. Returns the new view.
    pub fn skip(&mut self) -> Result<String, JsError> {
        self.engine.skip();
        self.view()
    }

    pub fn leading_route(&self) -> Option<String> {
        self.engine.leading_route().map(|c| c.name().to_string())
    }

    pub fn route_points(&self) -> Result<String, JsError> {
        to_json(self.engine.route_points())
    }

    /// Relationships, flags, variables and inventory as JSON.
    pub fn story_state(&self) -> Result<String, JsError> {
        to_json(self.engine.story_state())
    }

    /// Debug view of the pending queue and remaining track content.
    pub fn queue_info(&self) -> Result<String, JsError> {
        to_json(&QueueInfo {
            queue: self.engine.queue_snapshot(),
            has_more: self.engine.has_more_scenes(),
            remaining: RouteCategory::ALL
                .into_iter()
                .map(|c| (c, self.engine.remaining_in_track(c)))
                .collect(),
        })
    }

    pub fn player(&self) -> Result<String, JsError> {
        to_json::<Player>(self.engine.player())
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.engine.set_player(PlayerUpdate::Name(name.to_string()));
    }

    pub fn set_player_age(&mut self, age: u32) {
        self.engine.set_player(PlayerUpdate::Age(age));
    }

    pub fn phase(&self) -> String {
        self.engine.phase().name().to_string()
    }

    pub fn start(&mut self) -> Result<(), JsError> {
        self.engine
            .start()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn open_menu(&mut self) {
        self.engine.open_menu();
    }

    pub fn resume(&mut self) {
        self.engine.resume();
    }

    /// Serialize the session for a save slot (RON text).
    pub fn save(&self) -> Result<String, JsError> {
        self.engine
            .snapshot()
            .to_ron()
            .map_err(|e| JsError::new(&format!("Save error: {e}")))
    }

    /// Restore a session previously produced by `save`.
    pub fn load(&mut self, saved: &str) -> Result<(), JsError> {
        let snapshot = SessionSnapshot::from_ron(saved)
            .map_err(|e| JsError::new(&format!("Invalid save data: {e}")))?;
        self.engine
            .restore(snapshot)
            .map_err(|e| JsError::new(&format!("Load error: {e}")))
    }

    /// Back to setup with a fresh session.
    pub fn reset(&mut self) {
        self.engine.reset_all();
    }

    /// Return JSON array of route category names, main first.
    pub fn route_categories() -> String {
        let names: Vec<&str> = RouteCategory::ALL.iter().map(|c| c.name()).collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }
}
