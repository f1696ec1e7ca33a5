/// The story engine: choice → score → queue orchestration.
///
/// Owns the player, route points, scene queue and random source, and is
/// the only writer of any of them.

use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::core::catalog::{CatalogError, SceneCatalog};
use crate::core::queue::{SceneQueue, DEFAULT_LEADER_WEIGHT};
use crate::core::rng::{RouteRng, SeededRng};
use crate::core::snapshot::{SessionSnapshot, SnapshotError};
use crate::schema::phase::AppPhase;
use crate::schema::player::{Player, PlayerUpdate};
use crate::schema::route::{RouteCategory, RoutePoints};
use crate::schema::scene::{Choice, DialogueSlide, Scene, SceneId};
use crate::schema::story_state::{StoryEffect, StoryState};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("player name must be set before the story starts")]
    MissingPlayerName,
}

/// The top-level story engine. Built via `StoryEngine::builder()`.
pub struct StoryEngine {
    queue: SceneQueue,
    player: Player,
    route_points: RoutePoints,
    story_state: StoryState,
    choices_made: u32,
    slide_index: usize,
    history: Vec<SceneId>,
    phase: AppPhase,
    rng: Box<dyn RouteRng>,
}

/// Builder for constructing a `StoryEngine`.
pub struct StoryEngineBuilder {
    catalog_paths: Vec<String>,
    catalog_dir: Option<String>,
    seed: u64,
    leader_weight: f64,
    /// Directly provided catalog (for testing without files).
    catalog: Option<SceneCatalog>,
    /// Directly provided random source (for scripted draws).
    rng: Option<Box<dyn RouteRng>>,
}

impl StoryEngine {
    pub fn builder() -> StoryEngineBuilder {
        StoryEngineBuilder {
            catalog_paths: Vec::new(),
            catalog_dir: None,
            seed: 0,
            leader_weight: DEFAULT_LEADER_WEIGHT,
            catalog: None,
            rng: None,
        }
    }

    // --- Turns ---

    /// Apply a choice's route and story effects, then move to the next scene.
    ///
    /// Returns the new current scene, `None` once the story is complete.
    /// While paused or in the menu the turn is ignored.
    pub fn apply_choice(&mut self, choice: &Choice) -> Option<&Scene> {
        if self.phase.is_suspended() {
            warn!(phase = self.phase.name(), "turn ignored while suspended");
            return self.current_scene();
        }

        self.route_points.apply(&choice.route_effects);
        for effect in &choice.effects {
            self.story_state.apply(effect);
        }
        self.choices_made += 1;

        self.queue.populate(&self.route_points, self.rng.as_mut());
        self.queue.advance();
        self.enter_current_scene();

        self.current_scene()
    }

    /// Move on without scoring.
    pub fn skip(&mut self) -> Option<&Scene> {
        self.apply_choice(&Choice::pass())
    }

    /// Pick one of the choices on the active slide by position.
    ///
    /// An index with no matching choice (including any index before the
    /// final slide is reached) leaves the engine untouched.
    pub fn choose(&mut self, index: usize) -> Option<&Scene> {
        let Some(choice) = self.available_choices().get(index).cloned() else {
            warn!(
                index,
                available = self.available_choices().len(),
                "no choice at index"
            );
            return self.current_scene();
        };
        self.apply_choice(&choice)
    }

    // --- Scene and slide access ---

    pub fn current_scene(&self) -> Option<&Scene> {
        self.queue.current_scene()
    }

    pub fn current_slide(&self, index: usize) -> Option<&DialogueSlide> {
        self.current_scene()?.slide(index)
    }

    /// The slide currently being shown.
    pub fn active_slide(&self) -> Option<&DialogueSlide> {
        self.current_slide(self.slide_index)
    }

    pub fn slide_index(&self) -> usize {
        self.slide_index
    }

    pub fn can_advance_slide(&self) -> bool {
        self.current_scene()
            .is_some_and(|s| self.slide_index + 1 < s.slide_count())
    }

    /// Step to the next slide of the current scene. Returns false on the
    /// final slide; the scene only ends through a turn.
    pub fn advance_slide(&mut self) -> bool {
        if !self.can_advance_slide() {
            return false;
        }
        self.slide_index += 1;
        true
    }

    /// Step back one slide within the current scene.
    pub fn previous_slide(&mut self) -> bool {
        if self.slide_index == 0 {
            return false;
        }
        self.slide_index -= 1;
        true
    }

    /// Choices open to the player: the scene's choices once its final
    /// slide is showing, nothing before that.
    pub fn available_choices(&self) -> &[Choice] {
        match self.current_scene() {
            Some(scene) if scene.is_final_slide(self.slide_index) => scene.choices(),
            _ => &[],
        }
    }

    // --- Routes ---

    pub fn route_points(&self) -> &RoutePoints {
        &self.route_points
    }

    pub fn leading_route(&self) -> Option<RouteCategory> {
        self.route_points.leading_side_route()
    }

    pub fn choices_made(&self) -> u32 {
        self.choices_made
    }

    // --- Queue observability ---

    pub fn queue_snapshot(&self) -> Vec<Scene> {
        self.queue.queue_snapshot()
    }

    pub fn has_more_scenes(&self) -> bool {
        self.queue.has_more_scenes()
    }

    pub fn remaining_in_track(&self, category: RouteCategory) -> usize {
        self.queue.remaining_in_track(category)
    }

    /// Every scene that has been current, oldest first.
    pub fn history(&self) -> &[SceneId] {
        &self.history
    }

    pub fn catalog(&self) -> &SceneCatalog {
        self.queue.catalog()
    }

    // --- Story state ---

    pub fn story_state(&self) -> &StoryState {
        &self.story_state
    }

    /// Write story state directly, outside any authored choice.
    pub fn apply_effect(&mut self, effect: &StoryEffect) {
        self.story_state.apply(effect);
    }

    // --- Player ---

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn set_player(&mut self, update: PlayerUpdate) {
        self.player.apply(update);
    }

    // --- Phase ---

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    /// Leave setup and begin playing. Requires a player name.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.phase != AppPhase::Setup {
            return Ok(());
        }
        if !self.player.has_name() {
            return Err(EngineError::MissingPlayerName);
        }
        let next = if self.current_scene().is_some() {
            AppPhase::Playing
        } else {
            AppPhase::Complete
        };
        self.set_phase(next);
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.phase == AppPhase::Playing {
            self.set_phase(AppPhase::Paused);
        }
    }

    pub fn open_menu(&mut self) {
        if matches!(self.phase, AppPhase::Playing | AppPhase::Paused) {
            self.set_phase(AppPhase::Menu);
        }
    }

    /// Return from pause or menu to play.
    pub fn resume(&mut self) {
        if self.phase.is_suspended() {
            self.set_phase(AppPhase::Playing);
        }
    }

    // --- Reset ---

    pub fn reset_player(&mut self) {
        self.player = Player::default();
    }

    pub fn reset_route_points(&mut self) {
        self.route_points.reset();
    }

    /// Back to a fresh session: default player, zero scores, empty story
    /// state, zero choices, queue holding only the first main scene.
    pub fn reset_all(&mut self) {
        self.reset_player();
        self.reset_route_points();
        self.story_state = StoryState::default();
        self.choices_made = 0;
        self.queue.reset();
        self.history.clear();
        self.enter_current_scene();
        self.set_phase(AppPhase::Setup);
    }

    // --- Persistence ---

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            player: self.player.clone(),
            route_points: self.route_points,
            story_state: self.story_state.clone(),
            route_progress: *self.queue.progress(),
            queued_scenes: self.queue.queued_ids(),
            slide_index: self.slide_index,
            choices_made: self.choices_made,
            history: self.history.clone(),
        }
    }

    /// Put the engine into the state a snapshot describes. On error the
    /// engine is left as it was.
    ///
    /// The random source is not part of a snapshot; draws after a restore
    /// continue from the engine's own generator.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> Result<(), EngineError> {
        if let Some(&id) = snapshot
            .history
            .iter()
            .find(|id| self.catalog().get(**id).is_none())
        {
            return Err(SnapshotError::UnknownScene(id).into());
        }
        // Complete holds exactly when nothing is left to show
        let finished = snapshot.queued_scenes.is_empty();
        if (snapshot.phase == AppPhase::Complete) != finished {
            return Err(SnapshotError::PhaseMismatch {
                phase: snapshot.phase.name(),
                queued: snapshot.queued_scenes.len(),
            }
            .into());
        }
        if let Some(id) = snapshot.current_scene_id() {
            let slide_count = self
                .catalog()
                .get(id)
                .ok_or(SnapshotError::UnknownScene(id))?
                .slide_count();
            if snapshot.slide_index >= slide_count {
                return Err(SnapshotError::SlideOutOfRange {
                    scene: id,
                    index: snapshot.slide_index,
                }
                .into());
            }
        }

        self.queue
            .restore(&snapshot.queued_scenes, snapshot.route_progress)?;
        self.player = snapshot.player;
        self.route_points = snapshot.route_points;
        self.story_state = snapshot.story_state;
        self.choices_made = snapshot.choices_made;
        self.slide_index = snapshot.slide_index;
        self.history = snapshot.history;
        self.phase = snapshot.phase;

        info!(
            scene = ?self.current_scene().map(|s| s.id),
            phase = self.phase.name(),
            "session restored"
        );
        Ok(())
    }

    // --- Internals ---

    /// Bookkeeping after the head of the queue changes.
    fn enter_current_scene(&mut self) {
        self.slide_index = 0;
        match self.queue.current_scene() {
            Some(scene) => {
                info!(
                    scene = %scene.id,
                    title = %scene.title,
                    category = %scene.category,
                    choices_made = self.choices_made,
                    "scene entered"
                );
                self.history.push(scene.id);
            }
            None => {
                if self.phase != AppPhase::Complete {
                    info!(choices_made = self.choices_made, "story complete");
                    self.set_phase(AppPhase::Complete);
                }
            }
        }
    }

    fn set_phase(&mut self, phase: AppPhase) {
        if self.phase != phase {
            info!(from = self.phase.name(), to = phase.name(), "phase changed");
            self.phase = phase;
        }
    }
}

impl StoryEngineBuilder {
    /// Load scenes from a RON catalog file. May be called repeatedly;
    /// files are merged in call order.
    pub fn catalog_path(mut self, path: &str) -> Self {
        self.catalog_paths.push(path.to_string());
        self
    }

    /// Load every `.ron` file in a directory, in file-name order.
    pub fn catalog_dir(mut self, path: &str) -> Self {
        self.catalog_dir = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Probability that the leading route supplies the next scene.
    pub fn leader_weight(mut self, weight: f64) -> Self {
        self.leader_weight = weight;
        self
    }

    /// Provide a catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: SceneCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide the random source directly. Overrides `seed`.
    pub fn with_rng(mut self, rng: Box<dyn RouteRng>) -> Self {
        self.rng = Some(rng);
        self
    }

    pub fn build(self) -> Result<StoryEngine, EngineError> {
        let mut catalog = self.catalog.unwrap_or_default();

        for path in &self.catalog_paths {
            catalog.merge(SceneCatalog::load_from_ron(Path::new(path))?)?;
        }

        if let Some(ref dir) = self.catalog_dir {
            for path in ron_files_in_dir(dir)? {
                catalog.merge(SceneCatalog::load_from_ron(&path)?)?;
            }
        }

        catalog.validate()?;

        let rng: Box<dyn RouteRng> = match self.rng {
            Some(rng) => rng,
            None => Box::new(SeededRng::new(self.seed)),
        };
        let queue = SceneQueue::with_leader_weight(catalog, self.leader_weight);

        let mut engine = StoryEngine {
            queue,
            player: Player::default(),
            route_points: RoutePoints::new(),
            story_state: StoryState::default(),
            choices_made: 0,
            slide_index: 0,
            history: Vec::new(),
            phase: AppPhase::Setup,
            rng,
        };
        engine.enter_current_scene();
        Ok(engine)
    }
}

/// All .ron files in a directory, sorted by path for a stable merge order.
fn ron_files_in_dir(dir: &str) -> Result<Vec<std::path::PathBuf>, EngineError> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
