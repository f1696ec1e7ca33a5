/// Scene catalog — the read-only story content, split into one ordered
/// track per route category.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::schema::route::RouteCategory;
use crate::schema::scene::{DialogueSlide, Scene, SceneId};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate scene id {0}")]
    DuplicateSceneId(SceneId),
    #[error("scene {0} has no slides")]
    EmptyScene(SceneId),
    #[error("scene {scene} offers choices on slide {slide}, before its final slide")]
    ChoicesBeforeFinalSlide { scene: SceneId, slide: usize },
    #[error("the main track has no scenes")]
    EmptyMainTrack,
}

/// All authored scenes, one track per category. Track order is the
/// authored narrative order.
#[derive(Debug, Clone, Default)]
pub struct SceneCatalog {
    tracks: [Vec<Scene>; RouteCategory::COUNT],
    index: FxHashMap<SceneId, (RouteCategory, usize)>,
}

// RON deserialization helpers. In catalog files the category comes from
// the track a scene is listed under, so scenes do not repeat it.

#[derive(Debug, Deserialize)]
#[serde(rename = "Scene")]
struct RonScene {
    id: u32,
    title: String,
    #[serde(default)]
    characters: Vec<String>,
    slides: Vec<DialogueSlide>,
}

impl SceneCatalog {
    /// Build a catalog from scenes, filing each under its own category.
    /// Relative order within a category is preserved.
    pub fn new(scenes: Vec<Scene>) -> Result<SceneCatalog, CatalogError> {
        let mut catalog = SceneCatalog::default();
        for scene in scenes {
            catalog.push(scene)?;
        }
        Ok(catalog)
    }

    /// Load a catalog from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<SceneCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a catalog from a RON string: a map from category to the
    /// ordered list of scenes in that track.
    pub fn parse_ron(input: &str) -> Result<SceneCatalog, CatalogError> {
        let raw: BTreeMap<RouteCategory, Vec<RonScene>> = ron::from_str(input)?;
        let mut catalog = SceneCatalog::default();

        for (category, scenes) in raw {
            for ron_scene in scenes {
                catalog.push(Scene {
                    id: SceneId(ron_scene.id),
                    title: ron_scene.title,
                    category,
                    characters: ron_scene.characters,
                    slides: ron_scene.slides,
                })?;
            }
        }

        Ok(catalog)
    }

    /// Append every scene of `other` to the end of its track here.
    pub fn merge(&mut self, other: SceneCatalog) -> Result<(), CatalogError> {
        for track in other.tracks {
            for scene in track {
                self.push(scene)?;
            }
        }
        Ok(())
    }

    /// Append a scene to the end of its category's track.
    pub fn push(&mut self, scene: Scene) -> Result<(), CatalogError> {
        validate_scene(&scene)?;
        if self.index.contains_key(&scene.id) {
            return Err(CatalogError::DuplicateSceneId(scene.id));
        }

        let track = &mut self.tracks[scene.category.index()];
        self.index.insert(scene.id, (scene.category, track.len()));
        track.push(scene);
        Ok(())
    }

    /// Check catalog-wide requirements that single scenes cannot express.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.track(RouteCategory::Main).is_empty() {
            return Err(CatalogError::EmptyMainTrack);
        }
        Ok(())
    }

    pub fn track(&self, category: RouteCategory) -> &[Scene] {
        &self.tracks[category.index()]
    }

    pub fn track_len(&self, category: RouteCategory) -> usize {
        self.tracks[category.index()].len()
    }

    /// The scene at `position` within a track.
    pub fn scene_at(&self, category: RouteCategory, position: usize) -> Option<&Scene> {
        self.tracks[category.index()].get(position)
    }

    pub fn get(&self, id: SceneId) -> Option<&Scene> {
        let (category, position) = self.locate(id)?;
        self.scene_at(category, position)
    }

    /// Track and position of a scene.
    pub fn locate(&self, id: SceneId) -> Option<(RouteCategory, usize)> {
        self.index.get(&id).copied()
    }

    /// Every scene, track by track in category order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.tracks.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn validate_scene(scene: &Scene) -> Result<(), CatalogError> {
    if scene.slides.is_empty() {
        return Err(CatalogError::EmptyScene(scene.id));
    }
    let last = scene.slides.len() - 1;
    if let Some(slide) = scene.slides[..last]
        .iter()
        .position(|s| !s.choices.is_empty())
    {
        return Err(CatalogError::ChoicesBeforeFinalSlide {
            scene: scene.id,
            slide,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::route::RouteEffects;
    use crate::schema::scene::Choice;

    fn make_scene(id: u32, category: RouteCategory) -> Scene {
        Scene {
            id: SceneId(id),
            title: format!("Scene {}", id),
            category,
            characters: Vec::new(),
            slides: vec![DialogueSlide::narration("...")],
        }
    }

    #[test]
    fn files_scenes_by_category() {
        let catalog = SceneCatalog::new(vec![
            make_scene(1, RouteCategory::Main),
            make_scene(2, RouteCategory::Romance),
            make_scene(3, RouteCategory::Main),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.track_len(RouteCategory::Main), 2);
        assert_eq!(catalog.track(RouteCategory::Main)[1].id, SceneId(3));
        assert_eq!(catalog.track_len(RouteCategory::Action), 0);
        assert_eq!(
            catalog.locate(SceneId(3)),
            Some((RouteCategory::Main, 1))
        );
        assert_eq!(catalog.get(SceneId(2)).unwrap().category, RouteCategory::Romance);
        assert!(catalog.get(SceneId(99)).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = SceneCatalog::new(vec![
            make_scene(1, RouteCategory::Main),
            make_scene(1, RouteCategory::Mystery),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateSceneId(SceneId(1)))));
    }

    #[test]
    fn rejects_scene_without_slides() {
        let mut scene = make_scene(4, RouteCategory::Main);
        scene.slides.clear();
        assert!(matches!(
            SceneCatalog::new(vec![scene]),
            Err(CatalogError::EmptyScene(SceneId(4)))
        ));
    }

    #[test]
    fn rejects_choices_before_final_slide() {
        let mut scene = make_scene(5, RouteCategory::Main);
        scene.slides = vec![
            DialogueSlide::narration("first").with_choices(vec![Choice::new(
                "too early",
                RouteEffects::new(),
            )]),
            DialogueSlide::narration("second"),
        ];
        assert!(matches!(
            SceneCatalog::new(vec![scene]),
            Err(CatalogError::ChoicesBeforeFinalSlide { scene: SceneId(5), slide: 0 })
        ));
    }

    #[test]
    fn validate_requires_main_track() {
        let catalog = SceneCatalog::new(vec![make_scene(1, RouteCategory::Romance)]).unwrap();
        assert!(matches!(catalog.validate(), Err(CatalogError::EmptyMainTrack)));
        assert!(SceneCatalog::default().validate().is_err());
    }

    #[test]
    fn merge_appends_and_checks_ids() {
        let mut base = SceneCatalog::new(vec![make_scene(1, RouteCategory::Main)]).unwrap();
        let extra = SceneCatalog::new(vec![
            make_scene(2, RouteCategory::Main),
            make_scene(3, RouteCategory::Action),
        ])
        .unwrap();
        base.merge(extra).unwrap();
        assert_eq!(base.track(RouteCategory::Main)[1].id, SceneId(2));
        assert_eq!(base.len(), 3);

        let clash = SceneCatalog::new(vec![make_scene(3, RouteCategory::Mystery)]).unwrap();
        assert!(base.merge(clash).is_err());
    }

    #[test]
    fn parse_ron_tracks() {
        let catalog_ron = r#"{
            main: [
                Scene(
                    id: 1,
                    title: "Arrival",
                    characters: ["Mira"],
                    slides: [
                        (text: "The train pulls in."),
                        (
                            speaker: Some("Mira"),
                            text: "You made it.",
                            choices: [
                                (text: "Smile", route_effects: {romance: 1}),
                                (text: "Nod"),
                            ],
                        ),
                    ],
                ),
            ],
            action: [
                Scene(id: 10, title: "Chase", slides: [(text: "Run!")]),
            ],
        }"#;
        let catalog = SceneCatalog::parse_ron(catalog_ron).unwrap();
        assert_eq!(catalog.len(), 2);

        let arrival = catalog.get(SceneId(1)).unwrap();
        assert_eq!(arrival.category, RouteCategory::Main);
        assert_eq!(arrival.slides.len(), 2);
        assert_eq!(arrival.choices().len(), 2);
        assert_eq!(
            arrival.choices()[0].route_effects.get(RouteCategory::Romance),
            1
        );
        assert!(arrival.choices()[1].route_effects.is_empty());

        let chase = catalog.get(SceneId(10)).unwrap();
        assert_eq!(chase.category, RouteCategory::Action);
        assert!(chase.characters.is_empty());
    }

    #[test]
    fn parse_ron_rejects_unknown_track() {
        let catalog_ron = r#"{
            horror: [Scene(id: 1, title: "Boo", slides: [(text: "...")])],
        }"#;
        assert!(matches!(
            SceneCatalog::parse_ron(catalog_ron),
            Err(CatalogError::Ron(_))
        ));
    }

    #[test]
    fn load_test_catalog_from_ron() {
        let path = std::path::PathBuf::from("tests/fixtures/test_catalog.ron");
        let catalog = SceneCatalog::load_from_ron(&path).unwrap();
        catalog.validate().unwrap();
        assert_eq!(catalog.track_len(RouteCategory::Main), 3);
        assert_eq!(catalog.track_len(RouteCategory::Romance), 2);
        assert_eq!(catalog.track_len(RouteCategory::Action), 2);
        assert_eq!(catalog.len(), 9);
    }
}
