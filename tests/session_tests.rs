/// Session integration tests — full play-throughs over the fixture catalog.

use novel_engine::core::progression::StoryEngine;
use novel_engine::core::rng::SequenceRng;
use novel_engine::core::snapshot::SessionSnapshot;
use novel_engine::schema::phase::AppPhase;
use novel_engine::schema::player::{Player, PlayerUpdate};
use novel_engine::schema::route::{RouteCategory, RouteEffects};
use novel_engine::schema::scene::{Choice, SceneId};
use novel_engine::schema::story_state::StoryEffect;
use std::collections::HashSet;

const FIXTURE: &str = "tests/fixtures/test_catalog.ron";

fn engine_with_draws(draws: Vec<f64>) -> StoryEngine {
    StoryEngine::builder()
        .catalog_path(FIXTURE)
        .with_rng(Box::new(SequenceRng::new(draws)))
        .build()
        .unwrap()
}

fn effect(category: RouteCategory, delta: i32) -> Choice {
    Choice::new("test", RouteEffects::new().with(category, delta))
}

#[test]
fn without_a_leader_main_runs_in_order() {
    // Draws would favour any leader, but nothing leads
    let mut engine = engine_with_draws(vec![0.0]);
    let penalty = effect(RouteCategory::Romance, -1);

    assert_eq!(engine.apply_choice(&penalty).map(|s| s.id), Some(SceneId(2)));
    assert_eq!(engine.apply_choice(&penalty).map(|s| s.id), Some(SceneId(3)));
    // Main exhausted: side tracks in declared order
    assert_eq!(engine.skip().map(|s| s.id), Some(SceneId(10)));
    assert_eq!(engine.skip().map(|s| s.id), Some(SceneId(11)));
    assert_eq!(engine.skip().map(|s| s.id), Some(SceneId(20)));
}

#[test]
fn full_session_serves_every_scene_once() {
    let mut engine = engine_with_draws(vec![0.2, 0.95, 0.6, 0.71, 0.1]);
    let choices = [
        effect(RouteCategory::Romance, 1),
        effect(RouteCategory::Mystery, 2),
        effect(RouteCategory::Action, 1),
        Choice::pass(),
    ];

    let mut i = 0;
    while engine.apply_choice(&choices[i % choices.len()]).is_some() {
        i += 1;
        assert!(i < 100, "session should terminate");
    }

    let total = engine.catalog().len();
    let unique: HashSet<SceneId> = engine.history().iter().copied().collect();
    assert_eq!(engine.history().len(), total);
    assert_eq!(unique.len(), total);
    for category in RouteCategory::ALL {
        assert_eq!(engine.remaining_in_track(category), 0);
    }
}

#[test]
fn score_accumulation_is_additive() {
    let mut engine = engine_with_draws(vec![0.9]);
    engine.apply_choice(&effect(RouteCategory::Romance, 2));
    engine.apply_choice(&Choice::new(
        "second",
        RouteEffects::new()
            .with(RouteCategory::Romance, 1)
            .with(RouteCategory::Friendship, -1),
    ));

    assert_eq!(engine.route_points().get(RouteCategory::Romance), 3);
    assert_eq!(engine.route_points().get(RouteCategory::Friendship), -1);
    assert_eq!(engine.choices_made(), 2);
}

#[test]
fn leading_route_tie_is_stable() {
    let mut engine = engine_with_draws(vec![0.9]);
    engine.apply_choice(&effect(RouteCategory::Friendship, 2));
    engine.apply_choice(&effect(RouteCategory::Romance, 2));

    let first = engine.leading_route();
    assert_eq!(first, Some(RouteCategory::Romance));
    for _ in 0..10 {
        assert_eq!(engine.leading_route(), first);
    }
}

#[test]
fn terminal_state_is_idempotent() {
    let mut engine = engine_with_draws(vec![0.5]);
    while engine.skip().is_some() {}

    assert!(engine.current_scene().is_none());
    assert_eq!(engine.phase(), AppPhase::Complete);
    for _ in 0..3 {
        assert!(engine.skip().is_none());
        assert!(engine.apply_choice(&effect(RouteCategory::Action, 1)).is_none());
    }
    assert!(engine.queue_snapshot().is_empty());
}

#[test]
fn reset_restores_initial_snapshot() {
    let mut engine = engine_with_draws(vec![0.3]);
    engine.set_player(PlayerUpdate::Name("Mika".to_string()));
    engine.set_player(PlayerUpdate::Age(21));
    engine.start().unwrap();
    engine.apply_choice(&effect(RouteCategory::Mystery, 3));
    engine.apply_choice(&effect(RouteCategory::Action, 1));

    engine.reset_all();

    assert!(engine.route_points().iter().all(|(_, score)| score == 0));
    assert_eq!(engine.choices_made(), 0);
    assert_eq!(engine.player(), &Player::default());
    let queued: Vec<SceneId> = engine.queue_snapshot().iter().map(|s| s.id).collect();
    assert_eq!(queued, vec![SceneId(1)]);
    assert_eq!(engine.phase(), AppPhase::Setup);
}

#[test]
fn action_leader_scenario() {
    let mut engine = engine_with_draws(vec![0.5]);
    let next = engine.apply_choice(&effect(RouteCategory::Action, 1)).map(|s| s.id);
    assert_eq!(engine.route_points().get(RouteCategory::Action), 1);
    assert_eq!(engine.leading_route(), Some(RouteCategory::Action));
    assert_eq!(next, Some(SceneId(40)));

    let mut engine = engine_with_draws(vec![0.8]);
    let next = engine.apply_choice(&effect(RouteCategory::Action, 1)).map(|s| s.id);
    assert_eq!(next, Some(SceneId(2)));
}

#[test]
fn playing_by_index_through_slides() {
    let mut engine = engine_with_draws(vec![0.1]);
    engine.set_player(PlayerUpdate::Name("Mika".to_string()));
    engine.start().unwrap();

    assert!(engine.available_choices().is_empty());
    engine.advance_slide();
    assert_eq!(engine.available_choices().len(), 3);

    // "Ask about the locked door" → mystery leads, draw 0.1 favours it
    let next = engine.choose(2).map(|s| s.id);
    assert_eq!(next, Some(SceneId(30)));
    assert_eq!(engine.leading_route(), Some(RouteCategory::Mystery));
    assert!(engine.story_state().flag("asked_about_door"));
    assert_eq!(engine.story_state().relationship("Mira"), 0);
}

#[test]
fn save_and_load_through_ron() {
    let mut engine = engine_with_draws(vec![0.4, 0.9]);
    engine.set_player(PlayerUpdate::Name("Mika".to_string()));
    engine.start().unwrap();
    engine.apply_choice(&effect(RouteCategory::Romance, 1));
    engine.apply_choice(&effect(RouteCategory::Romance, 1));
    engine.apply_effect(&StoryEffect::AdjustRelationship("Mira".to_string(), 3));
    engine.apply_effect(&StoryEffect::AddItem("spare key".to_string()));
    engine.pause();

    let saved = engine.snapshot().to_ron().unwrap();

    let mut loaded = engine_with_draws(vec![0.4, 0.9]);
    loaded
        .restore(SessionSnapshot::from_ron(&saved).unwrap())
        .unwrap();

    assert_eq!(loaded.phase(), AppPhase::Paused);
    assert_eq!(loaded.history(), engine.history());
    assert_eq!(
        loaded.current_scene().map(|s| s.id),
        engine.current_scene().map(|s| s.id)
    );
    assert_eq!(loaded.route_points(), engine.route_points());
    assert_eq!(loaded.choices_made(), 2);
    assert_eq!(loaded.story_state(), engine.story_state());
    assert_eq!(loaded.story_state().relationship("Mira"), 3);
}

#[test]
fn loading_a_repeated_queue_entry_is_refused() {
    let mut engine = engine_with_draws(vec![0.0]);
    let mut snapshot = engine.snapshot();
    snapshot.queued_scenes = vec![SceneId(1), SceneId(1)];
    assert!(engine.restore(snapshot).is_err());

    let mut served = Vec::new();
    while let Some(scene) = engine.current_scene() {
        served.push(scene.id);
        engine.skip();
    }
    let unique: HashSet<SceneId> = served.iter().copied().collect();
    assert_eq!(unique.len(), served.len());
    assert_eq!(served.len(), engine.catalog().len());
}

#[test]
fn catalog_dir_merges_files() {
    let engine = StoryEngine::builder()
        .catalog_dir("story_data/default")
        .seed(7)
        .build()
        .unwrap();
    assert_eq!(engine.current_scene().map(|s| s.title.as_str()), Some("Introduction"));
    assert_eq!(engine.catalog().track_len(RouteCategory::Main), 5);
}
