/// Festival Night example — plays the bundled story while always leaning
/// toward the romance route.
///
/// Shows slides, picks the choice that scores romance highest, saves a
/// snapshot halfway and resumes from it, then prints where the routes ended.
///
/// Run with: cargo run --example festival_night

use novel_engine::core::progression::StoryEngine;
use novel_engine::core::snapshot::SessionSnapshot;
use novel_engine::schema::player::PlayerUpdate;
use novel_engine::schema::route::RouteCategory;

const PREFERRED: RouteCategory = RouteCategory::Romance;

fn main() {
    let mut engine = StoryEngine::builder()
        .catalog_path("story_data/default/catalog.ron")
        .seed(2026)
        .build()
        .expect("Failed to build engine over the bundled story");

    engine.set_player(PlayerUpdate::Name("Yuki".to_string()));
    engine.start().expect("Player name is set");

    println!("=== Festival Night ===\n");

    let mut turns = 0;
    while let Some(scene) = engine.current_scene() {
        println!("--- [{}] {} ({}) ---", scene.id, scene.title, scene.category);
        loop {
            if let Some(slide) = engine.active_slide() {
                match &slide.speaker {
                    Some(speaker) => println!("{}: {}", speaker, slide.text),
                    None => println!("{}", slide.text),
                }
            }
            if !engine.advance_slide() {
                break;
            }
        }

        let pick = engine
            .available_choices()
            .iter()
            .enumerate()
            .max_by_key(|(i, c)| (c.route_effects.get(PREFERRED), std::cmp::Reverse(*i)))
            .map(|(i, c)| (i, c.text.clone()));
        match pick {
            Some((index, text)) => {
                println!("  > {}\n", text);
                engine.choose(index);
            }
            None => {
                println!("  (continue)\n");
                engine.skip();
            }
        }
        turns += 1;

        // Save and resume halfway through, as a host would between sessions
        if turns == 3 {
            let saved = engine.snapshot().to_ron().expect("Snapshot serializes");
            let mut resumed = StoryEngine::builder()
                .catalog_path("story_data/default/catalog.ron")
                .seed(2026)
                .build()
                .expect("Failed to rebuild engine");
            resumed
                .restore(SessionSnapshot::from_ron(&saved).expect("Snapshot parses"))
                .expect("Snapshot fits the catalog");
            println!("  [saved and resumed at {:?}]\n", resumed.current_scene().map(|s| s.id));
            engine = resumed;
        }
    }

    println!("=== The End ({}) ===", engine.phase().name());
    for (category, score) in engine.route_points().iter() {
        println!("  {:<10} {:>3}", category.name(), score);
    }
    match engine.leading_route() {
        Some(route) => println!("  Leading route: {}", route),
        None => println!("  Leading route: none"),
    }
    println!("  Aoi affinity: {}", engine.story_state().relationship("Aoi"));
    println!(
        "  Scenes seen: {}",
        engine
            .history()
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
}
