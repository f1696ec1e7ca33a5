/// Catalog Linter — validates scene catalogs and reports route coverage.
///
/// Usage: catalog_linter <catalog_file_or_dir>

use novel_engine::core::catalog::SceneCatalog;
use novel_engine::schema::route::RouteCategory;
use novel_engine::schema::story_state::StoryEffect;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: catalog_linter <catalog_file_or_dir>");
        process::exit(0);
    }

    let catalog_path = Path::new(&args[1]);
    let mut catalog = SceneCatalog::default();
    let mut load_errors = Vec::new();

    if catalog_path.is_file() {
        match SceneCatalog::load_from_ron(catalog_path) {
            Ok(c) => {
                if let Err(e) = catalog.merge(c) {
                    load_errors.push(format!("{}: {}", catalog_path.display(), e));
                }
            }
            Err(e) => {
                eprintln!("ERROR: Failed to load catalog file: {}", e);
                process::exit(1);
            }
        }
    } else if catalog_path.is_dir() {
        load_catalogs_recursive(catalog_path, &mut catalog, &mut load_errors);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    println!("Loaded {} scenes", catalog.len());

    let (mut errors, warnings) = lint_catalog(&catalog);
    errors.extend(load_errors);

    println!("\n=== Catalog Lint Report ===\n");

    for category in RouteCategory::ALL {
        let track = catalog.track(category);
        let slides: usize = track.iter().map(|s| s.slide_count()).sum();
        println!(
            "  {:<10} {:>3} scenes {:>4} slides",
            category.name(),
            track.len(),
            slides
        );
    }
    println!();

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_catalogs_recursive(dir: &Path, catalog: &mut SceneCatalog, errors: &mut Vec<String>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(format!("{}: cannot read directory: {}", dir.display(), e));
            return;
        }
    };
    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            load_catalogs_recursive(&path, catalog, errors);
        } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
            match SceneCatalog::load_from_ron(&path) {
                Ok(c) => {
                    println!("  Loaded: {}", path.display());
                    if let Err(e) = catalog.merge(c) {
                        errors.push(format!("{}: {}", path.display(), e));
                    }
                }
                Err(e) => {
                    errors.push(format!("{}: {}", path.display(), e));
                }
            }
        }
    }
}

fn lint_catalog(catalog: &SceneCatalog) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if let Err(e) = catalog.validate() {
        errors.push(e.to_string());
    }

    // Coverage: a side route with no scenes can never pay off its points
    let mut scored: FxHashSet<RouteCategory> = FxHashSet::default();
    for scene in catalog.scenes() {
        for choice in scene.choices() {
            for (category, delta) in choice.route_effects.iter() {
                if delta > 0 {
                    scored.insert(category);
                }
                if category.is_main() {
                    warnings.push(format!(
                        "Scene {} choice '{}' scores the main route, which never leads",
                        scene.id, choice.text
                    ));
                }
            }
        }
    }

    for category in RouteCategory::SIDE {
        let len = catalog.track_len(category);
        if len == 0 && scored.contains(&category) {
            errors.push(format!(
                "Choices award {} points but the {} track has no scenes",
                category, category
            ));
        } else if len == 0 {
            warnings.push(format!("Track '{}' has no scenes", category));
        } else if len == 1 {
            warnings.push(format!("Track '{}' has only 1 scene", category));
        }
        if len > 0 && !scored.contains(&category) {
            warnings.push(format!(
                "Track '{}' has scenes but no choice ever raises it, so it only plays as filler",
                category
            ));
        }
    }

    for scene in catalog.scenes() {
        if scene.title.trim().is_empty() {
            warnings.push(format!("Scene {} has no title", scene.id));
        }
        if let Some(slide) = scene.slides.iter().find(|s| s.text.trim().is_empty()) {
            warnings.push(format!(
                "Scene {} has an empty slide{}",
                scene.id,
                slide
                    .speaker
                    .as_ref()
                    .map(|s| format!(" for speaker '{}'", s))
                    .unwrap_or_default()
            ));
        }
        for choice in scene.choices() {
            for effect in &choice.effects {
                if let StoryEffect::AdjustRelationship(character, _)
                | StoryEffect::SetRelationship(character, _) = effect
                {
                    if !scene.characters.contains(character) {
                        warnings.push(format!(
                            "Scene {} choice '{}' changes the relationship with '{}', who is not in the scene",
                            scene.id, choice.text, character
                        ));
                    }
                }
            }
        }
        if scene.choices().len() == 1 {
            warnings.push(format!(
                "Scene {} offers a single choice; consider a narration ending instead",
                scene.id
            ));
        }
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_directory_is_an_error() {
        let mut catalog = SceneCatalog::default();
        let mut errors = Vec::new();
        load_catalogs_recursive(
            Path::new("tests/fixtures/no_such_dir"),
            &mut catalog,
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("cannot read directory"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn directory_loads_ron_files() {
        let mut catalog = SceneCatalog::default();
        let mut errors = Vec::new();
        load_catalogs_recursive(Path::new("tests/fixtures"), &mut catalog, &mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(catalog.len(), 9);
    }

    #[test]
    fn relationship_with_absent_character_warns() {
        let catalog = SceneCatalog::parse_ron(
            r#"{
                main: [
                    Scene(
                        id: 1,
                        title: "Alone",
                        characters: ["Kai"],
                        slides: [(
                            text: "Nobody else is here.",
                            choices: [
                                (text: "Wave", effects: [AdjustRelationship("Mira", 1)]),
                                (text: "Nod", effects: [AdjustRelationship("Kai", 1)]),
                            ],
                        )],
                    ),
                ],
            }"#,
        )
        .unwrap();
        let (errors, warnings) = lint_catalog(&catalog);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(
            warnings.iter().filter(|w| w.contains("'Mira'")).count(),
            1
        );
        assert!(!warnings.iter().any(|w| w.contains("'Kai'")));
    }
}
