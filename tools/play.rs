/// Play — interactive shell for stepping through a story catalog.
///
/// Usage: play --catalog <path> [--seed <n>] [--leader-weight <w>]
///
/// Commands:
///   look              — show the current slide and any choices
///   next / back       — move between slides of the current scene
///   choose <n>        — pick choice n (1-based) on the final slide
///   skip              — move to the next scene without scoring
///   points            — show route points and the leading route
///   queue             — show pending scenes and remaining track content
///   state             — show relationships, flags, variables and items
///   name <name>       — set the player name
///   age <n>           — set the player age
///   start             — leave setup and begin playing
///   pause / menu / resume
///   save <path>       — write a RON snapshot
///   load <path>       — restore a RON snapshot
///   reset             — start over
///   seed <n>          — rebuild the engine with a new seed
///   help              — list commands
///   quit              — exit

use novel_engine::core::catalog::SceneCatalog;
use novel_engine::core::progression::StoryEngine;
use novel_engine::core::queue::DEFAULT_LEADER_WEIGHT;
use novel_engine::core::snapshot::SessionSnapshot;
use novel_engine::schema::player::PlayerUpdate;
use novel_engine::schema::route::RouteCategory;
use novel_engine::schema::story_state::StoryState;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut catalog_path = None;
    let mut seed: u64 = 42;
    let mut leader_weight = DEFAULT_LEADER_WEIGHT;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" if i + 1 < args.len() => {
                i += 1;
                catalog_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--leader-weight" if i + 1 < args.len() => {
                i += 1;
                leader_weight = args[i].parse().unwrap_or(DEFAULT_LEADER_WEIGHT);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(catalog_path) = catalog_path else {
        eprintln!("ERROR: --catalog is required");
        std::process::exit(1);
    };

    let catalog = match SceneCatalog::load_from_ron(Path::new(&catalog_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: Failed to load catalog: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} scenes", catalog.len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let mut current_seed = seed;
    let mut engine = match build_engine(catalog.clone(), current_seed, leader_weight) {
        Some(e) => e,
        None => std::process::exit(1),
    };
    print_current(&engine);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("play> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();
        let rest = parts[1..].join(" ");

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "look" | "l" => {
                print_current(&engine);
            }
            "next" | "n" => {
                if engine.advance_slide() {
                    print_current(&engine);
                } else {
                    println!("This is the last slide. Choose an option or 'skip'.");
                }
            }
            "back" | "b" => {
                if engine.previous_slide() {
                    print_current(&engine);
                } else {
                    println!("Already at the first slide.");
                }
            }
            "choose" | "c" => {
                let index = match parts.get(1).and_then(|s| s.parse::<usize>().ok()) {
                    Some(n) if n > 0 => n - 1,
                    _ => {
                        println!("Usage: choose <n>");
                        continue;
                    }
                };
                if index >= engine.available_choices().len() {
                    println!("No choice {} here.", index + 1);
                    continue;
                }
                engine.choose(index);
                print_current(&engine);
            }
            "skip" | "s" => {
                engine.skip();
                print_current(&engine);
            }
            "points" | "p" => {
                for (category, score) in engine.route_points().iter() {
                    println!("  {:<10} {:>4}", category.name(), score);
                }
                match engine.leading_route() {
                    Some(c) => println!("  Leading route: {}", c),
                    None => println!("  Leading route: none"),
                }
                println!("  Choices made: {}", engine.choices_made());
            }
            "state" => {
                print_story_state(engine.story_state());
            }
            "queue" => {
                let queued = engine.queue_snapshot();
                if queued.is_empty() {
                    println!("  Queue is empty.");
                }
                for scene in &queued {
                    println!("  {} {} ({})", scene.id, scene.title, scene.category);
                }
                for category in RouteCategory::ALL {
                    println!(
                        "  {:<10} {} remaining",
                        category.name(),
                        engine.remaining_in_track(category)
                    );
                }
            }
            "name" => {
                if rest.is_empty() {
                    println!("Current name: '{}'", engine.player().name);
                    continue;
                }
                engine.set_player(PlayerUpdate::Name(rest.clone()));
                println!("Name set to '{}'", engine.player().name);
            }
            "age" => match parts.get(1).and_then(|s| s.parse::<u32>().ok()) {
                Some(age) => {
                    engine.set_player(PlayerUpdate::Age(age));
                    println!("Age set to {}", age);
                }
                None => println!("Current age: {}", engine.player().age),
            },
            "start" => match engine.start() {
                Ok(()) => println!("Phase: {}", engine.phase().name()),
                Err(e) => println!("ERROR: {}", e),
            },
            "pause" => {
                engine.pause();
                println!("Phase: {}", engine.phase().name());
            }
            "menu" => {
                engine.open_menu();
                println!("Phase: {}", engine.phase().name());
            }
            "resume" => {
                engine.resume();
                println!("Phase: {}", engine.phase().name());
            }
            "save" => {
                if rest.is_empty() {
                    println!("Usage: save <path>");
                    continue;
                }
                match engine.snapshot().to_ron() {
                    Ok(text) => match std::fs::write(&rest, text) {
                        Ok(()) => println!("Saved to {}", rest),
                        Err(e) => println!("ERROR: {}", e),
                    },
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "load" => {
                if rest.is_empty() {
                    println!("Usage: load <path>");
                    continue;
                }
                let loaded = std::fs::read_to_string(&rest)
                    .map_err(|e| e.to_string())
                    .and_then(|text| SessionSnapshot::from_ron(&text).map_err(|e| e.to_string()))
                    .and_then(|snapshot| engine.restore(snapshot).map_err(|e| e.to_string()));
                match loaded {
                    Ok(()) => {
                        println!("Loaded {}", rest);
                        print_current(&engine);
                    }
                    Err(e) => println!("ERROR: {}", e),
                }
            }
            "reset" => {
                engine.reset_all();
                println!("Story reset.");
                print_current(&engine);
            }
            "seed" => {
                if parts.len() < 2 {
                    println!("Current seed: {}", current_seed);
                    continue;
                }
                match parts[1].parse::<u64>() {
                    Ok(s) => {
                        if let Some(e) = build_engine(catalog.clone(), s, leader_weight) {
                            current_seed = s;
                            engine = e;
                            println!("Seed set to {}. Story restarted.", current_seed);
                        }
                    }
                    Err(_) => {
                        println!("Invalid seed: {}", parts[1]);
                    }
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn build_engine(catalog: SceneCatalog, seed: u64, leader_weight: f64) -> Option<StoryEngine> {
    match StoryEngine::builder()
        .with_catalog(catalog)
        .seed(seed)
        .leader_weight(leader_weight)
        .build()
    {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("ERROR: {}", e);
            None
        }
    }
}

fn print_current(engine: &StoryEngine) {
    let Some(scene) = engine.current_scene() else {
        println!("\n--- The End ---");
        println!("Choices made: {}", engine.choices_made());
        if let Some(route) = engine.leading_route() {
            println!("Your story leaned {}.", route);
        }
        println!();
        return;
    };

    println!(
        "\n[{}] {} — slide {}/{}",
        scene.category,
        scene.title,
        engine.slide_index() + 1,
        scene.slide_count()
    );
    if let Some(slide) = engine.active_slide() {
        match &slide.speaker {
            Some(speaker) => println!("{}: {}", speaker, slide.text),
            None => println!("{}", slide.text),
        }
    }
    for (i, choice) in engine.available_choices().iter().enumerate() {
        println!("  {}. {}", i + 1, choice.text);
    }
    println!();
}

fn print_usage() {
    println!("Usage: play --catalog <path> [--seed <n>] [--leader-weight <w>]");
}

fn print_story_state(state: &StoryState) {
    if state.is_empty() {
        println!("  Nothing recorded yet.");
        return;
    }
    let mut relationships: Vec<_> = state.relationships.iter().collect();
    relationships.sort();
    for (character, value) in relationships {
        println!("  {:<16} {:>4}", character, value);
    }
    let mut flags: Vec<_> = state.flags.iter().filter(|(_, set)| **set).collect();
    flags.sort();
    for (flag, _) in flags {
        println!("  flag: {}", flag);
    }
    let mut variables: Vec<_> = state.variables.iter().collect();
    variables.sort();
    for (name, value) in variables {
        println!("  {} = {}", name, value);
    }
    if !state.inventory.is_empty() {
        println!("  Items: {}", state.inventory.join(", "));
    }
}

fn print_help() {
    println!("Commands:");
    println!("  look              show the current slide and any choices");
    println!("  next / back       move between slides of the current scene");
    println!("  choose <n>        pick choice n on the final slide");
    println!("  skip              move on without scoring");
    println!("  points            route points and the leading route");
    println!("  queue             pending scenes and remaining content");
    println!("  state             relationships, flags, variables, items");
    println!("  name <name>       set the player name");
    println!("  age <n>           set the player age");
    println!("  start             leave setup and begin playing");
    println!("  pause | menu | resume");
    println!("  save <path>       write a RON snapshot");
    println!("  load <path>       restore a RON snapshot");
    println!("  reset             start over");
    println!("  seed <n>          rebuild with a new seed");
    println!("  quit              exit");
}
