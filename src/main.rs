//! # Pillars Main Entry Point
//!
//! Generates or loads a dungeon and runs a line-based game loop on stdin/stdout.

use clap::Parser;
use log::{error, info};
use pillars::{
    help_text, parse_command, seeded_dice, CombatState, Command, Direction, EngineConfig,
    GameEvent, GameMode, GameSession, HeroArchetype, InputHandler, MessageImportance, PillarsError,
    PillarsResult, RoomKind,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Command line arguments for the Pillars dungeon crawler.
#[derive(Parser, Debug)]
#[command(name = "pillars")]
#[command(about = "A turn-based dungeon crawler: find the four pillars and escape")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation and dice
    #[arg(short, long)]
    seed: Option<u64>,

    /// Dungeon width in rooms
    #[arg(long)]
    width: Option<u32>,

    /// Dungeon height in rooms
    #[arg(long)]
    height: Option<u32>,

    /// JSON engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resume a saved game instead of starting a new one
    #[arg(short, long)]
    load: Option<PathBuf>,

    /// Where `save` writes when no path is given
    #[arg(long, default_value = "pillars-save.json")]
    save: PathBuf,

    /// Hero name; asked for when missing
    #[arg(long)]
    name: Option<String>,

    /// Hero class (warrior, priestess, thief); asked for when missing
    #[arg(long)]
    class: Option<HeroArchetype>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> PillarsResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);
    info!("Starting Pillars v{}", pillars::VERSION);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    let mut session = match &args.load {
        Some(path) => GameSession::load_from_file(path)?,
        None => new_game(&args, &mut lines)?,
    };
    let seed = args.seed.unwrap_or(session.config().generation.seed);
    let mut dice = seeded_dice(seed.wrapping_add(1));
    let handler = InputHandler::new();

    println!("Type 'help' for commands.");
    if session.mode() == GameMode::Exploring {
        print_room(&session);
    }

    while !session.is_over() {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{}", describe_error(&err));
                continue;
            }
        };

        match handler.apply(&command, &mut session, &mut dice) {
            Ok(Some(events)) => {
                print_events(&events);
                if matches!(command, Command::Move(_)) && session.mode() == GameMode::Exploring {
                    print_room(&session);
                }
                if let Some(combat) = session.combat() {
                    if combat.state() == CombatState::Summary {
                        println!("(type 'continue' to leave the battle)");
                    } else {
                        print_foes(&session);
                    }
                }
            }
            Ok(None) => {
                if !show(&command, &session, &args) {
                    break;
                }
            }
            Err(err) => {
                if !err.is_invalid_action() {
                    error!("{}", err);
                }
                println!("{}", describe_error(&err));
            }
        }
    }

    if let Some(outcome) = session.outcome() {
        let stats = session.statistics();
        println!("\n=== {:?} ===", outcome);
        println!(
            "Steps {}  Monsters {}  Items {}  Pillars {}  Damage dealt {}  taken {}",
            stats.steps_taken,
            stats.monsters_defeated,
            stats.items_collected,
            stats.pillars_found,
            stats.damage_dealt,
            stats.damage_taken
        );
    }
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .format_timestamp(None)
        .init();
}

fn new_game(
    args: &Args,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> PillarsResult<GameSession> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.generation.seed = seed;
    }
    if let Some(width) = args.width {
        config.generation.width = width;
    }
    if let Some(height) = args.height {
        config.generation.height = height;
    }

    info!("Generating dungeon with seed {}", config.generation.seed);
    let mut session = GameSession::generate(config)?;
    println!("=== The Dungeon of the Four Pillars ===");
    session.start_creation()?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => prompt(lines, "Name your hero: ")?,
    };
    let class = match args.class {
        Some(class) => class,
        None => loop {
            let answer = prompt(lines, "Choose a class (warrior, priestess, thief): ")?;
            match answer.parse::<HeroArchetype>() {
                Ok(class) => break class,
                Err(err) => println!("{}", describe_error(&err)),
            }
        },
    };
    let events = session.create_hero(&name, class)?;
    print_events(&events);
    Ok(session)
}

fn prompt(
    lines: &mut impl Iterator<Item = io::Result<String>>,
    question: &str,
) -> PillarsResult<String> {
    print!("{}", question);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?.trim().to_string()),
        None => Err(PillarsError::InvalidState("input closed".to_string())),
    }
}

/// Handles a view-only command. Returns false when the player quits.
fn show(command: &Command, session: &GameSession, args: &Args) -> bool {
    match command {
        Command::Map => print_map(session),
        Command::Look => print_room(session),
        Command::Inventory => print_inventory(session),
        Command::Stats => print_stats(session),
        Command::Help => println!("{}", help_text(session.mode())),
        Command::Save(path) => {
            let path = path.as_ref().map(PathBuf::from).unwrap_or_else(|| args.save.clone());
            match session.save_to_file(&path) {
                Ok(()) => println!("Saved to {}.", path.display()),
                Err(err) => println!("Could not save: {}", err),
            }
        }
        Command::Quit => return false,
        _ => {}
    }
    true
}

fn describe_error(err: &PillarsError) -> String {
    match err {
        PillarsError::InvalidAction(message) => message.clone(),
        other => other.to_string(),
    }
}

fn print_events(events: &[GameEvent]) {
    for event in events {
        match event.importance() {
            MessageImportance::Critical => println!("*** {} ***", event),
            MessageImportance::Important => println!("! {}", event),
            MessageImportance::Normal => println!("{}", event),
        }
    }
}

fn print_room(session: &GameSession) {
    let Some(room) = session.current_room() else {
        return;
    };
    let label = match room.kind {
        RoomKind::Entrance => " (entrance)",
        RoomKind::Exit => " (exit)",
        RoomKind::Pit => " (pit)",
        RoomKind::Normal => "",
    };
    println!("You are in {}{}.", room.id, label);
    if !room.items.is_empty() {
        let items: Vec<String> = room.items.iter().map(ToString::to_string).collect();
        println!("On the floor: {}", items.join(", "));
    }
    let exits: Vec<String> = room.open_directions().iter().map(Direction::to_string).collect();
    println!("Exits: {}", exits.join(", "));
}

fn print_foes(session: &GameSession) {
    let (Some(combat), Some(room)) = (session.combat(), session.current_room()) else {
        return;
    };
    for (number, id) in combat.foes().iter().enumerate() {
        if let Some(monster) = room.monster(*id) {
            println!(
                "  {}. {} ({}/{} hp)",
                number + 1,
                monster.name(),
                monster.character.hp(),
                monster.character.max_hp()
            );
        }
    }
}

fn print_inventory(session: &GameSession) {
    let Some(hero) = session.hero() else {
        return;
    };
    if let Some(weapon) = hero.weapon() {
        println!("Wielding: {}", weapon.name);
    }
    if hero.inventory.is_empty() {
        println!("Your pack is empty.");
    }
    for (slot, item) in hero.inventory.items().iter().enumerate() {
        println!("  {}. {}", slot + 1, item);
    }
    println!(
        "Weight {}/{}",
        hero.inventory.total_weight(),
        hero.inventory.capacity()
    );
    let pillars: Vec<&str> = hero.pillars().iter().map(|pillar| pillar.name()).collect();
    println!("Pillars ({}/4): {}", pillars.len(), pillars.join(", "));
}

fn print_stats(session: &GameSession) {
    let Some(hero) = session.hero() else {
        return;
    };
    let character = &hero.character;
    println!(
        "{}  level {}  xp {}/{}",
        hero.name(),
        hero.level(),
        hero.xp(),
        hero.xp_to_next_level()
    );
    println!(
        "HP {}/{}  damage {}-{}  hit {}%  speed {}  block {}%",
        character.hp(),
        character.max_hp(),
        character.effective_min_damage(),
        character.effective_max_damage(),
        character.effective_hit_chance(),
        character.attack_speed(),
        hero.block_chance()
    );
}

/// Draws explored rooms on a grid: `@` hero, `X` exit, `o` pit, `.` other rooms.
fn print_map(session: &GameSession) {
    let coordinates = session.map_coordinates();
    let graph = session.graph();
    let here = session.current_room().map(|room| room.id.clone());

    let explored: Vec<_> = coordinates
        .iter()
        .filter_map(|(id, position)| {
            graph
                .get_room(id)
                .filter(|room| room.explored)
                .map(|room| (room, *position))
        })
        .collect();
    let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
        explored.iter().map(|(_, p)| p.x).min(),
        explored.iter().map(|(_, p)| p.x).max(),
        explored.iter().map(|(_, p)| p.y).min(),
        explored.iter().map(|(_, p)| p.y).max(),
    ) else {
        println!("Nothing explored yet.");
        return;
    };

    let columns = ((max_x - min_x) * 2 + 1) as usize;
    let rows = ((max_y - min_y) * 2 + 1) as usize;
    let mut canvas = vec![vec![' '; columns]; rows];
    for (room, position) in &explored {
        let column = ((position.x - min_x) * 2) as usize;
        let row = ((position.y - min_y) * 2) as usize;
        canvas[row][column] = if Some(&room.id) == here.as_ref() {
            '@'
        } else {
            match room.kind {
                RoomKind::Exit => 'X',
                RoomKind::Pit => 'o',
                RoomKind::Entrance => 'E',
                RoomKind::Normal => '.',
            }
        };
        if room.neighbor(Direction::East).is_some() && column + 1 < columns {
            canvas[row][column + 1] = '-';
        }
        if room.neighbor(Direction::South).is_some() && row + 1 < rows {
            canvas[row + 1][column] = '|';
        }
    }
    for row in canvas {
        println!("{}", row.into_iter().collect::<String>().trim_end());
    }
}
