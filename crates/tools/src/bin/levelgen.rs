use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use game_core::mapgen::flood::floor_count;
use game_core::mapgen::{RoomBounds, stranded_floor_count};
use game_core::{EPISODES, LEVEL_COUNT, LevelData, build_level, episode_for_level};
use zeta_tools::{init_tracing, load_session_config};

#[derive(Parser)]
#[command(author, version, about = "Prints generated levels with room reachability stats", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Zero-based level index; prints the whole catalog when omitted
    #[arg(short, long)]
    level: Option<usize>,
    /// Optional TOML session config; only its generation table is used
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides `generation.shapes_per_room` from the config
    #[arg(long)]
    shapes_per_room: Option<usize>,
    /// Overrides `generation.placement_attempts` from the config
    #[arg(long)]
    placement_attempts: Option<usize>,
    /// Stats only, without the rendered grid
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn print_level(index: usize, level: &LevelData, quiet: bool) {
    let episode = episode_for_level(index).map_or("?", |episode| episode.short_name);
    println!("== [{episode}] {} ({}) ==", level.title, level.short_title);
    println!("fingerprint {:#018x}, {} cubes, {} prizes", level.fingerprint(), level.cubes.len(), level.prizes.len());
    for room in 0..level.grid.room_count() {
        let bounds = RoomBounds::for_room(room);
        println!(
            "  room {room}: {} floor, {} stranded",
            floor_count(&level.grid, bounds),
            stranded_floor_count(&level.grid, bounds)
        );
    }
    if !quiet {
        println!("{}", level.grid.render());
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut generation = load_session_config(args.config.as_deref())?.generation;
    if let Some(shapes) = args.shapes_per_room {
        generation.shapes_per_room = shapes;
    }
    if let Some(attempts) = args.placement_attempts {
        generation.placement_attempts = attempts;
    }

    let indices: Vec<usize> = match args.level {
        Some(index) if index >= LEVEL_COUNT => bail!("level {index} is out of range (0..{LEVEL_COUNT})"),
        Some(index) => vec![index],
        None => (0..LEVEL_COUNT).collect(),
    };

    println!("{} episodes, {LEVEL_COUNT} levels, run seed {}", EPISODES.len(), args.seed);
    for index in indices {
        let level = build_level(index, args.seed, &generation)?;
        print_level(index, &level, args.quiet);
    }
    Ok(())
}
