//! Level catalog: episodes and the builders that turn a run seed into level descriptors.

mod episode_one;
mod episode_three;
mod episode_two;
mod stations;

use tracing::debug;

use crate::config::GenerationConfig;
use crate::level::LevelData;
use crate::mapgen::level_rng;
use crate::types::LevelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Episode {
    pub name: &'static str,
    pub short_name: &'static str,
    pub start_level_index: usize,
    pub level_count: usize,
}

impl Episode {
    pub const fn contains(&self, level_index: usize) -> bool {
        level_index >= self.start_level_index && level_index < self.start_level_index + self.level_count
    }

    pub const fn last_level_index(&self) -> usize {
        self.start_level_index + self.level_count - 1
    }
}

pub const EPISODES: [Episode; 3] = [
    Episode { name: "Episode 1: The Cradle of Zeta", short_name: "Episode 1", start_level_index: 0, level_count: 4 },
    Episode { name: "Episode 2: The Number Line", short_name: "Episode 2", start_level_index: 4, level_count: 3 },
    Episode { name: "Episode 3: Logic Puzzles", short_name: "Episode 3", start_level_index: 7, level_count: 4 },
];

pub const LEVEL_COUNT: usize = 11;

pub fn episode_for_level(level_index: usize) -> Option<&'static Episode> {
    EPISODES.iter().find(|episode| episode.contains(level_index))
}

/// Index of the level that follows `level_index`, crossing into the next
/// episode when needed. `None` after the last level of the last episode.
pub fn next_level_index(level_index: usize) -> Option<usize> {
    let position = EPISODES.iter().position(|episode| episode.contains(level_index))?;
    let episode = &EPISODES[position];
    if level_index < episode.last_level_index() {
        return Some(level_index + 1);
    }
    EPISODES.get(position + 1).map(|next| next.start_level_index)
}

pub fn is_final_level(level_index: usize) -> bool {
    level_index < LEVEL_COUNT && next_level_index(level_index).is_none()
}

/// Builds level `level_index` from the run seed. Each level draws from its
/// own derived stream, so the same seed and index always yield the same level.
pub fn build_level(level_index: usize, run_seed: u64, config: &GenerationConfig) -> Result<LevelData, LevelError> {
    let mut rng = level_rng(run_seed, level_index);
    let rng = &mut rng;
    let level = match level_index {
        0 => episode_one::cradle(rng, config),
        1 => episode_one::twins(rng, config),
        2 => episode_one::inverted_crossing(rng, config),
        3 => episode_one::absolute_pressure(rng, config),
        4 => episode_two::number_line(rng, config),
        5 => episode_two::memory_challenge(rng, config),
        6 => episode_two::integer_synthesizer(rng, config),
        7 => episode_three::order_lab(rng, config),
        8 => episode_three::unit_vault(rng, config),
        9 => episode_three::logic_calibrators(rng, config),
        10 => episode_three::integer_assembler(),
        _ => return Err(LevelError::UnknownLevel(level_index)),
    };
    level.validate()?;
    debug!(level_index, title = %level.title, fingerprint = level.fingerprint(), "built level");
    Ok(level)
}
