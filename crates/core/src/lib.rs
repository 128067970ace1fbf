pub mod config;
pub mod game;
pub mod journal;
pub mod journal_file;
pub mod level;
pub mod levels;
pub mod mapgen;
pub mod progression;
pub mod puzzle;
pub mod replay;
pub mod types;

pub use config::{GenerationConfig, SessionConfig};
pub use game::{Game, GameEvent, InteractOutcome, MoveOutcome, SessionStatus};
pub use journal::{InputJournal, InputPayload, InputRecord};
pub use level::{Collectible, LevelData};
pub use levels::{EPISODES, Episode, LEVEL_COUNT, build_level, episode_for_level, is_final_level, next_level_index};
pub use progression::{ProgressEvent, ProgressState, ProgressionController};
pub use puzzle::{PuzzleSnapshot, evaluate};
pub use replay::{ReplayError, ReplayResult, replay_to_end};
pub use types::*;
