use thiserror::Error;

use crate::config::SessionConfig;
use crate::game::{Game, SessionStatus};
use crate::journal::InputJournal;
use crate::types::GameError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    #[error("could not start the run: {0}")]
    Start(GameError),
    #[error("journal was recorded against level content {recorded:#018x}, this build produces {actual:#018x}")]
    ContentMismatch { recorded: u64, actual: u64 },
    #[error("input {seq} was rejected: {source}")]
    Rejected { seq: u64, source: GameError },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_snapshot_hash: u64,
    pub final_score: u32,
    pub final_level_index: usize,
    pub final_clock_ms: u64,
    pub finished: bool,
}

impl ReplayResult {
    pub fn of(game: &Game) -> Self {
        Self {
            final_snapshot_hash: game.snapshot_hash(),
            final_score: game.score(),
            final_level_index: game.level_index(),
            final_clock_ms: game.clock_ms(),
            finished: game.status() == SessionStatus::Finished,
        }
    }
}

/// Feeds every journaled input to a fresh run started from the journal seed.
pub fn replay_to_end(config: &SessionConfig, journal: &InputJournal) -> Result<ReplayResult, ReplayError> {
    let mut game = Game::new(journal.seed, config.clone()).map_err(ReplayError::Start)?;
    let actual = game.level().fingerprint();
    if journal.content_hash != 0 && journal.content_hash != actual {
        return Err(ReplayError::ContentMismatch { recorded: journal.content_hash, actual });
    }
    for record in &journal.inputs {
        game.apply_input(&record.payload)
            .map_err(|source| ReplayError::Rejected { seq: record.seq, source })?;
    }
    Ok(ReplayResult::of(&game))
}

#[cfg(test)]
mod tests;
