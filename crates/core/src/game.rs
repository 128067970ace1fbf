use std::collections::BTreeSet;

use slotmap::SlotMap;
use tracing::info;

use crate::config::SessionConfig;
use crate::journal::InputPayload;
use crate::level::{Collectible, LevelData};
use crate::levels::build_level;
use crate::progression::{ProgressEvent, ProgressState, ProgressionController};
use crate::puzzle::{Occupancy, PuzzleSnapshot, evaluate};
use crate::types::{Cube, CubeId, CubeKey, Direction, GameError, Pos};

mod effects;
mod hash;
mod machines;
mod movement;

use effects::{Effect, EffectQueue};

pub const NEUTRALIZE_POINTS_PER_UNIT: u32 = 100;
pub const SYNTHESIS_BONUS: u32 = 150;
pub const PRIZE_BONUS: u32 = 500;
pub const LEVEL_BONUS: u32 = 1_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    /// Level won; input is paused until the congratulation delay elapses.
    Celebrating,
    Transitioning,
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Ignored,
    Blocked,
    Walked,
    Pushed { cube: CubeId },
    Neutralized { cubes: [CubeId; 2], score: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractOutcome {
    Ignored,
    Nothing,
    Rebounded { cube: CubeId, to: Pos },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelEntered { index: usize },
    CubeDispensed { id: CubeId, at: Pos },
    CubesNeutralized { ids: [CubeId; 2] },
    CubeInverted { id: CubeId },
    SynthesisStarted { synthesizer: String, output: CubeId },
    CubeSynthesized { id: CubeId, value: i32 },
    ConversionStarted { ids: Vec<CubeId> },
    ConversionFinished { ids: Vec<CubeId> },
    PrizeCollected { id: u32 },
    KeyCollected,
    Progress(ProgressEvent),
    LevelWon { index: usize },
    RunFinished { score: u32 },
}

pub struct Game {
    seed: u64,
    config: SessionConfig,
    level_index: usize,
    level: LevelData,
    cubes: SlotMap<CubeKey, Cube>,
    next_cube_id: u32,
    player: Pos,
    score: u32,
    level_start_score: u32,
    clock_ms: u64,
    effects: EffectQueue,
    converting: BTreeSet<CubeId>,
    prizes: Vec<Collectible>,
    key: Option<Collectible>,
    has_key: bool,
    progress: ProgressState,
    snapshot: PuzzleSnapshot,
    status: SessionStatus,
    log: Vec<GameEvent>,
}

impl Game {
    /// Starts a run at the first level.
    pub fn new(seed: u64, config: SessionConfig) -> Result<Self, GameError> {
        Self::with_level(seed, config, 0)
    }

    pub fn with_level(seed: u64, config: SessionConfig, level_index: usize) -> Result<Self, GameError> {
        let level = build_level(level_index, seed, &config.generation)?;
        Ok(Self::install(seed, config, level_index, level))
    }

    /// Starts a session on a prebuilt descriptor. `level_index` decides which
    /// level follows and whether the final congratulation delay applies.
    pub fn from_level(
        seed: u64,
        config: SessionConfig,
        level_index: usize,
        level: LevelData,
    ) -> Result<Self, GameError> {
        level.validate()?;
        Ok(Self::install(seed, config, level_index, level))
    }

    fn install(seed: u64, config: SessionConfig, level_index: usize, level: LevelData) -> Self {
        let mut game = Self {
            seed,
            config,
            level_index,
            player: level.player_start,
            level,
            cubes: SlotMap::with_key(),
            next_cube_id: 1,
            score: 0,
            level_start_score: 0,
            clock_ms: 0,
            effects: EffectQueue::default(),
            converting: BTreeSet::new(),
            prizes: Vec::new(),
            key: None,
            has_key: false,
            progress: ProgressState::default(),
            snapshot: PuzzleSnapshot::default(),
            status: SessionStatus::Playing,
            log: Vec::new(),
        };
        game.reset_level();
        game
    }

    fn load_level(&mut self, level_index: usize, level: LevelData) {
        self.level_index = level_index;
        self.level = level;
        self.reset_level();
    }

    /// Resets every per-level field from the current descriptor. The score
    /// carried into the level becomes the restart checkpoint.
    fn reset_level(&mut self) {
        self.cubes = SlotMap::with_key();
        for cube in &self.level.cubes {
            self.cubes.insert(cube.clone());
        }
        self.next_cube_id = self.level.next_free_cube_id();
        self.player = self.level.player_start;
        self.prizes = self.level.prizes.clone();
        self.key = self.level.key;
        self.has_key = false;
        self.effects.clear();
        self.converting.clear();
        self.level_start_score = self.score;
        self.status = SessionStatus::Playing;

        self.run_dispensers();
        self.snapshot = evaluate(&self.level, self.cubes.values());
        let occupancy = Occupancy::new(self.cubes.values());
        let controller = ProgressionController::new(&self.level);
        // The loaded configuration is the baseline: nothing is awarded for it.
        let baseline =
            controller.update(&ProgressState::default(), Some(&self.snapshot), &self.snapshot, &occupancy);
        self.progress = baseline.state;

        info!(
            level_index = self.level_index,
            title = %self.level.title,
            fingerprint = self.level.fingerprint(),
            "level loaded"
        );
        self.log.push(GameEvent::LevelEntered { index: self.level_index });
    }

    /// Reloads the current level and restores the score it started with.
    pub fn restart_level(&mut self) -> Result<(), GameError> {
        if self.status != SessionStatus::Playing {
            return Err(GameError::Paused);
        }
        self.score = self.level_start_score;
        info!(level_index = self.level_index, score = self.score, "level restarted");
        self.reset_level();
        Ok(())
    }

    /// Applies one journaled input.
    pub fn apply_input(&mut self, payload: &InputPayload) -> Result<(), GameError> {
        match payload {
            InputPayload::Move { direction } => {
                self.apply_move(*direction);
            }
            InputPayload::Interact => {
                self.interact();
            }
            InputPayload::Restart => self.restart_level()?,
            InputPayload::AdvanceClock { ms } => self.advance_clock(*ms)?,
        }
        Ok(())
    }

    pub fn final_score(&self) -> Result<u32, GameError> {
        if self.status != SessionStatus::Finished {
            return Err(GameError::NotFinished);
        }
        Ok(self.score)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.status != SessionStatus::Playing
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn phase(&self) -> u8 {
        self.progress.phase
    }

    pub fn puzzle_snapshot(&self) -> &PuzzleSnapshot {
        &self.snapshot
    }

    pub fn objective(&self) -> Option<&str> {
        self.level.objective(self.progress.phase)
    }

    /// Live cubes ordered by id, evaporating ones included.
    pub fn cubes(&self) -> Vec<&Cube> {
        let mut cubes: Vec<&Cube> = self.cubes.values().collect();
        cubes.sort_by_key(|cube| cube.id);
        cubes
    }

    pub fn cube(&self, id: CubeId) -> Option<&Cube> {
        self.cubes.values().find(|cube| cube.id == id)
    }

    pub fn revealed_cube_ids(&self) -> &BTreeSet<CubeId> {
        &self.snapshot.revealed_cubes
    }

    pub fn prizes(&self) -> &[Collectible] {
        &self.prizes
    }

    pub fn has_key(&self) -> bool {
        self.has_key
    }

    pub fn pending_effects(&self) -> usize {
        self.effects.len()
    }

    pub fn log(&self) -> &[GameEvent] {
        &self.log
    }

    fn allocate_cube_id(&mut self) -> CubeId {
        let id = CubeId(self.next_cube_id);
        self.next_cube_id += 1;
        id
    }

    fn schedule(&mut self, delay_ms: u64, effect: Effect) {
        self.effects.schedule(self.clock_ms + delay_ms, effect);
    }
}

#[cfg(test)]
mod tests;
