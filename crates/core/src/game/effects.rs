//! Delayed effects on the session clock: evaporation, inversion, synthesis,
//! mass conversion and the level-won pause.

use std::collections::BTreeMap;

use super::*;
use crate::levels::{is_final_level, next_level_index};
use crate::types::CubeStatus;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Effect {
    RemoveCubes { ids: Vec<CubeId> },
    InvertCube { id: CubeId },
    Synthesize { inputs: [CubeId; 2], output: Cube },
    FinishConversion { ids: Vec<CubeId> },
    ReleaseConversion { ids: Vec<CubeId> },
    EndCelebration,
    EnterLevel { index: usize },
}

/// Effects keyed by due time, then by scheduling order.
#[derive(Clone, Debug, Default)]
pub(super) struct EffectQueue {
    pending: BTreeMap<(u64, u64), Effect>,
    next_seq: u64,
}

impl EffectQueue {
    pub(super) fn schedule(&mut self, due_ms: u64, effect: Effect) {
        self.pending.insert((due_ms, self.next_seq), effect);
        self.next_seq += 1;
    }

    pub(super) fn pop_due(&mut self, now_ms: u64) -> Option<(u64, Effect)> {
        let (&(due_ms, _), _) = self.pending.first_key_value()?;
        if due_ms > now_ms {
            return None;
        }
        self.pending.pop_first().map(|((due_ms, _), effect)| (due_ms, effect))
    }

    pub(super) fn clear(&mut self) {
        self.pending.clear();
    }

    pub(super) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(super) fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.pending.values()
    }
}

impl Game {
    /// Moves the clock forward by `ms`, resolving every effect that falls due
    /// in order. Effects scheduled while resolving run in the same call when
    /// they are due before the new time.
    pub fn advance_clock(&mut self, ms: u64) -> Result<(), GameError> {
        let target = self.clock_ms + ms;
        while let Some((due_ms, effect)) = self.effects.pop_due(target) {
            self.clock_ms = self.clock_ms.max(due_ms);
            self.resolve(effect)?;
        }
        self.clock_ms = target;
        Ok(())
    }

    fn resolve(&mut self, effect: Effect) -> Result<(), GameError> {
        match effect {
            Effect::RemoveCubes { ids } => {
                self.cubes.retain(|_, cube| !ids.contains(&cube.id));
            }
            Effect::InvertCube { id } => {
                if let Some(cube) = self.cubes.values_mut().find(|cube| cube.id == id) {
                    cube.invert();
                    self.log.push(GameEvent::CubeInverted { id });
                }
            }
            Effect::Synthesize { inputs, output } => {
                self.cubes.retain(|_, cube| !inputs.contains(&cube.id));
                self.log.push(GameEvent::CubeSynthesized { id: output.id, value: output.value });
                self.cubes.insert(output);
            }
            Effect::FinishConversion { ids } => {
                for cube in self.cubes.values_mut().filter(|cube| ids.contains(&cube.id)) {
                    cube.invert();
                    cube.status = CubeStatus::Active;
                }
                self.log.push(GameEvent::ConversionFinished { ids: ids.clone() });
                self.schedule(self.config.converter_cooldown_ms, Effect::ReleaseConversion { ids });
            }
            Effect::ReleaseConversion { ids } => {
                self.converting.retain(|id| !ids.contains(id));
            }
            Effect::EndCelebration => {
                self.score = self.score.saturating_add(LEVEL_BONUS);
                match next_level_index(self.level_index) {
                    Some(index) => {
                        self.status = SessionStatus::Transitioning;
                        self.schedule(self.config.transition_ms, Effect::EnterLevel { index });
                    }
                    None => {
                        self.status = SessionStatus::Finished;
                        info!(score = self.score, "run finished");
                        self.log.push(GameEvent::RunFinished { score: self.score });
                    }
                }
                return Ok(());
            }
            Effect::EnterLevel { index } => {
                let level = build_level(index, self.seed, &self.config.generation)?;
                info!(from = self.level_index, to = index, "level transition");
                self.load_level(index, level);
                return Ok(());
            }
        }
        self.settle();
        Ok(())
    }

    /// Cells a pending effect will fill: synthesizer outputs and cubes that
    /// are mid-conversion.
    pub(super) fn reserved_cells(&self) -> BTreeSet<Pos> {
        let mut cells = BTreeSet::new();
        for effect in self.effects.iter() {
            match effect {
                Effect::Synthesize { output, .. } => {
                    cells.insert(output.position);
                }
                Effect::FinishConversion { ids } => {
                    cells.extend(
                        self.cubes.values().filter(|cube| ids.contains(&cube.id)).map(|cube| cube.position),
                    );
                }
                _ => {}
            }
        }
        cells
    }

    pub(super) fn celebrate(&mut self) {
        self.status = SessionStatus::Celebrating;
        let delay = if is_final_level(self.level_index) {
            self.config.final_congratulation_ms
        } else {
            self.config.congratulation_ms
        };
        info!(level_index = self.level_index, score = self.score, "level won");
        self.log.push(GameEvent::LevelWon { index: self.level_index });
        self.schedule(delay, Effect::EndCelebration);
    }
}
