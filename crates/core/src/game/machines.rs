//! Reactions that run after every state change: dispensers, synthesizers,
//! mass converters, then the evaluator and progression step.

use tracing::debug;

use super::*;
use crate::types::{CubeStatus, TileKind};

impl Game {
    /// Settles the world after an input or a resolved effect.
    pub(super) fn settle(&mut self) {
        if self.status == SessionStatus::Playing {
            self.run_dispensers();
            self.start_synthesis();
            self.start_conversions();
        }
        let won = self.refresh_progress();
        if won && self.status == SessionStatus::Playing {
            self.celebrate();
        }
    }

    /// Every dispenser whose output cell is free drops a fresh unit cube.
    pub(super) fn run_dispensers(&mut self) {
        let grid = &self.level.grid;
        let outputs: Vec<(Pos, i32)> = grid
            .positions()
            .filter_map(|pos| {
                let tile = grid.tile_at(pos);
                Some((tile.dispenser_output(pos)?, tile.dispensed_value()?))
            })
            .collect();
        if outputs.is_empty() {
            return;
        }
        let reserved = self.reserved_cells();
        for (at, value) in outputs {
            if at == self.player || reserved.contains(&at) || self.cube_at(at).is_some() {
                continue;
            }
            let id = self.allocate_cube_id();
            self.cubes.insert(Cube::new(id.0, value, at));
            self.log.push(GameEvent::CubeDispensed { id, at });
        }
    }

    fn start_synthesis(&mut self) {
        let reserved = self.reserved_cells();
        let ready: Vec<(String, CubeKey, CubeKey, Pos)> = self
            .level
            .synthesizers
            .iter()
            .filter(|synth| synth.output != self.player && !reserved.contains(&synth.output))
            .filter(|synth| self.cube_at(synth.output).is_none())
            .filter_map(|synth| {
                let a = self.cube_key_at(synth.slot_a)?;
                let b = self.cube_key_at(synth.slot_b)?;
                Some((synth.id.clone(), a, b, synth.output))
            })
            .collect();

        for (synthesizer, a, b, output_pos) in ready {
            let value = self.cubes[a].value.saturating_add(self.cubes[b].value);
            let inputs = [self.cubes[a].id, self.cubes[b].id];
            self.cubes[a].status = CubeStatus::Evaporating;
            self.cubes[b].status = CubeStatus::Evaporating;
            let id = self.allocate_cube_id();
            self.score = self.score.saturating_add(SYNTHESIS_BONUS);
            debug!(%synthesizer, value, "synthesis started");
            self.log.push(GameEvent::SynthesisStarted { synthesizer, output: id });
            let output = Cube::new(id.0, value, output_pos);
            self.schedule(self.config.evaporation_ms, Effect::Synthesize { inputs, output });
        }
    }

    /// Non-zero cubes resting on a converter vanish and come back inverted.
    /// A converted cube is not picked up again until its cooldown ends.
    fn start_conversions(&mut self) {
        let converters = self.level.grid.positions_of(TileKind::MassConverter);
        if converters.is_empty() {
            return;
        }
        let ids: Vec<CubeId> = self
            .cubes
            .values_mut()
            .filter(|cube| cube.is_active() && cube.value != 0 && converters.contains(&cube.position))
            .filter(|cube| !self.converting.contains(&cube.id))
            .map(|cube| {
                cube.status = CubeStatus::Evaporating;
                cube.id
            })
            .collect();
        if ids.is_empty() {
            return;
        }
        self.converting.extend(ids.iter().copied());
        self.log.push(GameEvent::ConversionStarted { ids: ids.clone() });
        self.schedule(self.config.conversion_ms, Effect::FinishConversion { ids });
    }

    /// Re-evaluates every station against the previous snapshot, applies the
    /// progression step and reports whether the level-won condition holds.
    fn refresh_progress(&mut self) -> bool {
        let snapshot = evaluate(&self.level, self.cubes.values());
        let (update, won) = {
            let occupancy = Occupancy::new(self.cubes.values());
            let controller = ProgressionController::new(&self.level);
            let update = controller.update(&self.progress, Some(&self.snapshot), &snapshot, &occupancy);
            let won = controller.level_won(self.player, &update.state, &snapshot, &occupancy);
            (update, won)
        };
        if update.score > 0 {
            debug!(score = update.score, phase = update.state.phase, "progress awarded");
        }
        self.score = self.score.saturating_add(update.score);
        self.log.extend(update.events.into_iter().map(GameEvent::Progress));
        self.progress = update.state;
        self.snapshot = snapshot;
        won
    }

    /// Picks up a prize or the key under the player.
    pub(super) fn collect_at_player(&mut self) {
        let player = self.player;
        if let Some(index) = self.prizes.iter().position(|prize| prize.position == player) {
            let prize = self.prizes.remove(index);
            self.score = self.score.saturating_add(PRIZE_BONUS);
            self.log.push(GameEvent::PrizeCollected { id: prize.id });
        }
        if self.key.is_some_and(|key| key.position == player) {
            self.key = None;
            self.has_key = true;
            self.log.push(GameEvent::KeyCollected);
        }
    }
}
