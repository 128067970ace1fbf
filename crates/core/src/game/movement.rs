//! Player movement, cube pushing, neutralization and rebound.

use tracing::debug;

use super::*;
use crate::progression::{MAIN_GATE, SECRET_CHAMBER_GATE};
use crate::types::{CubeStatus, TileKind};

impl Game {
    /// Steps the player one cell, pushing the cube in the way when it can move.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        if self.status != SessionStatus::Playing {
            return MoveOutcome::Ignored;
        }
        let next = self.player.step(direction);
        if self.is_obstacle(next) {
            return MoveOutcome::Blocked;
        }

        let Some(pushed) = self.cube_key_at(next) else {
            self.player = next;
            self.after_player_moved();
            return MoveOutcome::Walked;
        };

        let cube = &self.cubes[pushed];
        if self.level.zero_cubes_fixed && cube.value == 0 {
            return MoveOutcome::Blocked;
        }
        let destination = next.step(direction);
        if self.is_obstacle(destination) {
            return MoveOutcome::Blocked;
        }

        let outcome = match self.cube_key_at(destination) {
            Some(other) => {
                let (value, other_value) = (self.cubes[pushed].value, self.cubes[other].value);
                if !self.level.allows_neutralization || value.checked_add(other_value) != Some(0) {
                    return MoveOutcome::Blocked;
                }
                self.neutralize(pushed, other, destination)
            }
            None => {
                let cube = &mut self.cubes[pushed];
                cube.position = destination;
                let id = cube.id;
                if self.level.grid.tile_at(destination) == TileKind::Inverter {
                    self.schedule(self.config.inversion_ms, Effect::InvertCube { id });
                }
                MoveOutcome::Pushed { cube: id }
            }
        };
        self.player = next;
        self.after_player_moved();
        outcome
    }

    fn neutralize(&mut self, pushed: CubeKey, other: CubeKey, at: Pos) -> MoveOutcome {
        let score = self.cubes[pushed].value.unsigned_abs().saturating_mul(NEUTRALIZE_POINTS_PER_UNIT);
        self.cubes[pushed].position = at;
        let ids = [self.cubes[pushed].id, self.cubes[other].id];
        for key in [pushed, other] {
            self.cubes[key].status = CubeStatus::Evaporating;
        }
        self.score = self.score.saturating_add(score);
        debug!(?ids, score, "cubes neutralized");
        self.log.push(GameEvent::CubesNeutralized { ids });
        self.schedule(self.config.evaporation_ms, Effect::RemoveCubes { ids: ids.to_vec() });
        MoveOutcome::Neutralized { cubes: ids, score }
    }

    /// Pulls a jammed neighbouring cube over the player to the opposite side.
    /// Neighbours are tried up, down, left, then right; the first cube that is
    /// blocked on a side other than the player's and whose landing cell is
    /// free jumps.
    pub fn interact(&mut self) -> InteractOutcome {
        if self.status != SessionStatus::Playing {
            return InteractOutcome::Ignored;
        }
        for direction in Direction::ALL {
            let cube_pos = self.player.step(direction);
            let Some(key) = self.cube_key_at(cube_pos) else {
                continue;
            };
            if self.level.zero_cubes_fixed && self.cubes[key].value == 0 {
                continue;
            }
            let stuck = cube_pos
                .neighbors()
                .into_iter()
                .filter(|&side| side != self.player)
                .any(|side| self.is_obstacle(side) || self.cube_at(side).is_some());
            if !stuck {
                continue;
            }
            let landing = self.player.step(direction.opposite());
            if self.is_obstacle(landing) || self.cube_at(landing).is_some() {
                continue;
            }
            let cube = &mut self.cubes[key];
            cube.position = landing;
            let id = cube.id;
            self.settle();
            return InteractOutcome::Rebounded { cube: id, to: landing };
        }
        InteractOutcome::Nothing
    }

    fn after_player_moved(&mut self) {
        self.collect_at_player();
        self.settle();
    }

    /// Whether a player or a pushed cube may not enter `pos`.
    pub(super) fn is_obstacle(&self, pos: Pos) -> bool {
        if !self.level.grid.in_bounds(pos) {
            return true;
        }
        let closed = match self.level.grid.tile_at(pos) {
            TileKind::Wall | TileKind::DispenserLava | TileKind::DispenserIce => true,
            TileKind::DoorStage1 => self.progress.phase <= 1,
            TileKind::DoorStage2 => self.progress.phase <= 2,
            TileKind::DoorStage3 | TileKind::LogicGate => !self.progress.gate_open(MAIN_GATE),
            TileKind::DoorAbsolute => !self.snapshot.door_open(&pos.key()),
            TileKind::SecretChamberGate => !self.progress.gate_open(SECRET_CHAMBER_GATE),
            TileKind::Goal => ProgressionController::new(&self.level).goal_sealed(&self.progress),
            _ => false,
        };
        closed || self.reserved_cells().contains(&pos)
    }

    pub(super) fn cube_at(&self, pos: Pos) -> Option<&Cube> {
        self.cubes.values().find(|cube| cube.is_active() && cube.position == pos)
    }

    pub(super) fn cube_key_at(&self, pos: Pos) -> Option<CubeKey> {
        self.cubes.iter().find(|(_, cube)| cube.is_active() && cube.position == pos).map(|(key, _)| key)
    }
}
