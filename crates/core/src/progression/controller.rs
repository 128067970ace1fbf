//! Turns consecutive puzzle snapshots into phase, gate, score and win updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rules::{PhasePolicy, RuleContext, WinRule};
use crate::level::LevelData;
use crate::puzzle::{Occupancy, PuzzleSnapshot, SnapshotDiff};
use crate::types::{Pos, TileKind};

pub const PHASE_BONUS: u32 = 250;
pub const STATION_BONUS: u32 = 250;
pub const ASSEMBLER_BONUS: u32 = 500;
/// Awarded when a named gate such as `main_gate` opens.
pub const GATE_OPEN_BONUS: u32 = 500;
/// Awarded when an absolute door opens.
pub const DOOR_OPEN_BONUS: u32 = 300;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub phase: u8,
    pub gates: BTreeMap<String, bool>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self { phase: 1, gates: BTreeMap::new() }
    }
}

impl ProgressState {
    pub fn gate_open(&self, name: &str) -> bool {
        self.gates.get(name).copied().unwrap_or(false)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    PhaseChanged { from: u8, to: u8 },
    GateOpened { name: String },
    GateClosed { name: String },
    LinkSatisfied { id: String },
    DoorOpened { key: String },
    DepositSatisfied { id: String },
    CalibratorSatisfied { id: String },
    AssemblerCompleted { id: String },
    SlotFilled { key: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub state: ProgressState,
    pub events: Vec<ProgressEvent>,
    pub score: u32,
}

pub struct ProgressionController<'a> {
    level: &'a LevelData,
}

impl<'a> ProgressionController<'a> {
    pub fn new(level: &'a LevelData) -> Self {
        Self { level }
    }

    /// Pure step: rising edges are measured against `previous_snapshot`, so
    /// feeding the same snapshot twice yields no events and no score.
    pub fn update(
        &self,
        previous: &ProgressState,
        previous_snapshot: Option<&PuzzleSnapshot>,
        snapshot: &PuzzleSnapshot,
        occupancy: &Occupancy<'_>,
    ) -> ProgressUpdate {
        let rules = &self.level.rules;
        let context = RuleContext { level: self.level, snapshot, occupancy };
        let ratchet = rules.phase.policy == PhasePolicy::Ratchet;

        let mut events = Vec::new();
        let mut score = 0;

        let diff = SnapshotDiff::between(previous_snapshot, snapshot);
        events.extend(diff.links_satisfied.into_iter().map(|id| ProgressEvent::LinkSatisfied { id }));
        for key in diff.doors_opened {
            score += DOOR_OPEN_BONUS;
            events.push(ProgressEvent::DoorOpened { key });
        }
        events.extend(diff.slots_filled_correctly.into_iter().map(|key| ProgressEvent::SlotFilled { key }));
        for id in diff.deposits_satisfied {
            score += STATION_BONUS;
            events.push(ProgressEvent::DepositSatisfied { id });
        }
        for id in diff.calibrators_satisfied {
            score += STATION_BONUS;
            events.push(ProgressEvent::CalibratorSatisfied { id });
        }
        for id in diff.assemblers_completed {
            score += ASSEMBLER_BONUS;
            events.push(ProgressEvent::AssemblerCompleted { id });
        }

        let target = rules.phase.target_phase(&context);
        let phase = if ratchet { previous.phase.max(target) } else { target };
        if phase != previous.phase {
            if phase > previous.phase {
                score += PHASE_BONUS;
            }
            events.push(ProgressEvent::PhaseChanged { from: previous.phase, to: phase });
        }

        let mut gates = BTreeMap::new();
        for gate in &rules.gates {
            let was_open = previous.gate_open(&gate.name);
            let holds = gate.when.holds(&context);
            let open = holds || (ratchet && was_open);
            if open && !was_open {
                score += GATE_OPEN_BONUS;
                events.push(ProgressEvent::GateOpened { name: gate.name.clone() });
            } else if !open && was_open {
                events.push(ProgressEvent::GateClosed { name: gate.name.clone() });
            }
            gates.insert(gate.name.clone(), open);
        }

        ProgressUpdate { state: ProgressState { phase, gates }, events, score }
    }

    /// The goal tile only counts once the level's win rule holds.
    pub fn level_won(
        &self,
        player: Pos,
        state: &ProgressState,
        snapshot: &PuzzleSnapshot,
        occupancy: &Occupancy<'_>,
    ) -> bool {
        if self.level.grid.tile_at(player) != TileKind::Goal {
            return false;
        }
        match &self.level.rules.win {
            WinRule::AllCubesCleared => occupancy.is_empty(),
            WinRule::DoorOpen { pos } => snapshot.door_open(&pos.key()),
            WinRule::GateOpen { name } => state.gate_open(name),
            WinRule::AllSlotsCorrect => {
                !snapshot.slot_states.is_empty()
                    && snapshot.slot_states.keys().all(|key| snapshot.slot_correct(key))
            }
        }
    }

    /// Whether the goal tile is still sealed behind a gate.
    pub fn goal_sealed(&self, state: &ProgressState) -> bool {
        self.level.rules.goal_gate.as_deref().is_some_and(|gate| !state.gate_open(gate))
    }
}
