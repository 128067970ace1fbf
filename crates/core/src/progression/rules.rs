//! Declarative phase, gate and win rules evaluated against a puzzle snapshot.

use serde::{Deserialize, Serialize};

use crate::level::LevelData;
use crate::mapgen::RoomBounds;
use crate::puzzle::{Occupancy, PuzzleSnapshot};
use crate::types::{CubeId, Pos};

pub const MAIN_GATE: &str = "main_gate";
pub const SECRET_CHAMBER_GATE: &str = "secret_chamber_gate";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Always,
    Link { id: String },
    /// Absolute door addressed by any of its cells.
    Door { pos: Pos },
    Deposit { id: String },
    Calibrator { id: String },
    Assembler { id: String },
    /// Every slot target in the room holds its expected value. False for rooms without slots.
    SlotsInRoom { room: usize },
    CubesCleared { ids: Vec<CubeId> },
    /// No active cube left anywhere in the room's row band.
    RoomCleared { room: usize },
    /// Every deposit, calibrator and assembler wired to `door` is satisfied.
    /// False when nothing is wired to it.
    DoorGroup { door: u8 },
    All { conditions: Vec<Condition> },
    Any { conditions: Vec<Condition> },
}

impl Condition {
    pub fn link(id: &str) -> Self {
        Condition::Link { id: id.to_string() }
    }

    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::All { conditions: conditions.into_iter().collect() }
    }

    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Condition::Any { conditions: conditions.into_iter().collect() }
    }

    pub fn holds(&self, context: &RuleContext<'_>) -> bool {
        match self {
            Condition::Always => true,
            Condition::Link { id } => context.snapshot.link(id),
            Condition::Door { pos } => context.snapshot.door_open(&pos.key()),
            Condition::Deposit { id } => context.snapshot.deposit_satisfied(id),
            Condition::Calibrator { id } => context.snapshot.calibrator_correct(id),
            Condition::Assembler { id } => context.snapshot.assembler_complete(id),
            Condition::SlotsInRoom { room } => {
                let (start, end) = RoomBounds::band(*room);
                let mut keys = context
                    .level
                    .slot_targets
                    .iter()
                    .filter(|slot| (start..end).contains(&slot.position.row))
                    .map(|slot| slot.position.key())
                    .peekable();
                keys.peek().is_some() && keys.all(|key| context.snapshot.slot_correct(&key))
            }
            Condition::CubesCleared { ids } => {
                !context.occupancy.cubes().any(|cube| ids.contains(&cube.id))
            }
            Condition::RoomCleared { room } => {
                let (start, end) = RoomBounds::band(*room);
                !context.occupancy.cubes().any(|cube| (start..end).contains(&cube.position.row))
            }
            Condition::DoorGroup { door } => door_group_satisfied(*door, context),
            Condition::All { conditions } => conditions.iter().all(|condition| condition.holds(context)),
            Condition::Any { conditions } => conditions.iter().any(|condition| condition.holds(context)),
        }
    }
}

fn door_group_satisfied(door: u8, context: &RuleContext<'_>) -> bool {
    let level = context.level;
    let snapshot = context.snapshot;
    let mut members = 0;
    let mut satisfied = true;
    for deposit in level.numeric_deposits.iter().filter(|deposit| deposit.controls_door == door) {
        members += 1;
        satisfied &= snapshot.deposit_satisfied(&deposit.id);
    }
    for calibrator in level.logic_calibrators.iter().filter(|calibrator| calibrator.controls_door == door) {
        members += 1;
        satisfied &= snapshot.calibrator_correct(&calibrator.id);
    }
    for assembler in level.assemblers.iter().filter(|assembler| assembler.controls_door == door) {
        members += 1;
        satisfied &= snapshot.assembler_complete(&assembler.id);
    }
    members > 0 && satisfied
}

/// Everything a condition may look at.
pub struct RuleContext<'a> {
    pub level: &'a LevelData,
    pub snapshot: &'a PuzzleSnapshot,
    pub occupancy: &'a Occupancy<'a>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhasePolicy {
    /// Phase and gates follow the current state and may drop.
    Recompute,
    /// Phase only rises and opened gates stay open.
    #[default]
    Ratchet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStep {
    pub phase: u8,
    pub when: Condition,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PhaseRule {
    pub policy: PhasePolicy,
    pub steps: Vec<PhaseStep>,
}

impl PhaseRule {
    pub fn new(policy: PhasePolicy) -> Self {
        Self { policy, steps: Vec::new() }
    }

    pub fn step(mut self, phase: u8, when: Condition) -> Self {
        self.steps.push(PhaseStep { phase, when });
        self
    }

    /// Highest phase whose condition holds, 1 when none do.
    pub fn target_phase(&self, context: &RuleContext<'_>) -> u8 {
        self.steps
            .iter()
            .filter(|step| step.when.holds(context))
            .map(|step| step.phase)
            .fold(1, u8::max)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRule {
    pub name: String,
    pub when: Condition,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WinRule {
    AllCubesCleared,
    DoorOpen { pos: Pos },
    GateOpen { name: String },
    AllSlotsCorrect,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRules {
    pub phase: PhaseRule,
    #[serde(default)]
    pub gates: Vec<GateRule>,
    pub win: WinRule,
    /// Gate that must be open before the goal tile can be entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_gate: Option<String>,
}

impl LevelRules {
    pub fn new(phase: PhaseRule, win: WinRule) -> Self {
        Self { phase, gates: Vec::new(), win, goal_gate: None }
    }

    pub fn gate(mut self, name: &str, when: Condition) -> Self {
        self.gates.push(GateRule { name: name.to_string(), when });
        self
    }

    pub fn goal_behind(mut self, gate: &str) -> Self {
        self.goal_gate = Some(gate.to_string());
        self
    }
}

impl Default for LevelRules {
    fn default() -> Self {
        Self::new(PhaseRule::default(), WinRule::GateOpen { name: MAIN_GATE.to_string() })
    }
}
