//! Constraint stations as they appear in level descriptors.

use serde::{Deserialize, Serialize};

use crate::types::{Operator, Pos};

/// Two-slot comparison station: satisfied when `a <op> b` for the cubes on the slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonLink {
    pub id: String,
    pub operator: Operator,
    #[serde(rename = "slot_a_pos")]
    pub slot_a: Pos,
    #[serde(rename = "slot_b_pos")]
    pub slot_b: Pos,
}

/// Plate that wants a cube with the given magnitude; every listed door opens
/// only when all plates targeting it are satisfied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsoluteLink {
    pub value: i32,
    #[serde(rename = "plate_pos")]
    pub plate: Pos,
    #[serde(rename = "door_pos")]
    pub doors: Vec<Pos>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericDeposit {
    pub id: String,
    pub positions: Vec<Pos>,
    pub target: i32,
    pub controls_door: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicCalibrator {
    pub id: String,
    pub positions: Vec<Pos>,
    pub operator: Operator,
    pub target: i32,
    pub controls_door: u8,
}

/// Number-line slot expecting one exact value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotTarget {
    pub position: Pos,
    pub expected: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesizer {
    pub id: String,
    pub slot_a: Pos,
    pub slot_b: Pos,
    pub core: Pos,
    pub output: Pos,
}

impl Synthesizer {
    /// Station laid out around `core`: inputs left and right, output below.
    pub fn around(id: &str, core: Pos) -> Self {
        Self {
            id: id.to_string(),
            slot_a: core.offset(0, -1),
            slot_b: core.offset(0, 1),
            core,
            output: core.offset(1, 0),
        }
    }
}
