use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    pub struct CubeKey;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: i32,
    pub col: i32,
}

impl Pos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self { row: self.row + d_row, col: self.col + d_col }
    }

    pub const fn step(self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();
        self.offset(d_row, d_col)
    }

    /// Key used by the puzzle-state maps, e.g. `"29-9"`.
    pub fn key(self) -> String {
        format!("{}-{}", self.row, self.col)
    }

    pub fn neighbors(self) -> [Pos; 4] {
        Direction::ALL.map(|direction| self.step(direction))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    #[serde(rename = "F")]
    Floor,
    #[serde(rename = "W")]
    Wall,
    #[serde(rename = "G")]
    Goal,
    #[serde(rename = "D1")]
    DoorStage1,
    #[serde(rename = "D2")]
    DoorStage2,
    #[serde(rename = "D3")]
    DoorStage3,
    #[serde(rename = "SP")]
    SlotPositive,
    #[serde(rename = "SN")]
    SlotNegative,
    #[serde(rename = "I")]
    Inverter,
    #[serde(rename = "PA")]
    PlateAbsolute,
    #[serde(rename = "DA")]
    DoorAbsolute,
    #[serde(rename = "CGT")]
    ComparisonGt,
    #[serde(rename = "CLT")]
    ComparisonLt,
    #[serde(rename = "CEQ")]
    ComparisonEq,
    #[serde(rename = "CSA")]
    ComparisonSlotA,
    #[serde(rename = "CSB")]
    ComparisonSlotB,
    #[serde(rename = "LG")]
    LogicGate,
    #[serde(rename = "SCG")]
    SecretChamberGate,
    #[serde(rename = "SC")]
    ScannerPlate,
    #[serde(rename = "SSA")]
    SynthSlotA,
    #[serde(rename = "SSB")]
    SynthSlotB,
    #[serde(rename = "SCOR")]
    SynthCore,
    #[serde(rename = "SOUT")]
    SynthOutput,
    #[serde(rename = "DL")]
    DispenserLava,
    #[serde(rename = "DI")]
    DispenserIce,
    #[serde(rename = "ND")]
    NumericDeposit,
    #[serde(rename = "LC")]
    LogicCalibrator,
    #[serde(rename = "MC")]
    MassConverter,
    #[serde(rename = "APL")]
    AssemblerPlate,
}

impl TileKind {
    /// Stable byte used in canonical level encodings.
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn is_dispenser(self) -> bool {
        matches!(self, TileKind::DispenserLava | TileKind::DispenserIce)
    }

    /// Cell a dispenser at `at` drops cubes on: lava to the right, ice to the left.
    pub const fn dispenser_output(self, at: Pos) -> Option<Pos> {
        match self {
            TileKind::DispenserLava => Some(at.offset(0, 1)),
            TileKind::DispenserIce => Some(at.offset(0, -1)),
            _ => None,
        }
    }

    pub const fn dispensed_value(self) -> Option<i32> {
        match self {
            TileKind::DispenserLava => Some(1),
            TileKind::DispenserIce => Some(-1),
            _ => None,
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            TileKind::Floor => '.',
            TileKind::Wall => '#',
            TileKind::Goal => 'G',
            TileKind::DoorStage1 => '1',
            TileKind::DoorStage2 => '2',
            TileKind::DoorStage3 => '3',
            TileKind::SlotPositive => '+',
            TileKind::SlotNegative => '-',
            TileKind::Inverter => '~',
            TileKind::PlateAbsolute => 'p',
            TileKind::DoorAbsolute => 'D',
            TileKind::ComparisonGt => '>',
            TileKind::ComparisonLt => '<',
            TileKind::ComparisonEq => '=',
            TileKind::ComparisonSlotA | TileKind::ComparisonSlotB => 'o',
            TileKind::LogicGate => 'L',
            TileKind::SecretChamberGate => 'S',
            TileKind::ScannerPlate => '?',
            TileKind::SynthSlotA | TileKind::SynthSlotB => 's',
            TileKind::SynthCore => '*',
            TileKind::SynthOutput => 'v',
            TileKind::DispenserLava => ')',
            TileKind::DispenserIce => '(',
            TileKind::NumericDeposit => 'n',
            TileKind::LogicCalibrator => 'c',
            TileKind::MassConverter => 'M',
            TileKind::AssemblerPlate => 'a',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CubeKind {
    Ice,
    Lava,
}

impl CubeKind {
    /// Zero counts as lava, matching freshly synthesized cubes.
    pub const fn for_value(value: i32) -> Self {
        if value >= 0 { CubeKind::Lava } else { CubeKind::Ice }
    }

    pub const fn inverted(self) -> Self {
        match self {
            CubeKind::Ice => CubeKind::Lava,
            CubeKind::Lava => CubeKind::Ice,
        }
    }

    pub const fn admits(self, value: i32) -> bool {
        match self {
            CubeKind::Ice => value <= 0,
            CubeKind::Lava => value >= 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CubeStatus {
    #[default]
    Active,
    Evaporating,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CubeId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cube {
    pub id: CubeId,
    #[serde(rename = "type")]
    pub kind: CubeKind,
    pub value: i32,
    pub position: Pos,
    #[serde(default)]
    pub status: CubeStatus,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_memory: bool,
}

impl Cube {
    pub fn new(id: u32, value: i32, position: Pos) -> Self {
        Self {
            id: CubeId(id),
            kind: CubeKind::for_value(value),
            value,
            position,
            status: CubeStatus::Active,
            is_memory: false,
        }
    }

    pub fn memory(mut self) -> Self {
        self.is_memory = true;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == CubeStatus::Active
    }

    pub fn invert(&mut self) {
        self.value = -self.value;
        self.kind = self.kind.inverted();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Gt,
    Lt,
    Eq,
}

impl Operator {
    pub const fn compare(self, left: i32, right: i32) -> bool {
        match self {
            Operator::Gt => left > right,
            Operator::Lt => left < right,
            Operator::Eq => left == right,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("cube {id:?} has kind {kind:?} but value {value}")]
    CubeSignMismatch { id: CubeId, kind: CubeKind, value: i32 },
    #[error("no level with index {0}")]
    UnknownLevel(usize),
    #[error("{what} at {pos:?} lies outside the {width}x{height} grid")]
    OutOfBounds { what: &'static str, pos: Pos, width: usize, height: usize },
    #[error("cube {id:?} value {value} exceeds the magnitude limit")]
    CubeValueOutOfRange { id: CubeId, value: i32 },
    #[error("cube id {0:?} appears more than once")]
    DuplicateCubeId(CubeId),
    #[error("grid rows have uneven widths (row {row} has {found}, expected {expected})")]
    RaggedGrid { row: usize, found: usize, expected: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("input is paused while the level transitions")]
    Paused,
    #[error("the run has not finished yet")]
    NotFinished,
    #[error(transparent)]
    Level(#[from] LevelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_kind_follows_value_sign() {
        assert_eq!(CubeKind::for_value(3), CubeKind::Lava);
        assert_eq!(CubeKind::for_value(0), CubeKind::Lava);
        assert_eq!(CubeKind::for_value(-1), CubeKind::Ice);
        assert!(CubeKind::Ice.admits(0));
        assert!(!CubeKind::Ice.admits(2));
    }

    #[test]
    fn dispensers_emit_toward_the_room() {
        let at = Pos::new(37, 0);
        assert_eq!(TileKind::DispenserLava.dispenser_output(at), Some(Pos::new(37, 1)));
        assert_eq!(TileKind::DispenserIce.dispenser_output(Pos::new(22, 19)), Some(Pos::new(22, 18)));
        assert_eq!(TileKind::DispenserIce.dispensed_value(), Some(-1));
        assert_eq!(TileKind::Floor.dispenser_output(at), None);
    }

    #[test]
    fn inverting_flips_value_and_kind() {
        let mut cube = Cube::new(1, -4, Pos::new(2, 2));
        cube.invert();
        assert_eq!(cube.value, 4);
        assert_eq!(cube.kind, CubeKind::Lava);
    }

    #[test]
    fn cube_record_uses_wire_names() {
        let cube = Cube::new(7, -2, Pos::new(3, 4));
        let json = serde_json::to_value(&cube).expect("serialize");
        assert_eq!(json["type"], "ice");
        assert_eq!(json["status"], "active");
        assert_eq!(json["position"]["row"], 3);
        assert!(json.get("isMemory").is_none());

        let tile = serde_json::to_string(&TileKind::SynthOutput).expect("serialize");
        assert_eq!(tile, "\"SOUT\"");
    }

    #[test]
    fn position_key_matches_door_naming() {
        assert_eq!(Pos::new(29, 9).key(), "29-9");
        assert_eq!(Pos::new(5, 5).step(Direction::Left), Pos::new(5, 4));
    }
}
