//! Level descriptor: grid, entities, constraint stations and progression rules.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::mapgen::Grid;
use crate::progression::LevelRules;
use crate::puzzle::{
    AbsoluteLink, Assembler, ComparisonLink, LogicCalibrator, NumericDeposit, SlotTarget, Synthesizer,
};
use crate::types::{Cube, LevelError, Pos};

/// Largest authored `|value|`; keeps scores and station sums far from overflow.
pub const MAX_CUBE_MAGNITUDE: u32 = 1_000_000;

/// Everything in a descriptor that changes how the level plays besides the
/// grid and entities.
#[derive(Serialize)]
struct Mechanics<'a> {
    logic_links: &'a [ComparisonLink],
    absolute_links: &'a [AbsoluteLink],
    synthesizers: &'a [Synthesizer],
    numeric_deposits: &'a [NumericDeposit],
    logic_calibrators: &'a [LogicCalibrator],
    assemblers: &'a [Assembler],
    slot_targets: &'a [SlotTarget],
    secret_chamber_gate: Option<Pos>,
    allows_neutralization: bool,
    zero_cubes_fixed: bool,
    rules: &'a LevelRules,
}

/// Prize or key lying on the floor until the player steps on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub position: Pos,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub title: String,
    pub short_title: String,
    pub grid: Grid,
    pub player_start: Pos,
    pub cubes: Vec<Cube>,
    /// Objective text per phase.
    #[serde(default)]
    pub objectives: BTreeMap<u8, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prizes: Vec<Collectible>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Collectible>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logic_links: Vec<ComparisonLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub absolute_links: Vec<AbsoluteLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synthesizers: Vec<Synthesizer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numeric_deposits: Vec<NumericDeposit>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logic_calibrators: Vec<LogicCalibrator>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assemblers: Vec<Assembler>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slot_targets: Vec<SlotTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_chamber_gate: Option<Pos>,
    /// Opposite cubes whose values cancel may be pushed into each other.
    #[serde(default)]
    pub allows_neutralization: bool,
    /// Zero-valued cubes cannot be pushed or pulled.
    #[serde(default)]
    pub zero_cubes_fixed: bool,
    #[serde(default)]
    pub rules: LevelRules,
}

impl LevelData {
    /// Descriptor with a grid and start position and nothing else.
    pub fn bare(title: &str, grid: Grid, player_start: Pos) -> Self {
        Self {
            title: title.to_string(),
            short_title: title.to_string(),
            grid,
            player_start,
            cubes: Vec::new(),
            objectives: BTreeMap::new(),
            prizes: Vec::new(),
            key: None,
            logic_links: Vec::new(),
            absolute_links: Vec::new(),
            synthesizers: Vec::new(),
            numeric_deposits: Vec::new(),
            logic_calibrators: Vec::new(),
            assemblers: Vec::new(),
            slot_targets: Vec::new(),
            secret_chamber_gate: None,
            allows_neutralization: false,
            zero_cubes_fixed: false,
            rules: LevelRules::default(),
        }
    }

    pub fn objective(&self, phase: u8) -> Option<&str> {
        self.objectives.get(&phase).map(String::as_str)
    }

    /// First id not used by any initial cube.
    pub fn next_free_cube_id(&self) -> u32 {
        self.cubes.iter().map(|cube| cube.id.0 + 1).max().unwrap_or(1)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        self.check_in_bounds("player start", self.player_start)?;

        let mut seen = BTreeSet::new();
        for cube in &self.cubes {
            if !cube.kind.admits(cube.value) {
                return Err(LevelError::CubeSignMismatch { id: cube.id, kind: cube.kind, value: cube.value });
            }
            if cube.value.unsigned_abs() > MAX_CUBE_MAGNITUDE {
                return Err(LevelError::CubeValueOutOfRange { id: cube.id, value: cube.value });
            }
            if !seen.insert(cube.id) {
                return Err(LevelError::DuplicateCubeId(cube.id));
            }
            self.check_in_bounds("cube", cube.position)?;
        }

        for prize in self.prizes.iter().chain(self.key.iter()) {
            self.check_in_bounds("collectible", prize.position)?;
        }
        for link in &self.logic_links {
            self.check_in_bounds("comparison slot", link.slot_a)?;
            self.check_in_bounds("comparison slot", link.slot_b)?;
        }
        for link in &self.absolute_links {
            self.check_in_bounds("absolute plate", link.plate)?;
            for &door in &link.doors {
                self.check_in_bounds("absolute door", door)?;
            }
        }
        for synthesizer in &self.synthesizers {
            for pos in [synthesizer.slot_a, synthesizer.slot_b, synthesizer.core, synthesizer.output] {
                self.check_in_bounds("synthesizer", pos)?;
            }
        }
        let plate_cells = self
            .numeric_deposits
            .iter()
            .flat_map(|deposit| &deposit.positions)
            .chain(self.logic_calibrators.iter().flat_map(|calibrator| &calibrator.positions))
            .chain(self.assemblers.iter().flat_map(|assembler| &assembler.positions));
        for &pos in plate_cells {
            self.check_in_bounds("plate", pos)?;
        }
        for slot in &self.slot_targets {
            self.check_in_bounds("slot", slot.position)?;
        }
        Ok(())
    }

    fn check_in_bounds(&self, what: &'static str, pos: Pos) -> Result<(), LevelError> {
        if self.grid.in_bounds(pos) {
            return Ok(());
        }
        Err(LevelError::OutOfBounds { what, pos, width: self.grid.width(), height: self.grid.height() })
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.grid.width() as u32).to_le_bytes());
        bytes.extend((self.grid.height() as u32).to_le_bytes());
        bytes.extend(self.grid.tiles().iter().map(|tile| tile.code()));
        bytes.extend(self.player_start.row.to_le_bytes());
        bytes.extend(self.player_start.col.to_le_bytes());

        bytes.extend((self.cubes.len() as u32).to_le_bytes());
        for cube in &self.cubes {
            bytes.extend(cube.id.0.to_le_bytes());
            bytes.extend(cube.value.to_le_bytes());
            bytes.extend(cube.position.row.to_le_bytes());
            bytes.extend(cube.position.col.to_le_bytes());
            bytes.push(u8::from(cube.is_memory));
        }

        bytes.extend((self.prizes.len() as u32).to_le_bytes());
        bytes.push(u8::from(self.key.is_some()));
        for prize in self.prizes.iter().chain(self.key.iter()) {
            bytes.extend(prize.id.to_le_bytes());
            bytes.extend(prize.position.row.to_le_bytes());
            bytes.extend(prize.position.col.to_le_bytes());
        }

        let mechanics = Mechanics {
            logic_links: &self.logic_links,
            absolute_links: &self.absolute_links,
            synthesizers: &self.synthesizers,
            numeric_deposits: &self.numeric_deposits,
            logic_calibrators: &self.logic_calibrators,
            assemblers: &self.assemblers,
            slot_targets: &self.slot_targets,
            secret_chamber_gate: self.secret_chamber_gate,
            allows_neutralization: self.allows_neutralization,
            zero_cubes_fixed: self.zero_cubes_fixed,
            rules: &self.rules,
        };
        // Only string and integer map keys below, so writing into a Vec cannot fail.
        bytes.extend(serde_json::to_vec(&mechanics).unwrap_or_default());
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::build_template;
    use crate::progression::WinRule;
    use crate::types::{CubeId, CubeKind};

    fn level() -> LevelData {
        let mut level = LevelData::bare("test", build_template(1), Pos::new(12, 10));
        level.cubes.push(Cube::new(3, 2, Pos::new(5, 5)));
        level.cubes.push(Cube::new(4, -2, Pos::new(5, 7)));
        level
    }

    #[test]
    fn valid_level_passes() {
        assert_eq!(level().validate(), Ok(()));
        assert_eq!(level().next_free_cube_id(), 5);
    }

    #[test]
    fn sign_mismatch_is_rejected() {
        let mut level = level();
        level.cubes[0].kind = CubeKind::Ice;
        assert!(matches!(level.validate(), Err(LevelError::CubeSignMismatch { .. })));
    }

    #[test]
    fn oversized_cube_value_is_rejected() {
        let mut level = level();
        level.cubes[1].value = i32::MIN;
        assert!(matches!(level.validate(), Err(LevelError::CubeValueOutOfRange { id: CubeId(4), .. })));
        level.cubes[1].value = -(MAX_CUBE_MAGNITUDE as i32);
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn duplicate_ids_and_stray_positions_are_rejected() {
        let mut duplicated = level();
        duplicated.cubes[1].id = CubeId(3);
        assert_eq!(duplicated.validate(), Err(LevelError::DuplicateCubeId(CubeId(3))));

        let mut stray = level();
        stray.player_start = Pos::new(40, 10);
        assert!(matches!(stray.validate(), Err(LevelError::OutOfBounds { what: "player start", .. })));
    }

    #[test]
    fn descriptor_uses_camel_case_wire_names() {
        let json = serde_json::to_value(level()).expect("serialize");
        assert!(json.get("playerStart").is_some());
        assert!(json.get("shortTitle").is_some());
        assert!(json.get("logicLinks").is_none());
        let back: LevelData = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, level());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut moved = level();
        moved.cubes[0].position = Pos::new(6, 5);
        assert_ne!(level().fingerprint(), moved.fingerprint());
        assert_eq!(level().fingerprint(), level().fingerprint());
    }

    #[test]
    fn fingerprint_separates_prizes_from_key() {
        let collectible = Collectible { id: 1, position: Pos::new(3, 3) };
        let mut with_prize = level();
        with_prize.prizes.push(collectible);
        let mut with_key = level();
        with_key.key = Some(collectible);
        assert_ne!(with_prize.fingerprint(), with_key.fingerprint());
    }

    #[test]
    fn fingerprint_covers_stations_and_rules() {
        let mut linked = level();
        linked.absolute_links.push(AbsoluteLink { value: 3, plate: Pos::new(8, 3), doors: vec![Pos::new(1, 9)] });
        assert_ne!(level().fingerprint(), linked.fingerprint());

        let mut ruled = level();
        ruled.rules.win = WinRule::AllCubesCleared;
        assert_ne!(level().fingerprint(), ruled.fingerprint());

        let mut neutralizing = level();
        neutralizing.allows_neutralization = true;
        assert_ne!(level().fingerprint(), neutralizing.fingerprint());
    }
}
