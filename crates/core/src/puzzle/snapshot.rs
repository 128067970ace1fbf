//! Puzzle-state snapshot recomputed from scratch, plus rising-edge diffs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::Occupancy;
use super::assembler::AssemblerState;
use crate::level::LevelData;
use crate::types::{Cube, CubeId, TileKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Empty,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositState {
    pub current: i32,
    pub target: i32,
}

impl DepositState {
    pub fn is_satisfied(&self) -> bool {
        self.current == self.target
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibratorState {
    pub current: i32,
    pub is_correct: bool,
}

/// Every station's state for one cube configuration. Maps are ordered so the
/// snapshot hashes and serializes deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSnapshot {
    pub slot_states: BTreeMap<String, SlotState>,
    pub links: BTreeMap<String, bool>,
    pub absolute_doors: BTreeMap<String, bool>,
    pub deposits: BTreeMap<String, DepositState>,
    pub calibrators: BTreeMap<String, CalibratorState>,
    pub assemblers: BTreeMap<String, AssemblerState>,
    /// Memory cubes currently sitting on a scanner plate.
    pub revealed_cubes: BTreeSet<CubeId>,
}

impl PuzzleSnapshot {
    pub fn link(&self, id: &str) -> bool {
        self.links.get(id).copied().unwrap_or(false)
    }

    pub fn door_open(&self, key: &str) -> bool {
        self.absolute_doors.get(key).copied().unwrap_or(false)
    }

    pub fn deposit_satisfied(&self, id: &str) -> bool {
        self.deposits.get(id).is_some_and(DepositState::is_satisfied)
    }

    pub fn calibrator_correct(&self, id: &str) -> bool {
        self.calibrators.get(id).is_some_and(|state| state.is_correct)
    }

    pub fn assembler_complete(&self, id: &str) -> bool {
        self.assemblers.get(id).is_some_and(|state| state.is_complete)
    }

    pub fn slot_correct(&self, key: &str) -> bool {
        self.slot_states.get(key) == Some(&SlotState::Correct)
    }
}

/// Recomputes every station of `level` from the active cubes in `cubes`.
pub fn evaluate<'a>(level: &LevelData, cubes: impl IntoIterator<Item = &'a Cube>) -> PuzzleSnapshot {
    let occupancy = Occupancy::new(cubes);
    let mut snapshot = PuzzleSnapshot::default();

    for slot in &level.slot_targets {
        let state = match occupancy.at(slot.position) {
            None => SlotState::Empty,
            Some(cube) if cube.value == slot.expected => SlotState::Correct,
            Some(_) => SlotState::Incorrect,
        };
        snapshot.slot_states.insert(slot.position.key(), state);
    }

    for link in &level.logic_links {
        let satisfied = match (occupancy.at(link.slot_a), occupancy.at(link.slot_b)) {
            (Some(a), Some(b)) => link.operator.compare(a.value, b.value),
            _ => false,
        };
        snapshot.links.insert(link.id.clone(), satisfied);
    }

    for link in &level.absolute_links {
        let plate_satisfied =
            occupancy.at(link.plate).is_some_and(|cube| cube.value.unsigned_abs() == link.value.unsigned_abs());
        for door in &link.doors {
            let open = snapshot.absolute_doors.entry(door.key()).or_insert(true);
            *open &= plate_satisfied;
        }
    }

    for deposit in &level.numeric_deposits {
        let current = occupancy.sum_over(&deposit.positions);
        snapshot.deposits.insert(deposit.id.clone(), DepositState { current, target: deposit.target });
    }

    for calibrator in &level.logic_calibrators {
        let current = occupancy.sum_over(&calibrator.positions);
        let is_correct = calibrator.operator.compare(current, calibrator.target);
        snapshot.calibrators.insert(calibrator.id.clone(), CalibratorState { current, is_correct });
    }

    for assembler in &level.assemblers {
        snapshot.assemblers.insert(assembler.id.clone(), assembler.evaluate(&occupancy));
    }

    snapshot.revealed_cubes = occupancy
        .cubes()
        .filter(|cube| cube.is_memory && level.grid.tile_at(cube.position) == TileKind::ScannerPlate)
        .map(|cube| cube.id)
        .collect();

    snapshot
}

/// Stations that turned satisfied between two snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SnapshotDiff {
    pub links_satisfied: Vec<String>,
    pub doors_opened: Vec<String>,
    pub deposits_satisfied: Vec<String>,
    pub calibrators_satisfied: Vec<String>,
    pub assemblers_completed: Vec<String>,
    pub slots_filled_correctly: Vec<String>,
}

impl SnapshotDiff {
    /// Without a previous snapshot every satisfied station counts as a rising edge.
    pub fn between(previous: Option<&PuzzleSnapshot>, current: &PuzzleSnapshot) -> Self {
        let empty = PuzzleSnapshot::default();
        let previous = previous.unwrap_or(&empty);
        Self {
            links_satisfied: rising(&current.links, |id| previous.link(id), |&met| met),
            doors_opened: rising(&current.absolute_doors, |key| previous.door_open(key), |&open| open),
            deposits_satisfied: rising(
                &current.deposits,
                |id| previous.deposit_satisfied(id),
                DepositState::is_satisfied,
            ),
            calibrators_satisfied: rising(
                &current.calibrators,
                |id| previous.calibrator_correct(id),
                |state| state.is_correct,
            ),
            assemblers_completed: rising(
                &current.assemblers,
                |id| previous.assembler_complete(id),
                |state| state.is_complete,
            ),
            slots_filled_correctly: rising(
                &current.slot_states,
                |key| previous.slot_correct(key),
                |state| *state == SlotState::Correct,
            ),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links_satisfied.is_empty()
            && self.doors_opened.is_empty()
            && self.deposits_satisfied.is_empty()
            && self.calibrators_satisfied.is_empty()
            && self.assemblers_completed.is_empty()
            && self.slots_filled_correctly.is_empty()
    }
}

fn rising<V>(
    current: &BTreeMap<String, V>,
    was_met: impl Fn(&str) -> bool,
    is_met: impl Fn(&V) -> bool,
) -> Vec<String> {
    current
        .iter()
        .filter(|(key, value)| is_met(*value) && !was_met(key.as_str()))
        .map(|(key, _)| key.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelData;
    use crate::mapgen::build_template;
    use crate::puzzle::{AbsoluteLink, ComparisonLink, NumericDeposit, SlotTarget};
    use crate::types::{Operator, Pos};

    fn level() -> LevelData {
        let mut level = LevelData::bare("snapshot", build_template(1), Pos::new(12, 10));
        level.logic_links.push(ComparisonLink {
            id: "s1".to_string(),
            operator: Operator::Gt,
            slot_a: Pos::new(5, 5),
            slot_b: Pos::new(5, 7),
        });
        level.absolute_links.push(AbsoluteLink {
            value: 2,
            plate: Pos::new(8, 3),
            doors: vec![Pos::new(1, 9)],
        });
        level.slot_targets.push(SlotTarget { position: Pos::new(7, 9), expected: -1 });
        level
    }

    #[test]
    fn slot_states_distinguish_empty_correct_and_incorrect() {
        let level = level();
        assert_eq!(evaluate(&level, &[] as &[Cube]).slot_states["7-9"], SlotState::Empty);
        let right = [Cube::new(1, -1, Pos::new(7, 9))];
        assert_eq!(evaluate(&level, &right).slot_states["7-9"], SlotState::Correct);
        let wrong = [Cube::new(1, 1, Pos::new(7, 9))];
        assert_eq!(evaluate(&level, &wrong).slot_states["7-9"], SlotState::Incorrect);
    }

    #[test]
    fn diff_reports_only_rising_edges() {
        let level = level();
        let before = evaluate(&level, &[Cube::new(1, 7, Pos::new(5, 5))]);
        let after = evaluate(&level, &[Cube::new(1, 7, Pos::new(5, 5)), Cube::new(2, 3, Pos::new(5, 7))]);

        let diff = SnapshotDiff::between(Some(&before), &after);
        assert_eq!(diff.links_satisfied, vec!["s1".to_string()]);
        assert!(SnapshotDiff::between(Some(&after), &after).is_empty());
        assert!(SnapshotDiff::between(Some(&after), &before).is_empty());
    }

    #[test]
    fn memory_cube_is_revealed_on_scanner() {
        let mut level = level();
        level.grid.set_tile(Pos::new(10, 10), TileKind::ScannerPlate);
        let cubes = [Cube::new(9, 4, Pos::new(10, 10)).memory(), Cube::new(8, 2, Pos::new(10, 11)).memory()];
        let snapshot = evaluate(&level, &cubes);
        assert_eq!(snapshot.revealed_cubes.into_iter().collect::<Vec<_>>(), vec![CubeId(9)]);
    }

    #[test]
    fn shared_door_needs_every_absolute_plate() {
        let mut level = level();
        level.absolute_links.push(AbsoluteLink {
            value: 5,
            plate: Pos::new(10, 3),
            doors: vec![Pos::new(1, 9)],
        });

        let one_plate = [Cube::new(1, -2, Pos::new(8, 3))];
        assert!(!evaluate(&level, &one_plate).door_open("1-9"));

        let both_plates = [Cube::new(1, -2, Pos::new(8, 3)), Cube::new(2, 5, Pos::new(10, 3))];
        assert!(evaluate(&level, &both_plates).door_open("1-9"));
    }

    #[test]
    fn deposit_sums_negative_cubes_to_target() {
        let mut level = level();
        let positions = vec![Pos::new(9, 14), Pos::new(9, 15), Pos::new(9, 16), Pos::new(9, 17)];
        level.numeric_deposits.push(NumericDeposit {
            id: "d1".to_string(),
            positions,
            target: -3,
            controls_door: 1,
        });

        let mut cubes = vec![
            Cube::new(1, -1, Pos::new(9, 14)),
            Cube::new(2, -1, Pos::new(9, 15)),
            Cube::new(3, -1, Pos::new(9, 16)),
        ];
        let snapshot = evaluate(&level, &cubes);
        assert_eq!(snapshot.deposits["d1"].current, -3);
        assert!(snapshot.deposit_satisfied("d1"));

        cubes.push(Cube::new(4, 1, Pos::new(9, 17)));
        let snapshot = evaluate(&level, &cubes);
        assert_eq!(snapshot.deposits["d1"].current, -2);
        assert!(!snapshot.deposit_satisfied("d1"));
    }
}
