//! Multi-goal plate grids: row/column/total sums, parities and cube counts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Occupancy;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblerGoalKind {
    RowSum,
    ColSum,
    TotalSum,
    RowParity,
    ColParity,
    TotalParity,
    CubeCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblerCondition {
    Gt,
    Lt,
    Eq,
    Even,
    Odd,
}

impl AssemblerCondition {
    pub fn holds(self, current: i32, value: i32) -> bool {
        match self {
            AssemblerCondition::Gt => current > value,
            AssemblerCondition::Lt => current < value,
            AssemblerCondition::Eq => current == value,
            AssemblerCondition::Even => current % 2 == 0,
            AssemblerCondition::Odd => (current % 2).abs() == 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblerGoal {
    #[serde(rename = "type")]
    pub kind: AssemblerGoalKind,
    pub condition: AssemblerCondition,
    #[serde(default)]
    pub value: i32,
    /// Row or column selector for the row/col goal kinds, 0 = top row / left column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default)]
    pub description: String,
}

impl AssemblerGoal {
    pub fn new(kind: AssemblerGoalKind, condition: AssemblerCondition, value: i32) -> Self {
        Self { kind, condition, value, index: None, description: String::new() }
    }

    pub fn at(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn described(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assembler {
    pub id: String,
    pub positions: Vec<Pos>,
    pub goals: Vec<AssemblerGoal>,
    pub controls_door: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblerValues {
    pub row_sums: Vec<i32>,
    pub col_sums: Vec<i32>,
    pub total_sum: i32,
    pub cube_count: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AssemblerState {
    pub values: AssemblerValues,
    pub goal_states: Vec<bool>,
    pub is_complete: bool,
}

impl Assembler {
    /// Rows and columns are the distinct plate coordinates in ascending order.
    pub fn evaluate(&self, occupancy: &Occupancy<'_>) -> AssemblerState {
        let rows: Vec<i32> =
            self.positions.iter().map(|pos| pos.row).collect::<BTreeSet<_>>().into_iter().collect();
        let cols: Vec<i32> =
            self.positions.iter().map(|pos| pos.col).collect::<BTreeSet<_>>().into_iter().collect();

        let mut values = AssemblerValues {
            row_sums: vec![0; rows.len()],
            col_sums: vec![0; cols.len()],
            ..AssemblerValues::default()
        };
        for &plate in &self.positions {
            let Some(cube) = occupancy.at(plate) else {
                continue;
            };
            let row_index = rows.partition_point(|&row| row < plate.row);
            let col_index = cols.partition_point(|&col| col < plate.col);
            values.row_sums[row_index] += cube.value;
            values.col_sums[col_index] += cube.value;
            values.total_sum += cube.value;
            values.cube_count += 1;
        }

        let goal_states: Vec<bool> = self.goals.iter().map(|goal| goal_holds(goal, &values)).collect();
        let is_complete = goal_states.iter().all(|&met| met);
        AssemblerState { values, goal_states, is_complete }
    }
}

fn goal_holds(goal: &AssemblerGoal, values: &AssemblerValues) -> bool {
    let indexed = |sums: &[i32]| goal.index.and_then(|index| sums.get(index).copied()).unwrap_or(0);
    let current = match goal.kind {
        AssemblerGoalKind::RowSum | AssemblerGoalKind::RowParity => indexed(&values.row_sums),
        AssemblerGoalKind::ColSum | AssemblerGoalKind::ColParity => indexed(&values.col_sums),
        AssemblerGoalKind::TotalSum | AssemblerGoalKind::TotalParity => values.total_sum,
        AssemblerGoalKind::CubeCount => values.cube_count,
    };
    goal.condition.holds(current, goal.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cube;

    fn plates() -> Vec<Pos> {
        (36..=37).flat_map(|row| (8..=12).map(move |col| Pos::new(row, col))).collect()
    }

    fn assembler(goals: Vec<AssemblerGoal>) -> Assembler {
        Assembler { id: "sala1".to_string(), positions: plates(), goals, controls_door: 1 }
    }

    #[test]
    fn odd_parity_accepts_negative_values() {
        assert!(AssemblerCondition::Odd.holds(-3, 0));
        assert!(!AssemblerCondition::Odd.holds(-4, 0));
        assert!(AssemblerCondition::Even.holds(0, 0));
    }

    #[test]
    fn row_and_column_sums_follow_sorted_coordinates() {
        let cubes = [
            Cube::new(1, 2, Pos::new(36, 8)),
            Cube::new(2, -5, Pos::new(37, 8)),
            Cube::new(3, 4, Pos::new(37, 12)),
            Cube::new(4, 9, Pos::new(30, 10)),
        ];
        let occupancy = Occupancy::new(&cubes);
        let state = assembler(vec![
            AssemblerGoal::new(AssemblerGoalKind::RowSum, AssemblerCondition::Eq, -1).at(1),
            AssemblerGoal::new(AssemblerGoalKind::ColSum, AssemblerCondition::Lt, 0).at(0),
            AssemblerGoal::new(AssemblerGoalKind::ColParity, AssemblerCondition::Even, 0).at(4),
        ])
        .evaluate(&occupancy);

        assert_eq!(state.values.row_sums, vec![2, -1]);
        assert_eq!(state.values.col_sums, vec![-3, 0, 0, 0, 4]);
        assert_eq!(state.values.total_sum, 1);
        assert_eq!(state.values.cube_count, 3);
        assert_eq!(state.goal_states, vec![true, true, true]);
        assert!(state.is_complete);
    }

    #[test]
    fn missing_index_reads_as_zero() {
        let occupancy = Occupancy::default();
        let state = assembler(vec![AssemblerGoal::new(AssemblerGoalKind::RowSum, AssemblerCondition::Eq, 0)])
            .evaluate(&occupancy);
        assert!(state.is_complete);
    }

    #[test]
    fn count_and_total_goals_track_removed_cube() {
        let sala = assembler(vec![
            AssemblerGoal::new(AssemblerGoalKind::CubeCount, AssemblerCondition::Eq, 3),
            AssemblerGoal::new(AssemblerGoalKind::TotalSum, AssemblerCondition::Eq, -1),
        ]);
        let mut cubes = vec![
            Cube::new(1, 2, Pos::new(36, 9)),
            Cube::new(2, -4, Pos::new(37, 10)),
            Cube::new(3, 1, Pos::new(36, 12)),
        ];
        let state = sala.evaluate(&Occupancy::new(&cubes));
        assert_eq!(state.values.cube_count, 3);
        assert_eq!(state.values.total_sum, -1);
        assert!(state.is_complete);

        cubes.pop();
        let state = sala.evaluate(&Occupancy::new(&cubes));
        assert_eq!(state.goal_states, vec![false, false]);
        assert!(!state.is_complete);
    }
}
