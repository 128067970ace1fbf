//! Level phase, named gates and the level-won condition.

pub mod controller;
pub mod rules;

pub use controller::{
    ASSEMBLER_BONUS, DOOR_OPEN_BONUS, GATE_OPEN_BONUS, PHASE_BONUS, ProgressEvent, ProgressState, ProgressUpdate,
    ProgressionController, STATION_BONUS,
};
pub use rules::{
    Condition, GateRule, LevelRules, MAIN_GATE, PhasePolicy, PhaseRule, PhaseStep, RuleContext,
    SECRET_CHAMBER_GATE, WinRule,
};
