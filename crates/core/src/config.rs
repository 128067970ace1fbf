//! Tunables for level generation and session timing.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Distinct rock archetypes requested per carved room.
    pub shapes_per_room: usize,
    pub placement_attempts: usize,
    /// Floor tiles a placement may strand from the main component.
    pub reachability_slack: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self { shapes_per_room: 4, placement_attempts: 150, reachability_slack: 2 }
    }
}

/// Delays are milliseconds on the session clock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub generation: GenerationConfig,
    pub evaporation_ms: u64,
    pub inversion_ms: u64,
    pub conversion_ms: u64,
    pub converter_cooldown_ms: u64,
    pub congratulation_ms: u64,
    pub final_congratulation_ms: u64,
    pub transition_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            generation: GenerationConfig::default(),
            evaporation_ms: 300,
            inversion_ms: 100,
            conversion_ms: 500,
            converter_cooldown_ms: 500,
            congratulation_ms: 2_500,
            final_congratulation_ms: 10_000,
            transition_ms: 1_500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"evaporation_ms": 50, "generation": {"placement_attempts": 10}}"#)
                .expect("config should parse");
        assert_eq!(config.evaporation_ms, 50);
        assert_eq!(config.generation.placement_attempts, 10);
        assert_eq!(config.generation.shapes_per_room, 4);
        assert_eq!(config.transition_ms, 1_500);
    }
}
