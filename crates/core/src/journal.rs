use serde::{Deserialize, Serialize};

use crate::types::Direction;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub build_id: String,
    /// Fingerprint of the first level; 0 when unchecked.
    pub content_hash: u64,
    pub seed: u64,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub payload: InputPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputPayload {
    Move { direction: Direction },
    Interact,
    Restart,
    AdvanceClock { ms: u64 },
}

impl InputJournal {
    pub fn new(seed: u64) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: "dev".to_string(),
            content_hash: 0,
            seed,
            inputs: Vec::new(),
        }
    }

    pub fn with_content_hash(mut self, content_hash: u64) -> Self {
        self.content_hash = content_hash;
        self
    }

    /// Appends `payload` with the next sequence number and returns it.
    pub fn append(&mut self, payload: InputPayload) -> u64 {
        let seq = self.inputs.len() as u64;
        self.inputs.push(InputRecord { seq, payload });
        seq
    }
}
