//! Stable snapshot hashing for deterministic verification.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.clock_ms);
        hasher.write_u64(self.level_index as u64);
        hasher.write_u64(self.level.fingerprint());
        hasher.write_u8(match self.status {
            SessionStatus::Playing => 0,
            SessionStatus::Celebrating => 1,
            SessionStatus::Transitioning => 2,
            SessionStatus::Finished => 3,
        });
        hasher.write_u32(self.score);
        hasher.write_u32(self.level_start_score);
        hasher.write_u32(self.next_cube_id);
        hasher.write_i32(self.player.row);
        hasher.write_i32(self.player.col);
        hasher.write_u8(self.progress.phase);
        for (name, open) in &self.progress.gates {
            hasher.write(name.as_bytes());
            hasher.write_u8(u8::from(*open));
        }
        for cube in self.cubes() {
            hasher.write_u32(cube.id.0);
            hasher.write_i32(cube.value);
            hasher.write_i32(cube.position.row);
            hasher.write_i32(cube.position.col);
            hasher.write_u8(u8::from(cube.is_active()));
        }
        for prize in &self.prizes {
            hasher.write_u32(prize.id);
        }
        hasher.write_u8(u8::from(self.has_key));
        hasher.write_u64(self.effects.len() as u64);
        hasher.finish()
    }
}
