//! Monotonic world tick counter driving construction and animation.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::structure_params::StructureParams;

/// World ticks since the game started. Monotonic within a session; only
/// rebased when an old save is migrated.
#[derive(
    Resource,
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct WorldClock {
    pub ticks: i64,
    /// Ticks advanced by the most recent step.
    pub last_delta: u32,
}

impl WorldClock {
    pub fn at(ticks: i64) -> Self {
        Self {
            ticks,
            last_delta: 0,
        }
    }

    pub fn now(&self) -> i64 {
        self.ticks
    }

    pub fn advance(&mut self, delta: u32) {
        self.ticks += i64::from(delta);
        self.last_delta = delta;
    }

    pub fn current_month(&self, params: &StructureParams) -> i64 {
        params.month_at(self.ticks)
    }
}

impl crate::Saveable for WorldClock {
    const SAVE_KEY: &'static str = "world_clock";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

/// Advances the clock by one fixed step worth of ticks.
pub fn advance_world_clock(mut clock: ResMut<WorldClock>, params: Res<StructureParams>) {
    clock.advance(params.ticks_per_step);
}
