//! Seeded randomness for structure placement.
//!
//! Structures draw from this generator when they pick a starting animation
//! frame and when a trip generator asks for a random wealth class. The state
//! is persisted in the save's extension map so a reloaded world continues
//! the same sequence.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DEFAULT_SEED: u64 = 42;

/// Position of a `ChaCha8Rng` within its keystream.
#[derive(Encode, Decode, Debug, PartialEq, Eq)]
struct StreamPosition {
    seed: [u8; 32],
    stream: u64,
    word_pos: u128,
}

impl From<&ChaCha8Rng> for StreamPosition {
    fn from(rng: &ChaCha8Rng) -> Self {
        Self {
            seed: rng.get_seed(),
            stream: rng.get_stream(),
            word_pos: rng.get_word_pos(),
        }
    }
}

impl From<StreamPosition> for ChaCha8Rng {
    fn from(pos: StreamPosition) -> Self {
        let mut rng = ChaCha8Rng::from_seed(pos.seed);
        rng.set_stream(pos.stream);
        rng.set_word_pos(pos.word_pos);
        rng
    }
}

/// Generator shared by every structure in the world.
#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl crate::Saveable for SimRng {
    const SAVE_KEY: &'static str = "structure_rng";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(&StreamPosition::from(&self.0)))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        match bitcode::decode::<StreamPosition>(bytes) {
            Ok(pos) => Self(pos.into()),
            Err(e) => {
                warn!("Structure RNG state unreadable, reseeding: {}", e);
                Self::default()
            }
        }
    }
}

pub struct SimRngPlugin;

impl Plugin for SimRngPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimRng>();
        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<SimRng>();
    }
}
