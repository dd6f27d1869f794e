use bevy::prelude::*;
use std::collections::BTreeMap;

pub mod animated;
pub mod cities;
pub mod config;
pub mod demand;
pub mod factories;
pub mod frame_events;
pub mod grid;
pub mod ids;
pub mod job_replenishment;
pub mod sim_rng;
pub mod simulation_sets;
pub mod structure;
pub mod structure_catalog;
pub mod structure_params;
pub mod structure_store;
pub mod structure_systems;
pub mod world_clock;
pub mod world_ledger;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;

#[cfg(test)]
mod integration_tests;

use simulation_sets::SimulationSet;

// ---------------------------------------------------------------------------
// Extension map: world resources stored beside the structure records
// ---------------------------------------------------------------------------

/// A world resource persisted under its own key in the save's extension map.
///
/// The clock, the simulation parameters and the RNG ride along this way so
/// the structure codec never has to know their layout.
pub trait Saveable: Resource + Default + Send + Sync + 'static {
    /// Extension map key. Changing it orphans older saves.
    const SAVE_KEY: &'static str;

    /// `None` leaves the key out of the save.
    fn save_to_bytes(&self) -> Option<Vec<u8>>;

    fn load_from_bytes(bytes: &[u8]) -> Self;
}

/// Bitcode-decodes an extension entry, falling back to `T::default()` with a
/// warning when the bytes are unreadable.
pub fn decode_or_warn<T: bitcode::DecodeOwned + Default>(key: &str, bytes: &[u8]) -> T {
    bitcode::decode(bytes).unwrap_or_else(|e| {
        warn!(
            "Extension '{}' unreadable ({} bytes), using defaults: {}",
            key,
            bytes.len(),
            e
        );
        T::default()
    })
}

pub type SaveFn = Box<dyn Fn(&World) -> Option<Vec<u8>> + Send + Sync>;
pub type LoadFn = Box<dyn Fn(&mut World, &[u8]) + Send + Sync>;

/// Type-erased accessors for one registered resource.
pub struct SaveableEntry {
    pub key: String,
    pub save_fn: SaveFn,
    pub load_fn: LoadFn,
}

/// Every resource that plugins registered for the extension map.
#[derive(Resource, Default)]
pub struct SaveableRegistry {
    pub entries: Vec<SaveableEntry>,
}

impl SaveableRegistry {
    /// Registers `T` under its `SAVE_KEY`. A second registration of the same
    /// key is ignored with a warning (and trips a debug assertion).
    pub fn register<T: Saveable>(&mut self) {
        if self.entries.iter().any(|e| e.key == T::SAVE_KEY) {
            warn!("Extension key '{}' registered twice", T::SAVE_KEY);
            debug_assert!(false, "duplicate extension key '{}'", T::SAVE_KEY);
            return;
        }
        self.entries.push(SaveableEntry {
            key: T::SAVE_KEY.to_string(),
            save_fn: Box::new(|world: &World| {
                world.get_resource::<T>().and_then(|r| r.save_to_bytes())
            }),
            load_fn: Box::new(|world: &mut World, bytes: &[u8]| {
                world.insert_resource(T::load_from_bytes(bytes));
            }),
        });
    }

    pub fn save_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .iter()
            .filter_map(|entry| Some((entry.key.clone(), (entry.save_fn)(world)?)))
            .collect()
    }

    /// Restores every registered key present in `extensions`; absent keys
    /// leave their resource untouched.
    pub fn load_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) {
        for entry in &self.entries {
            if let Some(bytes) = extensions.get(&entry.key) {
                (entry.load_fn)(world, bytes);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::PreSim,
                SimulationSet::Simulation,
                SimulationSet::PostSim,
            )
                .chain(),
        );

        app.add_plugins((
            structure_params::StructureParamsPlugin,
            sim_rng::SimRngPlugin,
            structure_systems::StructuresPlugin,
        ));
    }
}
