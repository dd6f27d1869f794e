use std::path::Path;

use bevy::prelude::*;
use simulation::cities::CityRegistry;
use simulation::structure_store::StructureStore;
use simulation::world_ledger::WorldLedger;
use simulation::SaveableRegistry;

use crate::atomic_write::atomic_write;
use crate::collect_stage::collect_structures;
use crate::save_error::SaveError;
use crate::save_plugin::{PendingSave, SaveLoadOutcome};
use crate::save_types::{StructureSaveData, CURRENT_SCHEMA};
use crate::structure_codec::encode_file;

/// Exclusive system that performs a queued save with full world access.
pub(crate) fn exclusive_save(world: &mut World) {
    let Some(request) = world.resource_mut::<PendingSave>().0.take() else {
        return;
    };
    let outcome = match save_world_to_file(world, &request.path, request.compress) {
        Ok(bytes) => {
            info!("Saved {} bytes to {}", bytes, request.path.display());
            SaveLoadOutcome::Saved {
                path: request.path,
                bytes,
            }
        }
        Err(e) => {
            error!("Save failed: {e}");
            SaveLoadOutcome::Failed {
                path: request.path,
                message: e.to_string(),
            }
        }
    };
    world.send_event(outcome);
}

/// Gather every structure plus the registered extension resources.
///
/// # Errors
///
/// `Unsaveable` after a rotation left the world inconsistent;
/// `MissingResource` when the structure resources are not installed.
pub fn build_save_data(world: &World) -> Result<StructureSaveData, SaveError> {
    let ledger = world
        .get_resource::<WorldLedger>()
        .ok_or_else(|| SaveError::MissingResource("WorldLedger".into()))?;
    if ledger.nosave {
        return Err(SaveError::Unsaveable(
            "a rotation could not be applied to every structure".into(),
        ));
    }
    if ledger.nosave_warning {
        warn!("Saving after a rotation that may not reload faithfully");
    }

    let store = world
        .get_resource::<StructureStore>()
        .ok_or_else(|| SaveError::MissingResource("StructureStore".into()))?;
    let cities = world
        .get_resource::<CityRegistry>()
        .ok_or_else(|| SaveError::MissingResource("CityRegistry".into()))?;
    let extensions = world
        .get_resource::<SaveableRegistry>()
        .map(|registry| registry.save_all(world))
        .unwrap_or_default();

    Ok(StructureSaveData {
        version: CURRENT_SCHEMA,
        structures: collect_structures(store, cities),
        extensions,
    })
}

/// Encoded save file for the current world.
pub fn save_world_to_bytes(world: &World, compress: bool) -> Result<Vec<u8>, SaveError> {
    let save = build_save_data(world)?;
    debug!(
        "Encoding {} structures and {} extensions",
        save.structures.len(),
        save.extensions.len()
    );
    Ok(encode_file(&save, compress))
}

/// Writes the save file atomically and returns its size.
pub fn save_world_to_file(
    world: &World,
    path: impl AsRef<Path>,
    compress: bool,
) -> Result<usize, SaveError> {
    let bytes = save_world_to_bytes(world, compress)?;
    atomic_write(path, &bytes)?;
    Ok(bytes.len())
}
