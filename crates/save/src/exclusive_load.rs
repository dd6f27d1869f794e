use std::path::Path;

use bevy::prelude::*;
use simulation::ids::StructureId;
use simulation::structure_store::with_structure_world;
use simulation::world_ledger::{MissingAssets, WorldLedger};
use simulation::SaveableRegistry;

use crate::restore_stage::{restore_structures, RestoreReport};
use crate::save_error::SaveError;
use crate::save_migrate::{migrate_save, MigrationReport};
use crate::save_plugin::{PendingLoadBytes, SaveLoadOutcome};
use crate::structure_codec::decode_file;

/// Summary of one successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub migration: MigrationReport,
    pub restore: RestoreReport,
}

/// Exclusive system that performs a queued load with full world access.
pub(crate) fn exclusive_load(world: &mut World) {
    let Some((path, bytes)) = world.resource_mut::<PendingLoadBytes>().0.take() else {
        return;
    };
    let outcome = match load_world_from_bytes(world, &bytes) {
        Ok(report) => {
            info!(
                "Loaded {} structures from {} ({} dropped)",
                report.restore.restored,
                path.display(),
                report.restore.dropped.len()
            );
            SaveLoadOutcome::Loaded {
                path,
                restored: report.restore.restored,
                dropped: report.restore.dropped.len(),
            }
        }
        Err(e) => {
            error!("Load failed: {e}");
            SaveLoadOutcome::Failed {
                path,
                message: e.to_string(),
            }
        }
    };
    world.send_event(outcome);
}

/// Removes every structure with full bookkeeping, then resets the ledger
/// and the missing-asset list.
pub fn reset_structures(world: &mut World) {
    with_structure_world(world, |store, sw| {
        let ids: Vec<StructureId> = store.iter().map(|s| s.id()).collect();
        for id in ids {
            store.destroy(sw, id);
        }
        store.clear();
        *sw.ledger = WorldLedger::default();
    });
    world.insert_resource(MissingAssets::default());
}

/// Decodes and migrates `bytes`, then replaces the world's structures and
/// extension resources with the saved ones. A save that fails to decode or
/// migrate leaves the world untouched.
pub fn load_world_from_bytes(world: &mut World, bytes: &[u8]) -> Result<LoadReport, SaveError> {
    let mut save = decode_file(bytes)?;
    let migration = migrate_save(&mut save)?;

    reset_structures(world);

    // Parameters, clock and rng first: restoring reads them.
    if let Some(registry) = world.remove_resource::<SaveableRegistry>() {
        registry.load_all(world, &save.extensions);
        world.insert_resource(registry);
    }

    let restore = restore_structures(world, save.structures);
    Ok(LoadReport { migration, restore })
}

pub fn load_world_from_file(
    world: &mut World,
    path: impl AsRef<Path>,
) -> Result<LoadReport, SaveError> {
    let bytes = std::fs::read(path)?;
    load_world_from_bytes(world, &bytes)
}
