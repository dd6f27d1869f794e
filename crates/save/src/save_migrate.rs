// ---------------------------------------------------------------------------
// Save migration logic
// ---------------------------------------------------------------------------
//
// Concrete migration steps and the `migrate_save()` entry point used by the
// load pipeline. Figures are not migrated here: records without them are
// re-derived from their descriptor by the restore stage.

use bevy::prelude::*;
use simulation::config::PERCENT_UNSET;

use crate::field_gates;
use crate::save_error::SaveError;
pub use crate::save_migrate_registry::MigrationReport;
use crate::save_migrate_registry::{MigrationRegistry, MigrationStep};
use crate::save_types::{
    MailRecord, PassengerRecord, SchemaVersion, StructureSaveData, CURRENT_SCHEMA,
};

/// Build the migration registry, oldest format change first.
pub(crate) fn build_migration_registry() -> MigrationRegistry {
    let steps = vec![
        // base < 88.2: no draw offset was stored.
        MigrationStep {
            description: "Add vertical draw offset",
            applies_to: |v| !field_gates::has_y_offset(v),
            migrate_fn: |r| {
                r.y_offset.get_or_insert(0);
            },
        },
        // extended <= 1: 32-bit construction start.
        MigrationStep {
            description: "Widen construction start to 64 bits",
            applies_to: field_gates::has_legacy_construction_start,
            migrate_fn: |r| {
                r.construction_start = Some(r.construction_start().unwrap_or(0));
                r.construction_start_legacy = None;
            },
        },
        // base < 99.6: sync byte present but meaningless.
        MigrationStep {
            description: "Drop legacy sync byte",
            applies_to: field_gates::has_legacy_sync,
            migrate_fn: |r| r.legacy_sync = None,
        },
        // extended < 11: no passenger statistics.
        MigrationStep {
            description: "Add passenger statistics",
            applies_to: |v| !field_gates::has_passenger_stats(v),
            migrate_fn: |r| {
                r.commuting.get_or_insert_with(PassengerRecord::default);
                r.visiting.get_or_insert_with(PassengerRecord::default);
            },
        },
        // extended 11: one-byte success percentages; 255 was "unset".
        MigrationStep {
            description: "Widen success percentages to 16 bits",
            applies_to: field_gates::has_narrow_percentages,
            migrate_fn: |r| {
                for stats in [&mut r.commuting, &mut r.visiting].into_iter().flatten() {
                    if stats.percent_last_year == u16::from(u8::MAX) {
                        stats.percent_last_year = PERCENT_UNSET;
                    }
                }
            },
        },
        // extended < 12: no factory flag, jobs were never tracked.
        MigrationStep {
            description: "Add factory flag and job clock",
            applies_to: |v| !field_gates::has_factory_flag(v),
            migrate_fn: |r| {
                r.is_factory.get_or_insert(false);
                r.available_jobs_by_time.get_or_insert(i64::MIN);
            },
        },
        // extended < 14.4: no mail statistics.
        MigrationStep {
            description: "Add mail statistics",
            applies_to: |v| !field_gates::has_mail_stats(v),
            migrate_fn: |r| {
                r.mail.get_or_insert_with(MailRecord::default);
            },
        },
    ];

    MigrationRegistry::new(steps, CURRENT_SCHEMA)
}

/// Validate every record against the gates of its declared schema, then
/// migrate. Logs the applied steps.
///
/// # Errors
///
/// `Corrupted` when a record carries a field its schema cannot have;
/// `VersionMismatch` for saves from a newer build.
pub fn migrate_save(save: &mut StructureSaveData) -> Result<MigrationReport, SaveError> {
    if !save.version.is_newer_than(CURRENT_SCHEMA) {
        for record in &save.structures {
            field_gates::check_gates(record, save.version).map_err(SaveError::Corrupted)?;
        }
    }

    let report = build_migration_registry().migrate(save)?;
    if report.steps_applied > 0 {
        info!(
            "Migrated {} structures from {} to {} ({} steps applied)",
            save.structures.len(),
            report.original_version,
            report.final_version,
            report.steps_applied,
        );
        for desc in &report.step_descriptions {
            info!("  - {desc}");
        }
    }
    Ok(report)
}

/// Records written as `version` would have stored them, for building old
/// saves from current state.
pub fn downgrade(save: &StructureSaveData, version: SchemaVersion) -> StructureSaveData {
    StructureSaveData {
        version,
        structures: save
            .structures
            .iter()
            .map(|r| field_gates::strip_for_version(r, version))
            .collect(),
        extensions: save.extensions.clone(),
    }
}
