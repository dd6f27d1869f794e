use simulation::config::PERCENT_UNSET;
use simulation::structure::Binding;

use super::fixtures::{empty_world, populated_world};
use crate::save_types::{SchemaVersion, StructureSaveData, CURRENT_SCHEMA};
use crate::structure_codec::encode_file;
use crate::{build_save_data, load_world_from_bytes, SaveError};

fn old_save_bytes(version: SchemaVersion) -> Vec<u8> {
    let (mut source, _) = populated_world();
    let current = build_save_data(source.world_mut()).unwrap();
    encode_file(&crate::save_migrate::downgrade(&current, version), false)
}

#[test]
fn test_figures_are_rederived_for_schema_without_them() {
    let (source, _) = populated_world();
    let bytes = old_save_bytes(SchemaVersion::new(99, 16, 12, 0));
    let (mut target, city, _) = empty_world();
    let report = load_world_from_bytes(target.world_mut(), &bytes).unwrap();

    assert_eq!(report.migration.final_version, CURRENT_SCHEMA);
    assert!(report
        .migration
        .step_descriptions
        .contains(&"Add mail statistics"));
    for (x, y) in [(38, 38), (42, 40)] {
        let loaded = target.structure_at(x, y).map(|s| *s.figures());
        let original = source.structure_at(x, y).map(|s| *s.figures());
        assert!(loaded.is_some());
        assert_eq!(loaded, original);
    }
    assert_eq!(
        target.structure_at(42, 40).map(|s| s.binding()),
        Some(Binding::City(city))
    );
    // No factory ids before extended 15: the sawmill comes back unbound.
    assert_eq!(
        target.structure_at(90, 20).map(|s| s.binding()),
        Some(Binding::None)
    );
    assert!(target
        .structure_at(42, 40)
        .is_some_and(|s| s.trips().mail_delivery_succeeded_last_year == PERCENT_UNSET));
}

#[test]
fn test_oldest_schema_loads_with_defaults() {
    let bytes = old_save_bytes(SchemaVersion::new(88, 1, 0, 0));
    let (mut target, city, _) = empty_world();
    let report = load_world_from_bytes(target.world_mut(), &bytes).unwrap();

    assert_eq!(report.migration.steps_applied, 6);
    assert_eq!(report.restore.restored, target.store().len());
    let bakery = target.structure_at(42, 40);
    assert!(bakery.is_some_and(|s| s.y_offset() == 0));
    assert!(bakery.is_some_and(|s| s.job_clock().available_by == i64::MIN));
    assert!(bakery.is_some_and(|s| {
        s.trips().passenger_success_percent_last_year_commuting == PERCENT_UNSET
    }));
    // No city index before 99.14: rebinding goes by the city under the tile.
    assert_eq!(bakery.map(|s| s.binding()), Some(Binding::City(city)));
}

#[test]
fn test_newer_save_is_rejected_and_world_untouched() {
    let (mut world, ids) = populated_world();
    let newer = StructureSaveData {
        version: SchemaVersion::new(130, 0, 15, 0),
        ..Default::default()
    };
    let err = load_world_from_bytes(world.world_mut(), &encode_file(&newer, false)).unwrap_err();

    assert!(matches!(err, SaveError::VersionMismatch { .. }), "got: {err}");
    assert_eq!(world.store().len(), ids.len());
}

#[test]
fn test_record_with_field_from_later_schema_is_corrupted() {
    let (mut source, _) = populated_world();
    let mut save = build_save_data(source.world_mut()).unwrap();
    save.version = SchemaVersion::new(99, 16, 12, 0);

    let (mut target, _, _) = empty_world();
    let err = load_world_from_bytes(target.world_mut(), &encode_file(&save, true)).unwrap_err();

    assert!(matches!(err, SaveError::Corrupted(_)), "got: {err}");
    assert!(target.store().is_empty());
}
