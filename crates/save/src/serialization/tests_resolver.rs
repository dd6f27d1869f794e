use simulation::structure_catalog::StructureCatalog;
use simulation::test_harness::TestWorld;
use simulation::world_ledger::{MissingAssets, MissingKind};

use super::fixtures::catalog;
use crate::descriptor_resolver::ResolveStrategy;
use crate::load_world_from_bytes;
use crate::save_types::{SaveStructure, StructureSaveData, CURRENT_SCHEMA};
use crate::structure_codec::encode_file;

fn record(name: &str, x: i16, y: i16) -> SaveStructure {
    SaveStructure {
        desc_name: name.into(),
        x,
        y,
        y_offset: Some(0),
        construction_start: Some(0),
        is_factory: Some(false),
        city_index: Some(-1),
        ..Default::default()
    }
}

fn save_of(records: Vec<SaveStructure>) -> Vec<u8> {
    encode_file(
        &StructureSaveData {
            version: CURRENT_SCHEMA,
            structures: records,
            ..Default::default()
        },
        false,
    )
}

#[test]
fn test_legacy_name_is_replaced_and_unknown_name_dropped() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let bytes = save_of(vec![record("RES_foo_3", 5, 5), record("xyzzy", 6, 6)]);
    let report = load_world_from_bytes(world.world_mut(), &bytes).unwrap();

    assert_eq!(report.restore.restored, 1);
    assert_eq!(
        world.structure_at(5, 5).map(|s| s.desc().name.clone()),
        Some("cottage".to_string())
    );
    assert!(world.structure_at(6, 6).is_none());
    assert!(matches!(
        report.restore.replaced.as_slice(),
        [(name, ResolveStrategy::LevelReplacement { .. })] if name == "RES_foo_3"
    ));

    let missing = &world.resource::<MissingAssets>().entries;
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].name, "xyzzy");
    assert_eq!(missing[0].kind, MissingKind::Building);
}

#[test]
fn test_renamed_descriptor_loads_through_compatibility_table() {
    let mut world = TestWorld::new().with_buildings(catalog());
    world
        .world_mut()
        .resource_mut::<StructureCatalog>()
        .add_compatibility("backstube", "bakery");
    let bytes = save_of(vec![record("backstube", 9, 9)]);
    let report = load_world_from_bytes(world.world_mut(), &bytes).unwrap();

    assert_eq!(
        report.restore.replaced,
        vec![("backstube".to_string(), ResolveStrategy::Compatibility)]
    );
    assert_eq!(
        world.structure_at(9, 9).map(|s| s.desc().name.clone()),
        Some("bakery".to_string())
    );
    assert!(world.resource::<MissingAssets>().entries.is_empty());
}

#[test]
fn test_missing_assets_are_cleared_by_the_next_load() {
    let mut world = TestWorld::new().with_buildings(catalog());
    load_world_from_bytes(world.world_mut(), &save_of(vec![record("xyzzy", 1, 1)])).unwrap();
    assert_eq!(world.resource::<MissingAssets>().entries.len(), 1);

    load_world_from_bytes(world.world_mut(), &save_of(vec![record("bakery", 1, 1)])).unwrap();
    assert!(world.resource::<MissingAssets>().entries.is_empty());
    assert_eq!(world.store().len(), 1);
}
