use simulation::structure::Binding;
use simulation::test_harness::TestWorld;
use simulation::world_ledger::WorldLedger;

use super::fixtures::{catalog, empty_world, populated_world};
use crate::{build_save_data, load_world_from_bytes, save_world_to_bytes};

#[test]
fn test_latest_schema_roundtrip_is_exact() {
    let (mut source, ids) = populated_world();
    source.with_structure_world(|store, _| {
        if let Some(s) = store.get_mut(ids[0]) {
            s.trips_mut().add_generated_commuting(7);
            s.trips_mut().add_succeeded_commuting(3);
        }
    });
    source.tick(3);

    let bytes = save_world_to_bytes(source.world_mut(), false).unwrap();
    let (mut target, _, _) = empty_world();
    let report = load_world_from_bytes(target.world_mut(), &bytes).unwrap();

    assert_eq!(report.restore.restored, ids.len());
    assert!(report.restore.dropped.is_empty());
    assert!(report.restore.replaced.is_empty());
    assert_eq!(report.migration.steps_applied, 0);

    let before = build_save_data(source.world_mut()).unwrap();
    let after = build_save_data(target.world_mut()).unwrap();
    assert_eq!(after, before);
    assert_eq!(after.encode(), before.encode());
}

#[test]
fn test_roundtrip_restores_world_lists_and_maintenance() {
    let (mut source, ids) = populated_world();
    let bytes = save_world_to_bytes(source.world_mut(), true).unwrap();
    let (mut target, city, factory) = empty_world();
    load_world_from_bytes(target.world_mut(), &bytes).unwrap();

    assert_eq!(target.store().len(), ids.len());
    assert_eq!(
        target.ledger().world_list_len(),
        source.ledger().world_list_len()
    );
    let ledger = target.resource::<WorldLedger>();
    assert!(ledger.is_monument_erected("obelisk"));
    assert_eq!(
        target.structure_at(90, 20).map(|s| s.binding()),
        Some(Binding::Factory(factory))
    );
    assert_eq!(
        target.structure_at(38, 38).map(|s| s.binding()),
        Some(Binding::City(city))
    );
    assert!(target
        .structure_at(38, 38)
        .is_some_and(|s| !s.is_under_construction()));
}

#[test]
fn test_loading_twice_replaces_rather_than_appends() {
    let (mut source, ids) = populated_world();
    let bytes = save_world_to_bytes(source.world_mut(), false).unwrap();
    let (mut target, _) = populated_world();

    load_world_from_bytes(target.world_mut(), &bytes).unwrap();
    load_world_from_bytes(target.world_mut(), &bytes).unwrap();

    assert_eq!(target.store().len(), ids.len());
    assert_eq!(
        target.ledger().world_list_len(),
        source.ledger().world_list_len()
    );
}

#[test]
fn test_stale_city_index_loads_unbound() {
    let (mut source, city, _) = empty_world();
    source.build("bakery", 0, (40, 40), Binding::City(city));
    let bytes = save_world_to_bytes(source.world_mut(), false).unwrap();

    // Only one city: the saved index 1 no longer exists.
    let mut target = TestWorld::new().with_buildings(catalog());
    target.found_city("Altstadt", (10, 10), 4);
    load_world_from_bytes(target.world_mut(), &bytes).unwrap();

    assert_eq!(
        target.structure_at(40, 40).map(|s| s.binding()),
        Some(Binding::None)
    );
}

#[test]
fn test_unsaveable_world_is_refused() {
    let (mut world, _) = populated_world();
    world.world_mut().resource_mut::<WorldLedger>().nosave = true;
    assert!(matches!(
        save_world_to_bytes(world.world_mut(), false),
        Err(crate::SaveError::Unsaveable(_))
    ));
}
