use crate::animated::AnimatedStructures;
use crate::frame_events::DirtyFrames;
use crate::grid::Koord;
use crate::ids::OwnerId;
use crate::structure::Binding;
use crate::structure_catalog::{BuildingDef, BuildingType, FactorySector};
use crate::structure_params::StructureParams;
use crate::structure_store::StructureStore;
use crate::test_harness::TestWorld;

fn catalog() -> Vec<BuildingDef> {
    vec![
        BuildingDef::new("row_houses", BuildingType::Residential, 2).size(2, 2),
        BuildingDef::new("kiosk", BuildingType::Commercial, 1),
        BuildingDef::new("museum", BuildingType::AttractionCity, 3),
        BuildingDef::new("obelisk", BuildingType::Monument, 1).no_construction_pit(),
        BuildingDef::new("brewery", BuildingType::Factory, 2).no_construction_pit(),
    ]
}

// ===========================================================================
// Placement
// ===========================================================================

#[test]
fn test_build_places_every_tile() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let ids = world.build("row_houses", 0, (20, 20), Binding::None);
    assert_eq!(ids.len(), 4);

    for &id in &ids {
        let s = world.structure(id);
        assert_eq!(s.footprint().len(), 4);
        assert!(world.ledger().in_world_list(id));
    }
    assert_eq!(world.structure_at(21, 21).map(|s| s.id()), Some(ids[3]));
    assert_eq!(
        world.ledger().maintenance_of(OwnerId::PUBLIC),
        4 * 2 * StructureParams::default().maint_building
    );
}

#[test]
fn test_footprint_skips_missing_fragment() {
    let mut world = TestWorld::new().with_buildings(vec![BuildingDef::new(
        "granary",
        BuildingType::Commercial,
        1,
    )
    .size(2, 3)]);
    let ids = world.build("granary", 0, (10, 10), Binding::None);
    assert_eq!(ids.len(), 6);
    let sizes: Vec<usize> = ids
        .iter()
        .map(|&id| world.structure(id).footprint().len())
        .collect();
    assert_eq!(sizes, vec![6; 6]);

    let lost = world
        .structure_at(11, 12)
        .map(|s| s.id())
        .expect("corner tile placed");
    let survivor = world
        .structure_at(10, 10)
        .map(|s| s.id())
        .expect("origin tile placed");
    let footprint = world.with_structure_world(|store, w| {
        store.destroy(w, lost);
        let s = store.get_mut(survivor).expect("origin tile survives");
        s.recompute_footprint(w.grid);
        s.footprint().to_vec()
    });

    assert_eq!(footprint.len(), 5);
    assert!(!footprint.contains(&Koord::new(11, 12)));
    assert!(world.structure_at(11, 12).is_none());
}

#[test]
fn test_construction_finishes_on_schedule() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let ids = world.build("row_houses", 0, (20, 20), Binding::None);
    assert_eq!(world.resource::<AnimatedStructures>().len(), 4);

    world.tick(50);
    assert!(ids.iter().all(|&id| world.structure(id).is_under_construction()));

    world.tick(1);
    assert!(ids.iter().all(|&id| !world.structure(id).is_under_construction()));
    assert!(world.resource::<AnimatedStructures>().is_empty());
    assert_eq!(world.resource::<DirtyFrames>().marks.len(), 4);
}

// ===========================================================================
// Demolition
// ===========================================================================

#[test]
fn test_demolish_request_removes_whole_building() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let ids = world.build("row_houses", 0, (20, 20), Binding::None);

    world.request_demolish(ids[2]);
    world.tick(1);

    assert!(world.store().is_empty());
    assert!(world.structure_at(20, 20).is_none());
    assert_eq!(world.ledger().world_list_len(), 0);
    assert_eq!(world.ledger().maintenance_of(OwnerId::PUBLIC), 0);
    assert!(world.resource::<AnimatedStructures>().is_empty());
}

#[test]
fn test_demolish_leaves_neighbours_standing() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let houses = world.build("row_houses", 0, (20, 20), Binding::None);
    let kiosk = world.build("kiosk", 0, (22, 20), Binding::None);

    let removed = world.demolish(houses[0]);
    assert_eq!(removed.len(), 4);
    assert_eq!(world.store().len(), 1);
    assert_eq!(world.structure(kiosk[0]).footprint(), &[Koord::new(22, 20)]);
}

#[test]
fn test_attraction_lifecycle() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let ids = world.build("museum", 0, (40, 40), Binding::None);
    assert!(world.ledger().is_attraction(ids[0]));

    world.demolish(ids[0]);
    assert!(!world.ledger().is_attraction(ids[0]));
}

#[test]
fn test_monument_is_recorded() {
    let mut world = TestWorld::new().with_buildings(catalog());
    world.build("obelisk", 0, (50, 50), Binding::None);
    assert!(world.ledger().is_monument_erected("obelisk"));
}

// ===========================================================================
// Factories
// ===========================================================================

#[test]
fn test_factory_tiles_resolve_visitor_demand_and_skip_world_list() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let factory = world.open_factory("brewery", FactorySector::EndConsumer, None);
    let ids = world.build("brewery", 0, (60, 60), Binding::Factory(factory));

    let s = world.structure(ids[0]);
    assert!(s.is_factory());
    assert_eq!(s.visitor_demand(), 2 * StructureParams::default().visitor_demand_per_level);
    assert!(!s.figures().visitor_demand_pending);
    assert!(!world.ledger().in_world_list(ids[0]));
}

#[test]
fn test_producer_factory_has_no_visitors() {
    let mut world = TestWorld::new().with_buildings(catalog());
    let factory = world.open_factory("farm", FactorySector::Producer, None);
    let ids = world.build("brewery", 0, (60, 60), Binding::Factory(factory));
    assert_eq!(world.structure(ids[0]).visitor_demand(), 0);
}

// ===========================================================================
// Yearly rollover
// ===========================================================================

#[test]
fn test_year_change_rolls_trip_statistics() {
    let params = StructureParams {
        ticks_per_world_month_shift: 6,
        ..Default::default()
    };
    let mut world = TestWorld::new()
        .with_params(params)
        .with_buildings(catalog());
    let id = world.build("kiosk", 0, (30, 30), Binding::None)[0];
    world.tick(1);

    if let Some(s) = world.world_mut().resource_mut::<StructureStore>().get_mut(id) {
        s.trips_mut().add_generated_visiting(10);
        s.trips_mut().add_succeeded_visiting(7);
    }
    world.tick(10);

    let trips = world.structure(id).trips();
    assert_eq!(trips.passengers_generated_visiting, 0);
    assert_eq!(trips.passenger_success_percent_last_year_visiting, 7);
}
