use crate::grid::Koord3d;
use crate::structure::Binding;
use crate::structure_catalog::{BuildingDef, BuildingType};
use crate::structure_params::StructureParams;
use crate::test_harness::TestWorld;

#[test]
fn test_rotation_moves_and_relayouts_building() {
    let mut world = TestWorld::new().with_buildings(vec![BuildingDef::new(
        "terrace",
        BuildingType::Commercial,
        1,
    )
    .size(2, 1)
    .layouts(2)]);
    let ids = world.build("terrace", 0, (10, 20), Binding::None);

    world.request_rotation();
    world.tick(1);

    assert_eq!(world.resource::<StructureParams>().rotation, 1);
    assert_eq!(world.structure(ids[0]).pos(), Koord3d::new(107, 10, 0));
    assert_eq!(world.structure(ids[1]).pos(), Koord3d::new(107, 11, 0));
    for &id in &ids {
        let s = world.structure(id);
        assert_eq!(s.tile().layout(), 1);
        assert_eq!(s.footprint().len(), 2);
    }
    assert_eq!(world.structure_at(107, 11).map(|s| s.id()), Some(ids[1]));
    assert!(world.structure_at(10, 20).is_none());
    assert!(!world.ledger().nosave);
}

#[test]
fn test_four_rotations_return_home() {
    let mut world = TestWorld::new().with_buildings(vec![BuildingDef::new(
        "hut",
        BuildingType::Residential,
        1,
    )]);
    let id = world.build("hut", 0, (5, 9), Binding::None)[0];
    for _ in 0..4 {
        world.request_rotation();
        world.tick(1);
    }
    assert_eq!(world.structure(id).pos(), Koord3d::new(5, 9, 0));
    assert_eq!(world.resource::<StructureParams>().rotation, 0);
}
