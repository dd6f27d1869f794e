// ---------------------------------------------------------------------------
// Serialization: re-exports of the save pipeline + end-to-end tests
// ---------------------------------------------------------------------------
//
// Saving collects live structures into `SaveStructure` records at the
// current schema and wraps them in the file envelope. Loading reverses it:
//
//   bytes -> header/LZ4 -> bitcode -> gate check -> migration
//         -> reset world -> extension resources -> descriptor resolution
//         -> restore -> finish_load

pub use crate::save_migrate::*;
pub use crate::save_types::*;
pub use crate::structure_codec::*;

#[cfg(test)]
mod tests_file_envelope;
#[cfg(test)]
mod tests_migration_chain;
#[cfg(test)]
mod tests_resolver;
#[cfg(test)]
mod tests_roundtrip;

#[cfg(test)]
pub(crate) mod fixtures {
    use simulation::ids::{CityId, FactoryId, StructureId};
    use simulation::structure::Binding;
    use simulation::structure_catalog::{BuildingDef, BuildingType, FactorySector};
    use simulation::test_harness::TestWorld;

    pub fn catalog() -> Vec<BuildingDef> {
        vec![
            BuildingDef::new("cottage", BuildingType::Residential, 2),
            BuildingDef::new("villa", BuildingType::Residential, 3).size(2, 1),
            BuildingDef::new("bakery", BuildingType::Commercial, 1),
            BuildingDef::new("museum", BuildingType::AttractionCity, 2),
            BuildingDef::new("sawmill", BuildingType::Factory, 1).no_construction_pit(),
            BuildingDef::new("obelisk", BuildingType::Monument, 1).no_construction_pit(),
        ]
    }

    /// Catalog, two cities and one factory, identical for every call.
    pub fn empty_world() -> (TestWorld, CityId, FactoryId) {
        let mut world = TestWorld::new().with_buildings(catalog());
        world.found_city("Altstadt", (10, 10), 4);
        let city = world.found_city("Neustadt", (40, 40), 6);
        let factory = world.open_factory("Sawmill", FactorySector::Producer, Some(city));
        (world, city, factory)
    }

    /// `empty_world` with a handful of buildings of every binding kind.
    pub fn populated_world() -> (TestWorld, Vec<StructureId>) {
        let (mut world, city, factory) = empty_world();
        let mut ids = Vec::new();
        ids.extend(world.build("cottage", 0, (38, 38), Binding::City(city)));
        ids.extend(world.build("villa", 0, (40, 42), Binding::City(city)));
        ids.extend(world.build("bakery", 0, (42, 40), Binding::City(city)));
        ids.extend(world.build("museum", 0, (70, 70), Binding::None));
        ids.extend(world.build("sawmill", 0, (90, 20), Binding::Factory(factory)));
        ids.extend(world.build("obelisk", 0, (100, 100), Binding::None));
        (world, ids)
    }
}
