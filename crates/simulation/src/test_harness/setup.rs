//! Builder methods for catalogs, cities, factories and buildings.

use std::sync::Arc;

use crate::cities::CityRegistry;
use crate::factories::FactoryRegistry;
use crate::grid::{Koord, Koord3d, TileGrid};
use crate::ids::{CityId, FactoryId, OwnerId, StructureId};
use crate::structure::Binding;
use crate::structure_catalog::{BuildingDef, BuildingDesc, FactorySector, StructureCatalog};
use crate::structure_params::StructureParams;
use crate::world_clock::WorldClock;

use super::TestWorld;

impl TestWorld {
    // -----------------------------------------------------------------------
    // World configuration
    // -----------------------------------------------------------------------

    pub fn with_params(mut self, params: StructureParams) -> Self {
        self.app.world_mut().insert_resource(params);
        self
    }

    /// Jump the world clock to `ticks`.
    pub fn with_clock(mut self, ticks: i64) -> Self {
        self.app.world_mut().insert_resource(WorldClock::at(ticks));
        self
    }

    /// Add descriptors to the catalog.
    pub fn with_buildings(mut self, defs: impl IntoIterator<Item = BuildingDef>) -> Self {
        let mut catalog = self.app.world_mut().resource_mut::<StructureCatalog>();
        for def in defs {
            catalog.insert(def.build());
        }
        self
    }

    // -----------------------------------------------------------------------
    // Cities, factories and buildings
    // -----------------------------------------------------------------------

    /// Found a city at `center` claiming the square of cells within
    /// `radius` of it.
    pub fn found_city(&mut self, name: &str, center: (i16, i16), radius: i16) -> CityId {
        let center = Koord::new(center.0, center.1);
        let world = self.app.world_mut();
        let id = world.resource_mut::<CityRegistry>().found(name, center);
        world.resource_mut::<TileGrid>().claim_area(
            center - Koord::new(radius, radius),
            center + Koord::new(radius, radius),
            id,
        );
        id
    }

    pub fn open_factory(
        &mut self,
        name: &str,
        sector: FactorySector,
        city: Option<CityId>,
    ) -> FactoryId {
        self.app
            .world_mut()
            .resource_mut::<FactoryRegistry>()
            .open(name, sector, city)
    }

    pub fn set_factory_producing(&mut self, factory: FactoryId, producing: bool) {
        self.app
            .world_mut()
            .resource_mut::<FactoryRegistry>()
            .set_producing(factory, producing);
    }

    /// Build the catalog descriptor `name` in `layout` with its origin at
    /// `(x, y)`. Panics when the descriptor is unknown.
    pub fn build(
        &mut self,
        name: &str,
        layout: u8,
        origin: (i16, i16),
        binding: Binding,
    ) -> Vec<StructureId> {
        let desc: Arc<BuildingDesc> = self
            .app
            .world()
            .resource::<StructureCatalog>()
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("unknown building '{name}'"));
        let origin = Koord3d::new(origin.0, origin.1, 0);
        self.with_structure_world(|store, world| {
            store.build(world, &desc, layout, origin, OwnerId::PUBLIC, binding)
        })
    }

    pub fn demolish(&mut self, structure: StructureId) -> Vec<StructureId> {
        self.with_structure_world(|store, world| store.demolish(world, structure))
    }

    /// Queue a demolition request for the next fixed step.
    pub fn request_demolish(&mut self, structure: StructureId) {
        self.app
            .world_mut()
            .send_event(crate::structure_systems::DemolishStructure { structure });
    }

    pub fn request_rotation(&mut self) {
        self.app
            .world_mut()
            .send_event(crate::structure_systems::RotateWorld);
    }
}
