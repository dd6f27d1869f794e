//! Tick control and resource accessors.

use bevy::prelude::*;

use crate::cities::CityRegistry;
use crate::grid::{Koord, TileGrid};
use crate::ids::StructureId;
use crate::structure::Structure;
use crate::structure_store::StructureStore;
use crate::world_clock::WorldClock;
use crate::world_ledger::WorldLedger;

use super::TestWorld;

impl TestWorld {
    // -----------------------------------------------------------------------
    // Tick control
    // -----------------------------------------------------------------------

    /// Run `n` fixed simulation steps.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    /// The wrapped app, for tests that add further plugins.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to any resource.
    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn store(&self) -> &StructureStore {
        self.resource::<StructureStore>()
    }

    pub fn grid(&self) -> &TileGrid {
        self.resource::<TileGrid>()
    }

    pub fn ledger(&self) -> &WorldLedger {
        self.resource::<WorldLedger>()
    }

    pub fn cities(&self) -> &CityRegistry {
        self.resource::<CityRegistry>()
    }

    pub fn now(&self) -> i64 {
        self.resource::<WorldClock>().now()
    }

    /// The structure with `id`. Panics when it does not exist.
    pub fn structure(&self, id: StructureId) -> &Structure {
        self.store()
            .get(id)
            .unwrap_or_else(|| panic!("structure {} does not exist", id.0))
    }

    pub fn structure_at(&self, x: i16, y: i16) -> Option<&Structure> {
        self.store().structure_at(self.grid(), Koord::new(x, y))
    }
}
