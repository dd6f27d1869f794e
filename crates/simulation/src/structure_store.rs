//! Owner of every placed [`Structure`] and the entry point for creation,
//! destruction, stepping, yearly rollover, rotation and reload.
//!
//! Operations that touch the grid, the registries or the ledger take a
//! [`StructureWorld`] so the order of side effects stays in one place.

use std::collections::BTreeMap;
use std::sync::Arc;

use bevy::prelude::*;

use crate::animated::AnimatedStructures;
use crate::cities::CityRegistry;
use crate::demand;
use crate::factories::FactoryRegistry;
use crate::frame_events::FrameObserver;
use crate::grid::{Fragment, Koord, Koord3d, TileGrid};
use crate::ids::{CityId, FactoryId, OwnerId, StructureId};
use crate::sim_rng::SimRng;
use crate::structure::{
    Binding, BindingConflict, RotationHazard, Structure, StructureEnv, StructureSnapshot,
    SyncResult, WorldListMembership,
};
use crate::structure_catalog::{BuildingDesc, BuildingType, TileRef};
use crate::structure_params::StructureParams;
use crate::world_clock::WorldClock;
use crate::world_ledger::WorldLedger;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Borrowed world state for lifecycle operations.
pub struct StructureWorld<'a> {
    pub params: &'a StructureParams,
    pub now: i64,
    pub grid: &'a mut TileGrid,
    pub cities: &'a CityRegistry,
    pub factories: &'a FactoryRegistry,
    pub animated: &'a AnimatedStructures,
    pub ledger: &'a mut WorldLedger,
    pub rng: &'a mut SimRng,
}

impl<'a> StructureWorld<'a> {
    pub fn env(&self) -> StructureEnv<'a> {
        StructureEnv {
            now: self.now,
            params: self.params,
            factories: self.factories,
            animated: self.animated,
        }
    }
}

/// Runs `f` with the store and a [`StructureWorld`] borrowed from `world`'s
/// resources. Used by exclusive systems such as save and load.
pub fn with_structure_world<R>(
    world: &mut World,
    f: impl FnOnce(&mut StructureStore, &mut StructureWorld) -> R,
) -> R {
    world.resource_scope(|world, mut store: Mut<StructureStore>| {
        world.resource_scope(|world, mut grid: Mut<TileGrid>| {
            world.resource_scope(|world, mut ledger: Mut<WorldLedger>| {
                world.resource_scope(|world, mut rng: Mut<SimRng>| {
                    let mut structure_world = StructureWorld {
                        params: world.resource::<StructureParams>(),
                        now: world.resource::<WorldClock>().now(),
                        grid: &mut grid,
                        cities: world.resource(),
                        factories: world.resource(),
                        animated: world.resource(),
                        ledger: &mut ledger,
                        rng: &mut rng,
                    };
                    f(&mut store, &mut structure_world)
                })
            })
        })
    })
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Resource, Debug, Default)]
pub struct StructureStore {
    structures: BTreeMap<StructureId, Structure>,
    next_id: u32,
}

impl StructureStore {
    fn allocate_id(&mut self) -> StructureId {
        let id = StructureId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(&id)
    }

    pub fn get_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.structures.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    pub fn structure_at(&self, grid: &TileGrid, k: Koord) -> Option<&Structure> {
        let fragment = grid.lookup(k)?.find_structure_fragment()?;
        self.get(fragment.structure)
    }

    /// Drops every structure without any bookkeeping (new game / before a
    /// load).
    pub fn clear(&mut self) {
        self.structures.clear();
        self.next_id = 0;
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    /// Places a single structure tile and charges its maintenance.
    pub fn create(
        &mut self,
        world: &mut StructureWorld,
        pos: Koord3d,
        owner: OwnerId,
        tile: TileRef,
    ) -> StructureId {
        let id = self.allocate_id();
        let env = world.env();
        let mut structure = Structure::new(id, pos, owner, tile.clone(), &env, &mut world.rng.0);
        world
            .ledger
            .add_maintenance(owner, structure.maintenance(world.params));
        world.grid.place_fragment(pos.xy(), Fragment { structure: id, tile });
        structure.recompute_footprint(world.grid);
        self.structures.insert(id, structure);
        id
    }

    /// Places every image-bearing tile of `desc` in `layout` with its
    /// origin at `origin`, binds the tiles and registers them with the
    /// world lists. Returns the new ids in tile order.
    pub fn build(
        &mut self,
        world: &mut StructureWorld,
        desc: &Arc<BuildingDesc>,
        layout: u8,
        origin: Koord3d,
        owner: OwnerId,
        binding: Binding,
    ) -> Vec<StructureId> {
        let tiles: Vec<TileRef> = desc
            .tiles
            .iter()
            .filter(|t| t.layout == layout && t.has_image)
            .filter_map(|t| TileRef::new(Arc::clone(desc), t.index))
            .collect();

        let mut ids = Vec::with_capacity(tiles.len());
        for tile in tiles {
            let is_origin = tile.offset() == Koord::ORIGIN;
            let id = self.create(world, origin + tile.offset(), owner, tile);
            let Some(structure) = self.structures.get_mut(&id) else {
                continue;
            };
            match binding {
                Binding::City(city) => {
                    structure.binding = Binding::City(city);
                    if let Some(c) = world.cities.get(city) {
                        c.add_member(id);
                    }
                    world.ledger.add_to_world_list(id);
                    structure.world_list = WorldListMembership::Listed;
                }
                Binding::Factory(factory) => {
                    structure.binding = Binding::Factory(factory);
                    if let Some(f) = world.factories.get(factory) {
                        demand::resolve_factory_visitor_demand(
                            &mut structure.figures,
                            desc,
                            world.params,
                            f.sector,
                        );
                    }
                    structure.world_list = WorldListMembership::Excluded;
                }
                Binding::None => {
                    world.ledger.add_to_world_list(id);
                    structure.world_list = WorldListMembership::Listed;
                }
            }
            if is_origin && desc.is_attraction() {
                world.ledger.add_attraction(id);
            }
            ids.push(id);
        }

        if desc.building_type == BuildingType::Monument {
            world.ledger.monument_erected(&desc.name);
        }
        for id in &ids {
            if let Some(s) = self.structures.get_mut(id) {
                s.recompute_footprint(world.grid);
            }
        }
        ids
    }

    // -----------------------------------------------------------------------
    // Binding
    // -----------------------------------------------------------------------

    pub fn bind_city(
        &mut self,
        id: StructureId,
        city: Option<CityId>,
    ) -> Result<(), BindingConflict> {
        match self.structures.get_mut(&id) {
            Some(s) => s.bind_city(city),
            None => Ok(()),
        }
    }

    /// Binds to a factory and settles any deferred visitor demand using the
    /// factory's sector.
    pub fn bind_factory(
        &mut self,
        id: StructureId,
        factory: Option<FactoryId>,
        factories: &FactoryRegistry,
        params: &StructureParams,
    ) -> Result<(), BindingConflict> {
        let Some(s) = self.structures.get_mut(&id) else {
            return Ok(());
        };
        s.bind_factory(factory)?;
        if let Some(f) = factory.and_then(|f| factories.get(f)) {
            let desc = Arc::clone(s.tile.desc_arc());
            demand::resolve_factory_visitor_demand(&mut s.figures, &desc, params, f.sector);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Destruction
    // -----------------------------------------------------------------------

    /// City to detach from: the bound city if it still exists, else the city
    /// owning the structure's cell, else the city owning the cell of the
    /// building's first tile.
    fn resolve_owning_city(&self, world: &StructureWorld, s: &Structure) -> Option<CityId> {
        let live = |c: CityId| world.cities.contains(c).then_some(c);
        s.city(world.factories)
            .and_then(live)
            .or_else(|| world.grid.city_at(s.pos.xy()).and_then(live))
            .or_else(|| {
                let first = self.structures.get(&s.first_tile(world.grid))?;
                world.grid.city_at(first.pos.xy()).and_then(live)
            })
    }

    /// Removes one structure tile. Detaches from its city (or the world
    /// list), leaves the update list and the attraction list, refunds its
    /// maintenance while the descriptor is still at hand, and finally
    /// clears its grid cell.
    pub fn destroy(&mut self, world: &mut StructureWorld, id: StructureId) -> Option<Structure> {
        let s = self.structures.get(&id)?;

        match self.resolve_owning_city(world, s) {
            Some(city) => {
                if let Some(c) = world.cities.get(city) {
                    c.remove_member(id);
                }
                world.ledger.remove_from_world_list(id);
            }
            None if s.world_list == WorldListMembership::Listed => {
                world.ledger.remove_from_world_list(id);
            }
            None => {}
        }

        if s.sync {
            world.animated.remove(id);
        }
        if s.desc().is_attraction() {
            world.ledger.remove_attraction(id);
        }
        world
            .ledger
            .add_maintenance(s.owner, -s.maintenance(world.params));
        world.cities.remove_connected_attraction(id);
        world.grid.clear_fragment(s.pos.xy(), id);

        let mut removed = self.structures.remove(&id)?;
        removed.sync = false;
        Some(removed)
    }

    /// Removes the whole building `id` belongs to.
    pub fn demolish(&mut self, world: &mut StructureWorld, id: StructureId) -> Vec<StructureId> {
        let Some(s) = self.structures.get(&id) else {
            return Vec::new();
        };
        let footprint = s.footprint().to_vec();
        let grid: &TileGrid = world.grid;
        let mut parts: Vec<StructureId> = footprint
            .iter()
            .filter_map(|&k| self.structure_at(grid, k))
            .filter(|other| other.is_same_building(s, grid))
            .map(|other| other.id)
            .collect();
        if !parts.contains(&id) {
            parts.push(id);
        }

        for &k in &footprint {
            world.grid.set_being_deleted(k, true);
        }
        let removed = parts
            .into_iter()
            .filter(|&part| self.destroy(world, part).is_some())
            .collect();
        for &k in &footprint {
            world.grid.set_being_deleted(k, false);
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Per-step and yearly updates
    // -----------------------------------------------------------------------

    /// Steps every structure on the update list, dropping those that answer
    /// [`SyncResult::RemoveMe`] or no longer exist.
    pub fn step_animated(
        &mut self,
        env: &StructureEnv,
        delta_t: u32,
        frames: &mut dyn FrameObserver,
    ) -> usize {
        let mut removed = 0;
        for id in env.animated.snapshot() {
            let result = match self.structures.get_mut(&id) {
                Some(s) => s.step(delta_t, env, frames),
                None => SyncResult::RemoveMe,
            };
            if result == SyncResult::RemoveMe {
                env.animated.remove(id);
                removed += 1;
            }
        }
        removed
    }

    pub fn new_year(&mut self) {
        for s in self.structures.values_mut() {
            s.new_year();
        }
    }

    /// Quarter turn of the world. The grid turns first, then every
    /// structure re-derives its tile; the worst save hazard is raised on
    /// the ledger and returned.
    pub fn rotate_all(&mut self, world: &mut StructureWorld) -> RotationHazard {
        let map_height = world.grid.height;
        let rotation = world.params.rotation;
        let env = world.env();
        world.grid.rotate90();

        let mut worst = RotationHazard::None;
        for s in self.structures.values_mut() {
            let hazard = s.rotate90(map_height, rotation, &env, &mut world.rng.0);
            worst = worst.max(hazard);
            world.grid.place_fragment(
                s.pos.xy(),
                Fragment {
                    structure: s.id,
                    tile: s.tile.clone(),
                },
            );
        }
        for s in self.structures.values_mut() {
            s.recompute_footprint(world.grid);
        }

        match worst {
            RotationHazard::NoSave => world.ledger.nosave = true,
            RotationHazard::NoSaveWarning => world.ledger.nosave_warning = true,
            RotationHazard::None => {}
        }
        worst
    }

    // -----------------------------------------------------------------------
    // Reload
    // -----------------------------------------------------------------------

    /// First load phase for one persisted structure: rebuild it, settle
    /// factory demand, join the attraction and world lists, and start
    /// animating multi-phase tiles.
    pub fn restore(&mut self, world: &mut StructureWorld, snapshot: StructureSnapshot) -> StructureId {
        let id = self.allocate_id();
        let env = world.env();
        let mut s = Structure::from_snapshot(id, snapshot, &env);
        let desc = Arc::clone(s.tile.desc_arc());

        match s.binding {
            Binding::Factory(f) => {
                if let Some(factory) = world.factories.get(f) {
                    demand::resolve_factory_visitor_demand(
                        &mut s.figures,
                        &desc,
                        world.params,
                        factory.sector,
                    );
                }
            }
            Binding::City(c) if !desc.connected_with_town || !world.cities.contains(c) => {
                s.binding = Binding::None;
            }
            _ => {}
        }

        if desc.is_attraction() {
            world.ledger.add_attraction(id);
        }
        if s.world_list == WorldListMembership::Pending {
            world.ledger.add_to_world_list(id);
            s.world_list = WorldListMembership::Listed;
        }
        if desc.building_type == BuildingType::Monument {
            world.ledger.monument_erected(&desc.name);
        }
        if s.tile.phases() > 1 {
            world.animated.add(id);
            s.sync = true;
        }

        world.grid.place_fragment(
            s.pos.xy(),
            Fragment {
                structure: id,
                tile: s.tile.clone(),
            },
        );
        self.structures.insert(id, s);
        id
    }

    /// Second load phase, once every structure is back on the grid: rebuild
    /// footprints, charge maintenance and settle city bindings.
    ///
    /// A town building rejoins its city from the origin tile together with
    /// every tile of its footprint.
    pub fn finish_load(&mut self, world: &mut StructureWorld) {
        for s in self.structures.values_mut() {
            s.recompute_footprint(world.grid);
        }
        for s in self.structures.values_mut() {
            world
                .ledger
                .add_maintenance(s.owner, s.maintenance(world.params));

            let here = world.grid.city_at(s.pos.xy());
            let unbound = !s.is_factory() && !matches!(s.binding, Binding::City(_));
            let is_origin = s.tile.offset() == Koord::ORIGIN;

            if is_origin && s.desc().connected_with_town {
                let bound = match s.binding {
                    Binding::City(c) => Some(c),
                    _ => None,
                };
                if let Some(city) = bound.or_else(|| world.cities.nearest(s.pos.xy())) {
                    if unbound {
                        s.binding = here.map_or(Binding::None, Binding::City);
                    }
                    if let Some(c) = world.cities.get(city) {
                        c.add_member(s.id);
                        for &k in s.footprint() {
                            let fragment = world
                                .grid
                                .lookup(k)
                                .and_then(|plan| plan.find_structure_fragment());
                            if let Some(f) = fragment {
                                c.add_member(f.structure);
                            }
                        }
                    }
                }
            } else if unbound {
                s.binding = here.map_or(Binding::None, Binding::City);
            }
        }
    }

    /// Snapshots of every structure in id order.
    pub fn snapshots(&self) -> Vec<(StructureId, StructureSnapshot)> {
        self.structures
            .iter()
            .map(|(&id, s)| (id, s.snapshot()))
            .collect()
    }
}
