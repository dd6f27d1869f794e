//! Bevy wiring for the structure lifecycle: resources, events and the
//! fixed-step systems that animate, demolish, rotate and age structures.

use bevy::prelude::*;

use crate::animated::AnimatedStructures;
use crate::cities::CityRegistry;
use crate::factories::FactoryRegistry;
use crate::frame_events::{clear_dirty_frames, DirtyFrames};
use crate::grid::TileGrid;
use crate::ids::StructureId;
use crate::sim_rng::SimRng;
use crate::simulation_sets::SimulationSet;
use crate::structure::{RotationHazard, StructureEnv};
use crate::structure_catalog::StructureCatalog;
use crate::structure_params::StructureParams;
use crate::structure_store::{StructureStore, StructureWorld};
use crate::world_clock::{advance_world_clock, WorldClock};
use crate::world_ledger::{MissingAssets, WorldLedger};

// =============================================================================
// Events
// =============================================================================

/// Request to tear down the whole building `structure` belongs to.
#[derive(Event, Debug, Clone, Copy)]
pub struct DemolishStructure {
    pub structure: StructureId,
}

/// Request a quarter turn of the map.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct RotateWorld;

// =============================================================================
// Resources
// =============================================================================

/// Calendar year of the last statistics rollover.
#[derive(Resource, Debug, Default)]
pub struct LastRolloverYear(pub Option<i64>);

// =============================================================================
// System params
// =============================================================================

/// Everything a lifecycle operation needs from the ECS world.
#[derive(bevy::ecs::system::SystemParam)]
pub struct StructureWorldParams<'w> {
    pub params: Res<'w, StructureParams>,
    pub clock: Res<'w, WorldClock>,
    pub grid: ResMut<'w, TileGrid>,
    pub cities: Res<'w, CityRegistry>,
    pub factories: Res<'w, FactoryRegistry>,
    pub animated: Res<'w, AnimatedStructures>,
    pub ledger: ResMut<'w, WorldLedger>,
    pub rng: ResMut<'w, SimRng>,
}

impl StructureWorldParams<'_> {
    pub fn world(&mut self) -> StructureWorld<'_> {
        StructureWorld {
            params: &*self.params,
            now: self.clock.now(),
            grid: &mut *self.grid,
            cities: &*self.cities,
            factories: &*self.factories,
            animated: &*self.animated,
            ledger: &mut *self.ledger,
            rng: &mut *self.rng,
        }
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn step_animated_structures(
    mut store: ResMut<StructureStore>,
    mut frames: ResMut<DirtyFrames>,
    clock: Res<WorldClock>,
    params: Res<StructureParams>,
    factories: Res<FactoryRegistry>,
    animated: Res<AnimatedStructures>,
) {
    if animated.is_empty() {
        return;
    }
    let env = StructureEnv {
        now: clock.now(),
        params: &params,
        factories: &factories,
        animated: &animated,
    };
    let removed = store.step_animated(&env, clock.last_delta, &mut *frames);
    if removed > 0 {
        debug!("{} structures left the update list", removed);
    }
}

pub fn demolish_requested_structures(
    mut events: EventReader<DemolishStructure>,
    mut store: ResMut<StructureStore>,
    mut world: StructureWorldParams,
) {
    for event in events.read() {
        let removed = store.demolish(&mut world.world(), event.structure);
        if removed.is_empty() {
            warn!(
                "Demolish request for unknown structure {}",
                event.structure.0
            );
        } else {
            info!(
                "Demolished building of structure {} ({} tiles)",
                event.structure.0,
                removed.len()
            );
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn rotate_structures(
    mut events: EventReader<RotateWorld>,
    mut store: ResMut<StructureStore>,
    mut params: ResMut<StructureParams>,
    clock: Res<WorldClock>,
    mut grid: ResMut<TileGrid>,
    cities: Res<CityRegistry>,
    factories: Res<FactoryRegistry>,
    animated: Res<AnimatedStructures>,
    mut ledger: ResMut<WorldLedger>,
    mut rng: ResMut<SimRng>,
) {
    for _ in events.read() {
        params.rotation = (params.rotation + 1) % 4;
        let mut world = StructureWorld {
            params: &params,
            now: clock.now(),
            grid: &mut grid,
            cities: &cities,
            factories: &factories,
            animated: &animated,
            ledger: &mut ledger,
            rng: &mut rng,
        };
        match store.rotate_all(&mut world) {
            RotationHazard::NoSave => warn!("Rotation left structures that cannot be saved"),
            RotationHazard::NoSaveWarning => {
                warn!("Rotation left structures that may not reload faithfully")
            }
            RotationHazard::None => {}
        }
    }
}

/// Rolls trip statistics over once the calendar year changes.
pub fn yearly_structure_rollover(
    clock: Res<WorldClock>,
    params: Res<StructureParams>,
    mut last: ResMut<LastRolloverYear>,
    mut store: ResMut<StructureStore>,
) {
    let year = clock.current_month(&params).div_euclid(12);
    match last.0 {
        Some(previous) if year > previous => {
            store.new_year();
            info!("Structure statistics rolled over into {}", year);
        }
        Some(_) => return,
        None => {}
    }
    last.0 = Some(year);
}

// =============================================================================
// Plugin
// =============================================================================

pub struct StructuresPlugin;

impl Plugin for StructuresPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileGrid>()
            .init_resource::<StructureCatalog>()
            .init_resource::<StructureStore>()
            .init_resource::<CityRegistry>()
            .init_resource::<FactoryRegistry>()
            .init_resource::<AnimatedStructures>()
            .init_resource::<WorldLedger>()
            .init_resource::<MissingAssets>()
            .init_resource::<DirtyFrames>()
            .init_resource::<WorldClock>()
            .init_resource::<LastRolloverYear>()
            .add_event::<DemolishStructure>()
            .add_event::<RotateWorld>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<WorldClock>();

        app.add_systems(
            FixedUpdate,
            (clear_dirty_frames, advance_world_clock)
                .chain()
                .in_set(SimulationSet::PreSim),
        )
        .add_systems(
            FixedUpdate,
            (
                step_animated_structures,
                demolish_requested_structures,
                rotate_structures,
            )
                .chain()
                .in_set(SimulationSet::Simulation),
        )
        .add_systems(
            FixedUpdate,
            yearly_structure_rollover.in_set(SimulationSet::PostSim),
        );
    }
}
