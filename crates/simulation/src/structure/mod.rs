//! Per-structure simulation state: demand figures, job availability,
//! construction/animation, city/factory binding and the multi-tile
//! footprint cache.
//!
//! A [`Structure`] is one tile of a (possibly multi-tile) building. The
//! [`crate::structure_store::StructureStore`] owns every instance and wires
//! it into the grid, the registries and the world ledger.

mod binding;
mod footprint;
mod lifecycle;
mod rotation;
mod snapshot;
mod trip_stats;

pub use binding::{Binding, BindingConflict};
pub use lifecycle::{AnimationState, SyncResult};
pub use rotation::RotationHazard;
pub use snapshot::{StructureSnapshot, WorldListMembership};
pub use trip_stats::TripStats;

use rand::Rng;

use crate::animated::AnimatedStructures;
use crate::config::PRICE_MAGIC;
use crate::demand::{self, DemandFigures};
use crate::factories::FactoryRegistry;
use crate::grid::{Koord, Koord3d};
use crate::ids::{OwnerId, StructureId};
use crate::job_replenishment::JobClock;
use crate::structure_catalog::{BuildingDesc, BuildingType, TileRef};
use crate::structure_params::StructureParams;

/// Read-only world state a structure consults while changing tiles or
/// stepping.
#[derive(Clone, Copy)]
pub struct StructureEnv<'a> {
    pub now: i64,
    pub params: &'a StructureParams,
    pub factories: &'a FactoryRegistry,
    pub animated: &'a AnimatedStructures,
}

/// Kind of goods a trip generator asks a class for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoodsKind {
    Passengers,
    Mail,
}

#[derive(Debug, Clone)]
pub struct Structure {
    pub(crate) id: StructureId,
    pub(crate) pos: Koord3d,
    pub(crate) y_offset: i8,
    pub(crate) owner: OwnerId,
    pub(crate) tile: TileRef,
    pub(crate) figures: DemandFigures,
    pub(crate) job_clock: JobClock,
    pub(crate) show_construction: bool,
    pub(crate) construction_start: i64,
    pub(crate) purchase_time: i64,
    pub(crate) anim_frame: u16,
    pub(crate) anim_time: u32,
    pub(crate) sync: bool,
    pub(crate) binding: Binding,
    pub(crate) footprint: Vec<Koord>,
    pub(crate) trips: TripStats,
    pub(crate) world_list: WorldListMembership,
}

impl Structure {
    /// A freshly placed structure. Starts under construction unless the
    /// descriptor forbids a construction pit, with no jobs banked.
    pub fn new(
        id: StructureId,
        pos: Koord3d,
        owner: OwnerId,
        tile: TileRef,
        env: &StructureEnv,
        rng: &mut impl Rng,
    ) -> Self {
        let figures = demand::derive_figures(tile.desc(), env.params);
        let mut structure = Self {
            id,
            pos,
            y_offset: 0,
            owner,
            tile: tile.clone(),
            figures,
            job_clock: JobClock::starting_at(env.now),
            show_construction: false,
            construction_start: env.now,
            purchase_time: env.params.month_at(env.now),
            anim_frame: 0,
            anim_time: 0,
            sync: false,
            binding: Binding::None,
            footprint: vec![pos.xy()],
            trips: TripStats::default(),
            world_list: WorldListMembership::Pending,
        };
        structure.set_tile(tile, true, env, rng);
        structure
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    pub fn id(&self) -> StructureId {
        self.id
    }

    pub fn pos(&self) -> Koord3d {
        self.pos
    }

    pub fn y_offset(&self) -> i8 {
        self.y_offset
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn tile(&self) -> &TileRef {
        &self.tile
    }

    pub fn desc(&self) -> &BuildingDesc {
        self.tile.desc()
    }

    pub fn is_residential(&self) -> bool {
        self.desc().building_type == BuildingType::Residential
    }

    /// Monthly maintenance this structure charges its owner.
    pub fn maintenance(&self, params: &StructureParams) -> i64 {
        let desc = self.desc();
        if desc.maintenance == PRICE_MAGIC {
            params.maint_building * i64::from(desc.level)
        } else {
            desc.maintenance
        }
    }

    pub fn footprint(&self) -> &[Koord] {
        &self.footprint
    }

    pub fn trips(&self) -> &TripStats {
        &self.trips
    }

    pub fn trips_mut(&mut self) -> &mut TripStats {
        &mut self.trips
    }

    pub fn world_list(&self) -> WorldListMembership {
        self.world_list
    }

    // -----------------------------------------------------------------------
    // Demand figures
    // -----------------------------------------------------------------------

    pub fn figures(&self) -> &DemandFigures {
        &self.figures
    }

    pub fn population(&self) -> u16 {
        if self.is_residential() {
            self.figures.population
        } else {
            0
        }
    }

    pub fn adjusted_population(&self) -> u16 {
        if self.is_residential() {
            self.figures.adjusted_population
        } else {
            0
        }
    }

    pub fn visitor_demand(&self) -> u16 {
        if self.is_residential() {
            demand::residential_visitor_demand(self.figures.population)
        } else {
            self.figures.visitor_demand
        }
    }

    pub fn adjusted_visitor_demand(&self) -> u16 {
        if self.is_residential() {
            demand::residential_visitor_demand(self.figures.adjusted_population)
        } else {
            self.figures.adjusted_visitor_demand
        }
    }

    pub fn jobs(&self) -> u16 {
        self.figures.jobs
    }

    pub fn adjusted_jobs(&self) -> u16 {
        self.figures.adjusted_jobs
    }

    pub fn mail_demand(&self) -> u16 {
        self.figures.mail_demand
    }

    pub fn adjusted_mail_demand(&self) -> u16 {
        self.figures.adjusted_mail_demand
    }

    /// `class == None` means all classes combined.
    pub fn adjusted_population_by_class(&self, classes: u8, class: Option<u8>) -> u16 {
        if !self.is_residential() {
            return 0;
        }
        demand::class_share(
            self.figures.adjusted_population,
            &self.desc().class_proportions,
            classes,
            class,
        )
    }

    /// Residential visitors are too few to split and report zero.
    pub fn adjusted_visitor_demand_by_class(&self, classes: u8, class: Option<u8>) -> u16 {
        if self.is_residential() {
            return 0;
        }
        demand::class_share(
            self.figures.adjusted_visitor_demand,
            &self.desc().class_proportions,
            classes,
            class,
        )
    }

    pub fn adjusted_jobs_by_class(&self, classes: u8, class: Option<u8>) -> u16 {
        if self.is_residential() {
            return 0;
        }
        demand::class_share(
            self.figures.adjusted_jobs,
            &self.desc().class_proportions_jobs,
            classes,
            class,
        )
    }

    // -----------------------------------------------------------------------
    // Jobs
    // -----------------------------------------------------------------------

    pub fn job_clock(&self) -> JobClock {
        self.job_clock
    }

    /// Records `arrivals` commuters reaching their jobs here.
    pub fn set_commute_trip(&mut self, arrivals: u16, now: i64, params: &StructureParams) {
        self.job_clock.record_arrival(
            arrivals,
            self.figures.adjusted_jobs,
            now,
            params.job_replenishment_ticks,
        );
        self.trips.add_succeeded_commuting(arrivals);
    }

    pub fn remaining_jobs(&self, now: i64, params: &StructureParams) -> i64 {
        self.job_clock
            .remaining_jobs(self.figures.adjusted_jobs, now, params.job_replenishment_ticks)
    }

    pub fn remaining_jobs_capped(&self, now: i64, params: &StructureParams) -> i64 {
        self.job_clock.remaining_jobs_capped(
            self.figures.adjusted_jobs,
            now,
            params.job_replenishment_ticks,
        )
    }

    pub fn staffing_percentage(&self, now: i64, params: &StructureParams) -> i64 {
        self.job_clock.staffing_percentage(
            self.figures.adjusted_jobs,
            now,
            params.job_replenishment_ticks,
        )
    }

    pub fn jobs_available(&self, now: i64) -> bool {
        self.job_clock.jobs_available(now)
    }

    // -----------------------------------------------------------------------
    // Trip generation helpers
    // -----------------------------------------------------------------------

    /// Wealth class for one generated trip, weighted by the descriptor's
    /// class proportions. Mail and unweighted descriptors pick uniformly.
    pub fn random_class(
        &self,
        goods: GoodsKind,
        passenger_classes: u8,
        goods_classes: u8,
        rng: &mut impl Rng,
    ) -> u8 {
        if passenger_classes <= 1 {
            return 0;
        }
        let desc = self.desc();
        let sum = desc.class_proportions_sum();
        if sum == 0 || goods != GoodsKind::Passengers {
            return rng.gen_range(0..goods_classes.max(1));
        }
        let pick = rng.gen_range(0..sum);
        (0..passenger_classes)
            .find(|&class| pick < desc.class_proportion(class))
            .unwrap_or(0)
    }
}
