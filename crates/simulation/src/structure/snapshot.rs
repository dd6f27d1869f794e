use super::{Binding, Structure, StructureEnv, TripStats};
use crate::demand::{self, DemandFigures};
use crate::grid::Koord3d;
use crate::ids::{OwnerId, StructureId};
use crate::job_replenishment::JobClock;
use crate::structure_catalog::TileRef;

/// Whether a structure sits in the world building list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldListMembership {
    /// Not yet added; joins the list when placement or loading completes.
    Pending,
    Listed,
    /// Belongs to a factory and stays out of the list.
    Excluded,
}

/// Everything persisted about one structure, independent of the on-disk
/// schema.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureSnapshot {
    pub pos: Koord3d,
    pub y_offset: i8,
    pub owner: OwnerId,
    pub tile: TileRef,
    pub construction_start: i64,
    pub job_clock: JobClock,
    pub binding: Binding,
    /// Figures as stored; `None` re-derives them from the descriptor.
    pub figures: Option<DemandFigures>,
    pub trips: TripStats,
    pub exclude_from_world_list: bool,
}

impl Structure {
    pub fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            pos: self.pos,
            y_offset: self.y_offset,
            owner: self.owner,
            tile: self.tile.clone(),
            construction_start: self.construction_start,
            job_clock: self.job_clock,
            binding: self.binding,
            figures: Some(self.figures),
            trips: self.trips,
            exclude_from_world_list: self.world_list == WorldListMembership::Excluded,
        }
    }

    /// Rebuilds a structure from persisted state. Loaded structures never
    /// show a construction pit and start unsynchronised at frame zero; the
    /// purchase month is re-derived from the construction start.
    pub fn from_snapshot(id: StructureId, snapshot: StructureSnapshot, env: &StructureEnv) -> Self {
        let figures = snapshot
            .figures
            .unwrap_or_else(|| demand::derive_figures(snapshot.tile.desc(), env.params));
        Self {
            id,
            pos: snapshot.pos,
            y_offset: snapshot.y_offset,
            owner: snapshot.owner,
            footprint: vec![snapshot.pos.xy()],
            tile: snapshot.tile,
            figures,
            job_clock: snapshot.job_clock,
            show_construction: false,
            construction_start: snapshot.construction_start,
            purchase_time: env.params.month_at(snapshot.construction_start),
            anim_frame: 0,
            anim_time: 0,
            sync: false,
            binding: snapshot.binding,
            trips: snapshot.trips,
            world_list: if snapshot.exclude_from_world_list {
                WorldListMembership::Excluded
            } else {
                WorldListMembership::Pending
            },
        }
    }
}
