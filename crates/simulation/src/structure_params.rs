//! Data-driven world settings consumed by the structure lifecycle.
//!
//! Per-level multipliers, the job replenishment window and the monthly
//! scaling inputs live in a single [`StructureParams`] resource so they can
//! be tuned at runtime. The resource is registered via the `Saveable` trait
//! so overrides persist across save/load cycles.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{BASE_BITS_PER_MONTH, BASE_METERS_PER_TILE};

// ---------------------------------------------------------------------------
// StructureParams resource
// ---------------------------------------------------------------------------

#[derive(
    Resource, Debug, Clone, PartialEq, Serialize, Deserialize, bitcode::Encode, bitcode::Decode,
)]
#[serde(default)]
pub struct StructureParams {
    /// Residents per descriptor level when the capacity is unspecified.
    pub population_per_level: u16,
    /// Visitor demand per level for non-residential structures.
    pub visitor_demand_per_level: u16,
    pub jobs_per_level: u16,
    pub mail_per_level: u16,
    /// Ticks over which a fully staffed structure regains all its jobs.
    pub job_replenishment_ticks: i64,
    /// Monthly maintenance per level for descriptors without an explicit price.
    pub maint_building: i64,
    pub starting_year: i64,
    /// Zero-based month of the year the game started in.
    pub starting_month: i64,
    /// A world month lasts `1 << ticks_per_world_month_shift` ticks.
    pub ticks_per_world_month_shift: u32,
    pub meters_per_tile: u32,
    /// World ticks advanced per fixed simulation step.
    pub ticks_per_step: u32,
    /// `year * 12 + month`; zero disables the timeline.
    pub timeline_year_month: u16,
    /// Number of quarter turns applied to the map, modulo 4.
    pub rotation: u8,
}

impl Default for StructureParams {
    fn default() -> Self {
        Self {
            population_per_level: 8,
            visitor_demand_per_level: 6,
            jobs_per_level: 5,
            mail_per_level: 3,
            job_replenishment_ticks: 1 << 18,
            maint_building: 1000,
            starting_year: 1930,
            starting_month: 0,
            ticks_per_world_month_shift: BASE_BITS_PER_MONTH,
            meters_per_tile: BASE_METERS_PER_TILE as u32,
            ticks_per_step: 100,
            timeline_year_month: 0,
            rotation: 0,
        }
    }
}

impl StructureParams {
    pub fn ticks_per_world_month(&self) -> i64 {
        1i64 << self.ticks_per_world_month_shift
    }

    /// Scale a per-month nominal figure to the configured tile length and
    /// month duration. Monotonic in `raw`; may round small values to zero.
    pub fn calc_adjusted_monthly_figure(&self, raw: i64) -> i64 {
        let meters = i64::from(self.meters_per_tile.max(1));
        let scaled = raw * meters;
        if self.ticks_per_world_month_shift >= BASE_BITS_PER_MONTH {
            (scaled << (self.ticks_per_world_month_shift - BASE_BITS_PER_MONTH))
                / BASE_METERS_PER_TILE
        } else {
            (scaled / BASE_METERS_PER_TILE)
                >> (BASE_BITS_PER_MONTH - self.ticks_per_world_month_shift)
        }
    }

    /// Calendar month (`year * 12 + month`) that contains `ticks`.
    pub fn month_at(&self, ticks: i64) -> i64 {
        ticks.div_euclid(self.ticks_per_world_month())
            + self.starting_month
            + self.starting_year * 12
    }

    /// First tick of the calendar month `month`.
    pub fn month_start_ticks(&self, month: i64) -> i64 {
        (month - self.starting_month - self.starting_year * 12) * self.ticks_per_world_month()
    }
}

// ---------------------------------------------------------------------------
// Saveable implementation
// ---------------------------------------------------------------------------

impl crate::Saveable for StructureParams {
    const SAVE_KEY: &'static str = "structure_params";

    fn save_to_bytes(&self) -> Option<Vec<u8>> {
        Some(bitcode::encode(self))
    }

    fn load_from_bytes(bytes: &[u8]) -> Self {
        crate::decode_or_warn(Self::SAVE_KEY, bytes)
    }
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct StructureParamsPlugin;

impl Plugin for StructureParamsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StructureParams>();

        app.init_resource::<crate::SaveableRegistry>();
        app.world_mut()
            .resource_mut::<crate::SaveableRegistry>()
            .register::<StructureParams>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Saveable;

    #[test]
    fn test_reference_settings_leave_figures_unchanged() {
        let params = StructureParams::default();
        for raw in [0, 1, 7, 400, 65535] {
            assert_eq!(params.calc_adjusted_monthly_figure(raw), raw);
        }
    }

    #[test]
    fn test_shorter_tiles_scale_down() {
        let params = StructureParams {
            meters_per_tile: 125,
            ..Default::default()
        };
        assert_eq!(params.calc_adjusted_monthly_figure(80), 10);
        assert_eq!(params.calc_adjusted_monthly_figure(7), 0);
    }

    #[test]
    fn test_longer_months_scale_up() {
        let params = StructureParams {
            ticks_per_world_month_shift: 20,
            ..Default::default()
        };
        assert_eq!(params.calc_adjusted_monthly_figure(10), 40);

        let short = StructureParams {
            ticks_per_world_month_shift: 16,
            ..Default::default()
        };
        assert_eq!(short.calc_adjusted_monthly_figure(10), 2);
    }

    #[test]
    fn test_month_at_and_month_start_agree() {
        let params = StructureParams::default();
        let tpm = params.ticks_per_world_month();
        let month = params.month_at(5 * tpm + 17);
        assert_eq!(month, 1930 * 12 + 5);
        assert_eq!(params.month_start_ticks(month), 5 * tpm);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let params = StructureParams {
            jobs_per_level: 11,
            rotation: 3,
            ..Default::default()
        };
        let bytes = params.save_to_bytes().expect("params always save");
        assert_eq!(StructureParams::load_from_bytes(&bytes), params);
    }

    #[test]
    fn test_garbage_bytes_fall_back_to_default() {
        let restored = StructureParams::load_from_bytes(&[0xFF, 0x01]);
        assert_eq!(restored, StructureParams::default());
    }
}
