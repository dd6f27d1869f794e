// ---------------------------------------------------------------------------
// On-disk structure record
// ---------------------------------------------------------------------------
//
// Every field that did not exist in some historical schema is an `Option`.
// `field_gates` decides which options a record of a given version carries;
// `save_migrate` fills the gaps before the restore stage runs.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use simulation::config::PERCENT_UNSET;
use simulation::demand::DemandFigures;

/// Generated/succeeded passenger counters for one trip purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PassengerRecord {
    pub generated: u16,
    pub succeeded: u16,
    /// Stored as 8 bits in extended version 11.
    pub percent_last_year: u16,
}

impl Default for PassengerRecord {
    fn default() -> Self {
        Self {
            generated: 0,
            succeeded: 0,
            percent_last_year: PERCENT_UNSET,
        }
    }
}

/// Capacities written by extended 12 saves. Read back but never used:
/// later schemas store the full figures instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct CapacityRecord {
    pub population: u16,
    pub jobs: u16,
    pub mail_demand: u16,
}

/// Raw and adjusted jobs, visitor demand and mail demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct FigureRecord {
    pub jobs: u16,
    pub visitor_demand: u16,
    pub mail_demand: u16,
    pub adjusted_jobs: u16,
    pub adjusted_visitor_demand: u16,
    pub adjusted_mail_demand: u16,
}

/// Population figures and the factory visitor-demand deferral flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct PopulationRecord {
    pub population: u16,
    pub adjusted_population: u16,
    pub visitor_demand_pending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MailRecord {
    pub generated: u16,
    pub succeeded_last_year: u16,
    pub succeeded: u16,
    pub success_percent_last_year: u16,
}

impl Default for MailRecord {
    fn default() -> Self {
        Self {
            generated: 0,
            succeeded_last_year: PERCENT_UNSET,
            succeeded: 0,
            success_percent_last_year: PERCENT_UNSET,
        }
    }
}

/// One persisted structure tile. The descriptor is referenced by name and
/// tile index, never by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveStructure {
    pub desc_name: String,
    pub tile_index: i16,
    pub x: i16,
    pub y: i16,
    pub z: i8,
    pub owner: u8,
    /// base >= 88.2
    pub y_offset: Option<i8>,
    /// extended <= 1
    pub construction_start_legacy: Option<u32>,
    /// extended >= 2
    pub construction_start: Option<i64>,
    /// extended >= 12
    pub available_jobs_by_time: Option<i64>,
    /// base < 99.6; read and ignored.
    pub legacy_sync: Option<u8>,
    /// extended >= 12
    pub is_factory: Option<bool>,
    /// extended >= 15, factory tiles only
    pub factory_id: Option<u32>,
    /// base >= 99.14, non-factory tiles only; -1 means no city.
    pub city_index: Option<i32>,
    /// extended >= 11
    pub commuting: Option<PassengerRecord>,
    /// extended >= 11
    pub visiting: Option<PassengerRecord>,
    /// extended >= 12
    pub capacities: Option<CapacityRecord>,
    /// extended 13 revision >= 1, or extended >= 14
    pub figures: Option<FigureRecord>,
    /// extended >= 15
    pub population: Option<PopulationRecord>,
    /// extended 14 revision >= 4, or extended >= 15
    pub mail: Option<MailRecord>,
}

impl SaveStructure {
    /// Construction start from whichever width the record carries.
    pub fn construction_start(&self) -> Option<i64> {
        self.construction_start
            .or(self.construction_start_legacy.map(i64::from))
    }

    pub fn is_factory(&self) -> bool {
        self.is_factory.unwrap_or(false)
    }

    /// Complete demand figures, when the record carries them all.
    pub fn demand_figures(&self) -> Option<DemandFigures> {
        let f = self.figures?;
        let p = self.population?;
        Some(DemandFigures {
            population: p.population,
            visitor_demand: f.visitor_demand,
            jobs: f.jobs,
            mail_demand: f.mail_demand,
            adjusted_population: p.adjusted_population,
            adjusted_visitor_demand: f.adjusted_visitor_demand,
            adjusted_jobs: f.adjusted_jobs,
            adjusted_mail_demand: f.adjusted_mail_demand,
            visitor_demand_pending: p.visitor_demand_pending,
        })
    }
}
