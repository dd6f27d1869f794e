// ---------------------------------------------------------------------------
// Collect stage: live structures -> save records
// ---------------------------------------------------------------------------
//
// Records are always written at the current schema, so every optional field
// the current schema carries is filled in. Cities are persisted by their
// index in the registry (-1 when unbound); factories by id.

use simulation::cities::CityRegistry;
use simulation::structure::{Binding, StructureSnapshot};
use simulation::structure_store::StructureStore;

use crate::save_types::{
    CapacityRecord, FigureRecord, MailRecord, PassengerRecord, PopulationRecord, SaveStructure,
};

pub fn collect_structures(store: &StructureStore, cities: &CityRegistry) -> Vec<SaveStructure> {
    store
        .snapshots()
        .iter()
        .map(|(_, snapshot)| record_from_snapshot(snapshot, cities))
        .collect()
}

fn city_index(cities: &CityRegistry, binding: Binding) -> i32 {
    match binding {
        Binding::City(c) => cities
            .index_of(c)
            .and_then(|i| i32::try_from(i).ok())
            .unwrap_or(-1),
        _ => -1,
    }
}

pub fn record_from_snapshot(s: &StructureSnapshot, cities: &CityRegistry) -> SaveStructure {
    let factory_id = match s.binding {
        Binding::Factory(f) => Some(f.0),
        _ => None,
    };
    let is_factory = factory_id.is_some();
    let t = &s.trips;

    SaveStructure {
        desc_name: s.tile.desc().name.clone(),
        tile_index: i16::try_from(s.tile.index()).unwrap_or(i16::MAX),
        x: s.pos.x,
        y: s.pos.y,
        z: s.pos.z,
        owner: s.owner.0,
        y_offset: Some(s.y_offset),
        construction_start_legacy: None,
        construction_start: Some(s.construction_start),
        available_jobs_by_time: Some(s.job_clock.available_by),
        legacy_sync: None,
        is_factory: Some(is_factory),
        factory_id,
        city_index: (!is_factory).then(|| city_index(cities, s.binding)),
        commuting: Some(PassengerRecord {
            generated: t.passengers_generated_commuting,
            succeeded: t.passengers_succeeded_commuting,
            percent_last_year: t.passenger_success_percent_last_year_commuting,
        }),
        visiting: Some(PassengerRecord {
            generated: t.passengers_generated_visiting,
            succeeded: t.passengers_succeeded_visiting,
            percent_last_year: t.passenger_success_percent_last_year_visiting,
        }),
        capacities: s.figures.map(|f| CapacityRecord {
            population: f.population,
            jobs: f.jobs,
            mail_demand: f.mail_demand,
        }),
        figures: s.figures.map(|f| FigureRecord {
            jobs: f.jobs,
            visitor_demand: f.visitor_demand,
            mail_demand: f.mail_demand,
            adjusted_jobs: f.adjusted_jobs,
            adjusted_visitor_demand: f.adjusted_visitor_demand,
            adjusted_mail_demand: f.adjusted_mail_demand,
        }),
        population: s.figures.map(|f| PopulationRecord {
            population: f.population,
            adjusted_population: f.adjusted_population,
            visitor_demand_pending: f.visitor_demand_pending,
        }),
        mail: Some(MailRecord {
            generated: t.mail_generated,
            succeeded_last_year: t.mail_delivery_succeeded_last_year,
            succeeded: t.mail_delivery_succeeded,
            success_percent_last_year: t.mail_delivery_success_percent_last_year,
        }),
    }
}
