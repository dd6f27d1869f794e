// ---------------------------------------------------------------------------
// Field gates: which record fields exist in which schema version
// ---------------------------------------------------------------------------
//
// Each gate answers for one field independently. The base and extended
// axes are checked separately because the formats evolved side by side.

use crate::save_types::{PassengerRecord, SaveStructure, SchemaVersion};

pub fn has_y_offset(v: SchemaVersion) -> bool {
    v.base_at_least(88, 2)
}

/// Construction start was a 32-bit tick count.
pub fn has_legacy_construction_start(v: SchemaVersion) -> bool {
    v.extended <= 1
}

pub fn has_job_clock(v: SchemaVersion) -> bool {
    v.extended >= 12
}

/// A sync byte that loaders skip.
pub fn has_legacy_sync(v: SchemaVersion) -> bool {
    v.base_less(99, 6)
}

pub fn has_factory_flag(v: SchemaVersion) -> bool {
    v.extended >= 12
}

pub fn has_factory_id(v: SchemaVersion, is_factory: bool) -> bool {
    v.extended >= 15 && is_factory
}

pub fn has_city_index(v: SchemaVersion, is_factory: bool) -> bool {
    v.base_at_least(99, 14) && !is_factory
}

pub fn has_passenger_stats(v: SchemaVersion) -> bool {
    v.extended >= 11
}

/// Success percentages were a single byte.
pub fn has_narrow_percentages(v: SchemaVersion) -> bool {
    v.extended == 11
}

pub fn has_capacities(v: SchemaVersion) -> bool {
    v.extended >= 12
}

pub fn has_full_figures(v: SchemaVersion) -> bool {
    v.extended_at_least(13, 1)
}

pub fn has_population_figures(v: SchemaVersion) -> bool {
    v.extended >= 15
}

pub fn has_mail_stats(v: SchemaVersion) -> bool {
    v.extended_at_least(14, 4)
}

fn gate<T>(value: Option<T>, present: bool) -> Option<T> {
    if present {
        value
    } else {
        None
    }
}

/// `record` as a writer of schema `v` would have stored it: fields the
/// schema lacks are cleared and narrow encodings are applied.
pub fn strip_for_version(record: &SaveStructure, v: SchemaVersion) -> SaveStructure {
    let start = record.construction_start();
    let is_factory = record.is_factory();
    let narrow = |p: Option<PassengerRecord>| {
        p.map(|mut p| {
            if has_narrow_percentages(v) {
                p.percent_last_year = u16::from(p.percent_last_year as u8);
            }
            p
        })
    };

    SaveStructure {
        desc_name: record.desc_name.clone(),
        tile_index: record.tile_index,
        x: record.x,
        y: record.y,
        z: record.z,
        owner: record.owner,
        y_offset: gate(record.y_offset, has_y_offset(v)),
        construction_start_legacy: if has_legacy_construction_start(v) {
            start.map(|s| s.clamp(0, i64::from(u32::MAX)) as u32)
        } else {
            None
        },
        construction_start: if has_legacy_construction_start(v) {
            None
        } else {
            start
        },
        available_jobs_by_time: gate(record.available_jobs_by_time, has_job_clock(v)),
        legacy_sync: if has_legacy_sync(v) {
            Some(record.legacy_sync.unwrap_or(0))
        } else {
            None
        },
        is_factory: gate(record.is_factory, has_factory_flag(v)),
        factory_id: gate(record.factory_id, has_factory_id(v, is_factory)),
        city_index: gate(record.city_index, has_city_index(v, is_factory)),
        commuting: narrow(gate(record.commuting, has_passenger_stats(v))),
        visiting: narrow(gate(record.visiting, has_passenger_stats(v))),
        capacities: gate(record.capacities, has_capacities(v)),
        figures: gate(record.figures, has_full_figures(v)),
        population: gate(record.population, has_population_figures(v)),
        mail: gate(record.mail, has_mail_stats(v)),
    }
}

/// Reports the first field `record` carries that schema `v` cannot hold.
pub fn check_gates(record: &SaveStructure, v: SchemaVersion) -> Result<(), String> {
    let is_factory = record.is_factory();
    let checks = [
        ("y_offset", record.y_offset.is_some(), has_y_offset(v)),
        (
            "construction_start_legacy",
            record.construction_start_legacy.is_some(),
            has_legacy_construction_start(v),
        ),
        (
            "construction_start",
            record.construction_start.is_some(),
            !has_legacy_construction_start(v),
        ),
        (
            "available_jobs_by_time",
            record.available_jobs_by_time.is_some(),
            has_job_clock(v),
        ),
        ("legacy_sync", record.legacy_sync.is_some(), has_legacy_sync(v)),
        ("is_factory", record.is_factory.is_some(), has_factory_flag(v)),
        (
            "factory_id",
            record.factory_id.is_some(),
            has_factory_id(v, is_factory),
        ),
        (
            "city_index",
            record.city_index.is_some(),
            has_city_index(v, is_factory),
        ),
        ("commuting", record.commuting.is_some(), has_passenger_stats(v)),
        ("visiting", record.visiting.is_some(), has_passenger_stats(v)),
        ("capacities", record.capacities.is_some(), has_capacities(v)),
        ("figures", record.figures.is_some(), has_full_figures(v)),
        (
            "population",
            record.population.is_some(),
            has_population_figures(v),
        ),
        ("mail", record.mail.is_some(), has_mail_stats(v)),
    ];
    for (field, present, allowed) in checks {
        if present && !allowed {
            return Err(format!(
                "structure '{}' carries {field}, which schema {v} does not have",
                record.desc_name
            ));
        }
    }
    Ok(())
}
