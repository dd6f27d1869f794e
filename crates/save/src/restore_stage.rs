// ---------------------------------------------------------------------------
// Restore stage: save records -> live structures
// ---------------------------------------------------------------------------
//
// Runs after migration, so every record is shaped like the current schema
// except for fields that older schemas never carried (figures, population,
// job clock). Records whose descriptor cannot be resolved are dropped and
// reported as missing assets.

use bevy::prelude::*;
use simulation::cities::CityRegistry;
use simulation::demand::{self, DemandFigures};
use simulation::factories::FactoryRegistry;
use simulation::grid::Koord3d;
use simulation::ids::{FactoryId, OwnerId};
use simulation::job_replenishment::JobClock;
use simulation::structure::{Binding, StructureSnapshot, TripStats};
use simulation::structure_catalog::{BuildingType, StructureCatalog, TileRef};
use simulation::structure_params::StructureParams;
use simulation::structure_store::with_structure_world;
use simulation::world_ledger::{MissingAsset, MissingAssets};

use crate::descriptor_resolver::{resolve, Resolution, ResolveContext, ResolveStrategy};
use crate::save_types::SaveStructure;

/// What happened to the records of one load.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Records placed with a stand-in descriptor: saved name and strategy.
    pub replaced: Vec<(String, ResolveStrategy)>,
    pub dropped: Vec<MissingAsset>,
}

/// Restores every record into the world, then runs the second load phase
/// over the whole store. Missing descriptors land in [`MissingAssets`].
pub fn restore_structures(world: &mut World, records: Vec<SaveStructure>) -> RestoreReport {
    let mut report = RestoreReport::default();

    world.resource_scope(|world, catalog: Mut<StructureCatalog>| {
        with_structure_world(world, |store, sw| {
            for record in records {
                let pos = Koord3d::new(record.x, record.y, record.z);
                let ctx = ResolveContext {
                    catalog: &catalog,
                    timeline_year_month: sw.params.timeline_year_month,
                    climate: sw.grid.climate_at(pos.xy()),
                    region: sw.grid.region_at(pos.xy()),
                };
                match resolve(&ctx, &record.desc_name, record.tile_index) {
                    Resolution::Found { tile, strategy } => {
                        if strategy != ResolveStrategy::Exact {
                            report.replaced.push((record.desc_name.clone(), strategy));
                        }
                        let snapshot =
                            snapshot_from_record(&record, tile, sw.params, sw.cities, sw.factories);
                        store.restore(sw, snapshot);
                        report.restored += 1;
                    }
                    Resolution::Dropped(missing) => {
                        warn!(
                            "Description {} for building at {},{} not found, building removed",
                            record.desc_name, record.x, record.y
                        );
                        report.dropped.push(missing);
                    }
                }
            }
            store.finish_load(sw);
        });
    });

    if let Some(mut missing) = world.get_resource_mut::<MissingAssets>() {
        for m in &report.dropped {
            missing.record(&m.name, m.kind);
        }
    }
    report
}

/// Maps a migrated record onto the snapshot the store restores from.
pub fn snapshot_from_record(
    record: &SaveStructure,
    tile: TileRef,
    params: &StructureParams,
    cities: &CityRegistry,
    factories: &FactoryRegistry,
) -> StructureSnapshot {
    let binding = binding_from_record(record, cities, factories);
    let figures = figures_from_record(record, &tile, params);
    StructureSnapshot {
        pos: Koord3d::new(record.x, record.y, record.z),
        y_offset: record.y_offset.unwrap_or(0),
        owner: OwnerId(record.owner),
        tile,
        construction_start: record.construction_start().unwrap_or(0),
        job_clock: JobClock {
            available_by: record.available_jobs_by_time.unwrap_or(i64::MIN),
        },
        binding,
        figures,
        trips: trips_from_record(record),
        exclude_from_world_list: matches!(binding, Binding::Factory(_)),
    }
}

fn binding_from_record(
    record: &SaveStructure,
    cities: &CityRegistry,
    factories: &FactoryRegistry,
) -> Binding {
    if record.is_factory() {
        return match record.factory_id.map(FactoryId) {
            Some(f) if factories.get(f).is_some() => Binding::Factory(f),
            Some(f) => {
                warn!(
                    "Building at {},{} belongs to unknown factory {}, unbinding",
                    record.x, record.y, f.0
                );
                Binding::None
            }
            None => Binding::None,
        };
    }
    record
        .city_index
        .and_then(|i| usize::try_from(i).ok())
        .and_then(|i| cities.by_index(i))
        .map_or(Binding::None, |c| Binding::City(c.id))
}

/// Stored figures when the record has them all. Records written before
/// population was persisted carry residents in the visitor slot; the rest
/// of their population side is re-derived from the descriptor.
fn figures_from_record(
    record: &SaveStructure,
    tile: &TileRef,
    params: &StructureParams,
) -> Option<DemandFigures> {
    if let Some(figures) = record.demand_figures() {
        return Some(figures);
    }
    let f = record.figures?;
    let desc = tile.desc();
    let mut figures = demand::derive_figures(desc, params);
    figures.jobs = f.jobs;
    figures.adjusted_jobs = f.adjusted_jobs;
    figures.mail_demand = f.mail_demand;
    figures.adjusted_mail_demand = f.adjusted_mail_demand;
    if desc.building_type == BuildingType::Residential {
        figures.population = f.visitor_demand;
        figures.adjusted_population = f.adjusted_visitor_demand;
    } else {
        figures.visitor_demand = f.visitor_demand;
        figures.adjusted_visitor_demand = f.adjusted_visitor_demand;
        figures.visitor_demand_pending = false;
    }
    Some(figures)
}

fn trips_from_record(record: &SaveStructure) -> TripStats {
    let mut trips = TripStats::default();
    if let Some(c) = record.commuting {
        trips.passengers_generated_commuting = c.generated;
        trips.passengers_succeeded_commuting = c.succeeded;
        trips.passenger_success_percent_last_year_commuting = c.percent_last_year;
    }
    if let Some(v) = record.visiting {
        trips.passengers_generated_visiting = v.generated;
        trips.passengers_succeeded_visiting = v.succeeded;
        trips.passenger_success_percent_last_year_visiting = v.percent_last_year;
    }
    if let Some(m) = record.mail {
        trips.mail_generated = m.generated;
        trips.mail_delivery_succeeded_last_year = m.succeeded_last_year;
        trips.mail_delivery_succeeded = m.succeeded;
        trips.mail_delivery_success_percent_last_year = m.success_percent_last_year;
    }
    trips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_types::{FigureRecord, PassengerRecord};
    use simulation::config::PERCENT_UNSET;
    use simulation::structure_catalog::{BuildingDef, FactorySector};
    use simulation::test_harness::TestWorld;
    use simulation::world_ledger::MissingKind;

    fn catalog() -> Vec<BuildingDef> {
        vec![
            BuildingDef::new("cottage", BuildingType::Residential, 2),
            BuildingDef::new("bakery", BuildingType::Commercial, 1),
            BuildingDef::new("sawmill", BuildingType::Factory, 1),
        ]
    }

    fn record(name: &str, x: i16, y: i16) -> SaveStructure {
        SaveStructure {
            desc_name: name.into(),
            x,
            y,
            city_index: Some(-1),
            is_factory: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_descriptor_is_dropped_and_recorded() {
        let mut world = TestWorld::new().with_buildings(catalog());
        let report = restore_structures(
            world.world_mut(),
            vec![record("bakery", 3, 3), record("xyzzy", 4, 4)],
        );
        assert_eq!(report.restored, 1);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(world.store().len(), 1);
        let missing = &world.resource::<MissingAssets>().entries;
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "xyzzy");
        assert_eq!(missing[0].kind, MissingKind::Building);
    }

    #[test]
    fn test_city_index_rebinds_and_stale_index_unbinds() {
        let mut world = TestWorld::new().with_buildings(catalog());
        let city = world.found_city("Altstadt", (10, 10), 3);
        let mut bound = record("bakery", 10, 10);
        bound.city_index = Some(0);
        let mut stale = record("bakery", 60, 60);
        stale.city_index = Some(7);
        restore_structures(world.world_mut(), vec![bound, stale]);

        assert_eq!(
            world.structure_at(10, 10).map(|s| s.binding()),
            Some(Binding::City(city))
        );
        assert_eq!(
            world.structure_at(60, 60).map(|s| s.binding()),
            Some(Binding::None)
        );
    }

    #[test]
    fn test_factory_record_for_closed_factory_is_unbound() {
        let mut world = TestWorld::new().with_buildings(catalog());
        let open = world.open_factory("Sawmill", FactorySector::Producer, None);
        let mut kept = record("sawmill", 20, 20);
        kept.is_factory = Some(true);
        kept.city_index = None;
        kept.factory_id = Some(open.0);
        let mut orphan = kept.clone();
        orphan.x = 25;
        orphan.factory_id = Some(open.0 + 9);
        restore_structures(world.world_mut(), vec![kept, orphan]);

        assert_eq!(
            world.structure_at(20, 20).map(|s| s.binding()),
            Some(Binding::Factory(open))
        );
        assert_eq!(
            world.structure_at(25, 20).map(|s| s.binding()),
            Some(Binding::None)
        );
    }

    #[test]
    fn test_figures_without_population_take_residents_from_visitor_slot() {
        let mut world = TestWorld::new().with_buildings(catalog());
        let mut r = record("cottage", 8, 8);
        r.figures = Some(FigureRecord {
            jobs: 0,
            visitor_demand: 33,
            mail_demand: 4,
            adjusted_jobs: 0,
            adjusted_visitor_demand: 33,
            adjusted_mail_demand: 4,
        });
        restore_structures(world.world_mut(), vec![r]);

        let f = world
            .structure_at(8, 8)
            .map(|s| *s.figures())
            .unwrap_or_default();
        assert_eq!(f.population, 33);
        assert_eq!(f.adjusted_population, 33);
        assert_eq!(f.mail_demand, 4);
    }

    #[test]
    fn test_missing_stats_fall_back_to_unset_defaults() {
        let mut r = record("bakery", 1, 1);
        r.visiting = Some(PassengerRecord {
            generated: 12,
            succeeded: 6,
            percent_last_year: 50,
        });
        let trips = trips_from_record(&r);
        assert_eq!(trips.passengers_generated_visiting, 12);
        assert_eq!(trips.passenger_success_percent_last_year_visiting, 50);
        assert_eq!(
            trips.passenger_success_percent_last_year_commuting,
            PERCENT_UNSET
        );
        assert_eq!(trips.mail_delivery_succeeded_last_year, PERCENT_UNSET);

        let mut world = TestWorld::new().with_buildings(catalog());
        restore_structures(world.world_mut(), vec![r]);
        let s = world.structure_at(1, 1).map(|s| s.job_clock());
        assert_eq!(s.map(|c| c.available_by), Some(i64::MIN));
    }
}
