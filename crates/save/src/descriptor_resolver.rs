// ---------------------------------------------------------------------------
// Descriptor resolver: maps saved descriptor names back onto the catalog
// ---------------------------------------------------------------------------
//
// Saves refer to descriptors by name and tile index. Catalogs change between
// releases, so a name that no longer exists walks an ordered chain of
// strategies before the structure is given up:
//
//   1. exact name
//   2. compatibility (rename) table
//   3. special building categories matched by substring
//   4. level guessed from a legacy encoded name, replaced by a 1x1 city
//      building of that level (filtered by timeline, climate and region
//      first, unfiltered second)

use std::sync::Arc;

use bevy::prelude::*;
use simulation::config::{ANY_CLIMATE, ANY_REGION};
use simulation::grid::Koord;
use simulation::structure_catalog::{BuildingDesc, BuildingType, StructureCatalog, TileRef};
use simulation::world_ledger::{MissingAsset, MissingKind};

/// Categories whose tiles are looked up by category name when a save's
/// descriptor name merely contains it.
const SPECIAL_BUILDINGS: [&str; 5] = [
    "TrainStop",
    "BusStop",
    "ShipStop",
    "PostOffice",
    "StationBlg",
];

/// World conditions a replacement has to suit.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a StructureCatalog,
    pub timeline_year_month: u16,
    pub climate: u8,
    pub region: u8,
}

/// Which strategy found the tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStrategy {
    Exact,
    Compatibility,
    SpecialBuilding(&'static str),
    LevelReplacement {
        building_type: BuildingType,
        level: u16,
        replacement: String,
    },
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Found {
        tile: TileRef,
        strategy: ResolveStrategy,
    },
    /// Nothing in the catalog can stand in; the structure is not restored.
    Dropped(MissingAsset),
}

type Strategy = fn(&ResolveContext, &str, i16) -> Option<(TileRef, ResolveStrategy)>;

const STRATEGIES: [Strategy; 4] = [exact, compatibility, special_building, level_replacement];

/// Runs the strategy chain for `name`/`index`.
pub fn resolve(ctx: &ResolveContext, name: &str, index: i16) -> Resolution {
    for strategy in STRATEGIES {
        if let Some((tile, strategy)) = strategy(ctx, name, index) {
            match &strategy {
                ResolveStrategy::Exact => {}
                ResolveStrategy::Compatibility => debug!(
                    "{} replaced by {}, tile {}",
                    name,
                    tile.desc().name,
                    index
                ),
                ResolveStrategy::SpecialBuilding(category) => {
                    info!("{} resolved as special building {}", name, category)
                }
                ResolveStrategy::LevelReplacement {
                    building_type,
                    level,
                    replacement,
                } => info!(
                    "replace unknown building {} with {:?} level {} by {}",
                    name, building_type, level, replacement
                ),
            }
            return Resolution::Found { tile, strategy };
        }
    }
    Resolution::Dropped(MissingAsset {
        name: name.to_owned(),
        kind: MissingKind::Building,
    })
}

fn exact(ctx: &ResolveContext, name: &str, index: i16) -> Option<(TileRef, ResolveStrategy)> {
    let tile = ctx.catalog.find_tile(name, index)?;
    Some((tile, ResolveStrategy::Exact))
}

fn compatibility(
    ctx: &ResolveContext,
    name: &str,
    index: i16,
) -> Option<(TileRef, ResolveStrategy)> {
    let translated = ctx.catalog.compatibility_name(name);
    if translated == name {
        return None;
    }
    let tile = ctx.catalog.find_tile(translated, index)?;
    Some((tile, ResolveStrategy::Compatibility))
}

fn special_category(name: &str) -> Option<&'static str> {
    SPECIAL_BUILDINGS
        .into_iter()
        .find(|category| name.contains(category))
}

fn special_building(
    ctx: &ResolveContext,
    name: &str,
    index: i16,
) -> Option<(TileRef, ResolveStrategy)> {
    let category = special_category(name)?;
    let tile = ctx.catalog.find_tile(category, index)?;
    Some((tile, ResolveStrategy::SpecialBuilding(category)))
}

fn level_replacement(
    ctx: &ResolveContext,
    name: &str,
    _index: i16,
) -> Option<(TileRef, ResolveStrategy)> {
    // A special-category name never falls through to level guessing.
    if special_category(name).is_some() {
        return None;
    }
    let (building_type, level) = legacy_level(name)?;
    let desc = replacement(ctx, building_type, level)?;
    let replacement = desc.name.clone();
    let tile = TileRef::new(Arc::clone(desc), 0)?;
    Some((
        tile,
        ResolveStrategy::LevelReplacement {
            building_type,
            level,
            replacement,
        },
    ))
}

/// A 1x1 city building of `building_type` near `level`. Industrial names
/// settle for a residential building when no industry exists at all.
fn replacement<'a>(
    ctx: &ResolveContext<'a>,
    building_type: BuildingType,
    level: u16,
) -> Option<&'a Arc<BuildingDesc>> {
    let single = Koord::new(1, 1);
    let catalog = ctx.catalog;
    catalog
        .city_building(
            building_type,
            level,
            single,
            ctx.timeline_year_month,
            ctx.climate,
            ctx.region,
        )
        .or_else(|| catalog.city_building(building_type, level, single, 0, ANY_CLIMATE, ANY_REGION))
        .or_else(|| {
            if building_type != BuildingType::Industrial {
                return None;
            }
            catalog.city_building(
                BuildingType::Residential,
                level,
                single,
                0,
                ANY_CLIMATE,
                ANY_REGION,
            )
        })
}

/// Building type and zero-based level encoded in a legacy name.
///
/// Two encodings exist: a leading level number followed by a type tag at
/// byte 3 (`WOHN` residential, `FAB` industrial, anything else commercial),
/// and `RES_xx_level` / `IND_xx_level` / `COM_xx_level`.
pub fn legacy_level(name: &str) -> Option<(BuildingType, u16)> {
    let bytes = name.as_bytes();
    let level = leading_int(name);
    if level > 0 {
        let building_type = if bytes.get(3..7) == Some(b"WOHN".as_slice()) {
            BuildingType::Residential
        } else if bytes.get(3..6) == Some(b"FAB".as_slice()) {
            BuildingType::Industrial
        } else {
            BuildingType::Commercial
        };
        return Some((building_type, zero_based(level)));
    }

    if bytes.get(3) != Some(&b'_') {
        return None;
    }
    let tail = name.rsplit('_').next().unwrap_or_default();
    let level = leading_int(tail);
    if level <= 0 {
        return None;
    }
    let building_type = match bytes[0].to_ascii_uppercase() {
        b'R' => BuildingType::Residential,
        b'I' => BuildingType::Industrial,
        b'C' => BuildingType::Commercial,
        _ => return None,
    };
    Some((building_type, zero_based(level)))
}

fn zero_based(level: i64) -> u16 {
    u16::try_from(level - 1).unwrap_or(u16::MAX)
}

/// Leading integer of `s`: optional whitespace and sign, then digits; 0
/// when there are none.
fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::structure_catalog::BuildingDef;

    fn catalog() -> StructureCatalog {
        let mut catalog = StructureCatalog::new(1, 1);
        for (name, building_type, level) in [
            ("Cottage", BuildingType::Residential, 2),
            ("Villa", BuildingType::Residential, 5),
            ("Shop", BuildingType::Commercial, 3),
            ("TrainStop", BuildingType::Stop, 1),
        ] {
            catalog.insert(BuildingDef::new(name, building_type, level).build());
        }
        catalog.insert(
            BuildingDef::new("Mansion", BuildingType::Residential, 2)
                .size(2, 2)
                .build(),
        );
        catalog.add_compatibility("OldCottage", "Cottage");
        catalog
    }

    fn ctx(catalog: &StructureCatalog) -> ResolveContext<'_> {
        ResolveContext {
            catalog,
            timeline_year_month: 0,
            climate: 1,
            region: 0,
        }
    }

    fn found(resolution: Resolution) -> (TileRef, ResolveStrategy) {
        match resolution {
            Resolution::Found { tile, strategy } => (tile, strategy),
            Resolution::Dropped(missing) => panic!("{} was dropped", missing.name),
        }
    }

    #[test]
    fn test_exact_name_wins() {
        let catalog = catalog();
        let (tile, strategy) = found(resolve(&ctx(&catalog), "Shop", 0));
        assert_eq!(tile.desc().name, "Shop");
        assert_eq!(strategy, ResolveStrategy::Exact);
    }

    #[test]
    fn test_compatibility_name() {
        let catalog = catalog();
        let (tile, strategy) = found(resolve(&ctx(&catalog), "OldCottage", 0));
        assert_eq!(tile.desc().name, "Cottage");
        assert_eq!(strategy, ResolveStrategy::Compatibility);
    }

    #[test]
    fn test_special_building_substring() {
        let catalog = catalog();
        let (tile, strategy) = found(resolve(&ctx(&catalog), "MyOldTrainStopV2", 0));
        assert_eq!(tile.desc().name, "TrainStop");
        assert_eq!(strategy, ResolveStrategy::SpecialBuilding("TrainStop"));
    }

    #[test]
    fn test_special_category_without_catalog_entry_is_dropped() {
        let catalog = catalog();
        // "3PostOffice" parses as a level too, but special names never fall
        // through to level guessing.
        assert!(matches!(
            resolve(&ctx(&catalog), "3PostOffice", 0),
            Resolution::Dropped(_)
        ));
    }

    #[test]
    fn test_res_level_name_resolves_to_single_tile_residential() {
        let catalog = catalog();
        let (tile, strategy) = found(resolve(&ctx(&catalog), "RES_foo_3", 0));
        assert_eq!(tile.desc().name, "Cottage");
        assert_eq!(tile.index(), 0);
        assert_eq!(
            strategy,
            ResolveStrategy::LevelReplacement {
                building_type: BuildingType::Residential,
                level: 2,
                replacement: "Cottage".into(),
            }
        );
    }

    #[test]
    fn test_unknown_name_is_dropped() {
        let catalog = catalog();
        match resolve(&ctx(&catalog), "xyzzy", 0) {
            Resolution::Dropped(missing) => {
                assert_eq!(missing.name, "xyzzy");
                assert_eq!(missing.kind, MissingKind::Building);
            }
            Resolution::Found { .. } => panic!("xyzzy should not resolve"),
        }
    }

    #[test]
    fn test_industrial_name_falls_back_to_residential() {
        let catalog = catalog();
        let (tile, _) = found(resolve(&ctx(&catalog), "IND_x_6", 0));
        assert_eq!(tile.desc().name, "Villa");
    }

    #[test]
    fn test_filtered_miss_retries_unfiltered() {
        let mut catalog = StructureCatalog::new(1, 1);
        catalog.insert(
            BuildingDef::new("Desert Shop", BuildingType::Commercial, 1)
                .climates(1 << 3)
                .build(),
        );
        let (tile, _) = found(resolve(&ctx(&catalog), "COM_a_1", 0));
        assert_eq!(tile.desc().name, "Desert Shop");
    }

    #[test]
    fn test_legacy_level_encodings() {
        assert_eq!(
            legacy_level("12 WOHN alt"),
            Some((BuildingType::Residential, 11))
        );
        assert_eq!(legacy_level("2  FAB"), Some((BuildingType::Industrial, 1)));
        assert_eq!(legacy_level("4  LADEN"), Some((BuildingType::Commercial, 3)));
        assert_eq!(
            legacy_level("com_old_7"),
            Some((BuildingType::Commercial, 6))
        );
        assert_eq!(legacy_level("RES_foo_0"), None);
        assert_eq!(legacy_level("XYZ_foo_2"), None);
        assert_eq!(legacy_level("xyzzy"), None);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("  42abc"), 42);
        assert_eq!(leading_int("-7"), -7);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
    }
}
