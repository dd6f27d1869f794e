use std::collections::HashMap;
use std::sync::Arc;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::types::{BuildingDef, BuildingDesc, BuildingType, TileRef};
use crate::grid::Koord;

/// Immutable-after-load registry of building descriptors.
///
/// Built explicitly (from code or JSON) and inserted as a resource; nothing
/// in the lifecycle mutates it once the world is running.
#[derive(Resource, Debug, Clone)]
pub struct StructureCatalog {
    descs: Vec<Arc<BuildingDesc>>,
    by_name: HashMap<String, usize>,
    compatibility: HashMap<String, String>,
    pub passenger_classes: u8,
    pub mail_classes: u8,
}

impl Default for StructureCatalog {
    fn default() -> Self {
        Self {
            descs: Vec::new(),
            by_name: HashMap::new(),
            compatibility: HashMap::new(),
            passenger_classes: 1,
            mail_classes: 1,
        }
    }
}

/// On-disk shape of a catalog definition file.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub passenger_classes: u8,
    pub mail_classes: u8,
    pub compatibility: HashMap<String, String>,
    pub buildings: Vec<BuildingDef>,
}

impl StructureCatalog {
    pub fn new(passenger_classes: u8, mail_classes: u8) -> Self {
        Self {
            passenger_classes: passenger_classes.max(1),
            mail_classes: mail_classes.max(1),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new(file.passenger_classes, file.mail_classes);
        for def in file.buildings {
            catalog.insert(def.build());
        }
        for (old, new) in file.compatibility {
            catalog.add_compatibility(old, new);
        }
        Ok(catalog)
    }

    /// Adds a descriptor, replacing any earlier one with the same name.
    pub fn insert(&mut self, desc: BuildingDesc) -> Arc<BuildingDesc> {
        let desc = Arc::new(desc);
        match self.by_name.get(&desc.name) {
            Some(&i) => self.descs[i] = Arc::clone(&desc),
            None => {
                self.by_name.insert(desc.name.clone(), self.descs.len());
                self.descs.push(Arc::clone(&desc));
            }
        }
        desc
    }

    pub fn add_compatibility(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.compatibility.insert(old.into(), new.into());
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BuildingDesc>> {
        self.descs.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<BuildingDesc>> {
        self.by_name.get(name).map(|&i| &self.descs[i])
    }

    /// Tile `index` of the descriptor called `name`.
    pub fn find_tile(&self, name: &str, index: i16) -> Option<TileRef> {
        let desc = self.get(name)?;
        let index = u16::try_from(index).ok()?;
        TileRef::new(Arc::clone(desc), index)
    }

    /// Current name for a renamed descriptor, or `name` itself.
    pub fn compatibility_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.compatibility.get(name).map_or(name, String::as_str)
    }

    /// Picks a city building of `building_type` and footprint `size` for the
    /// requested level.
    ///
    /// Candidates must be available at `timeline_year_month` and allowed in
    /// `climate` and `region`. An exact level match wins; otherwise the
    /// highest lower level, then the lowest higher level. Ties go to the
    /// first registered descriptor.
    pub fn city_building(
        &self,
        building_type: BuildingType,
        level: u16,
        size: Koord,
        timeline_year_month: u16,
        climate: u8,
        region: u8,
    ) -> Option<&Arc<BuildingDesc>> {
        let mut below: Option<&Arc<BuildingDesc>> = None;
        let mut above: Option<&Arc<BuildingDesc>> = None;
        for desc in self.descs.iter().filter(|d| {
            d.building_type == building_type
                && d.size == size
                && d.is_available(timeline_year_month)
                && d.allows_climate(climate)
                && d.allows_region(region)
        }) {
            if desc.level == level {
                return Some(desc);
            }
            if desc.level < level {
                if below.map_or(true, |b| desc.level > b.level) {
                    below = Some(desc);
                }
            } else if above.map_or(true, |a| desc.level < a.level) {
                above = Some(desc);
            }
        }
        below.or(above)
    }
}
