//! Factory registry: the only factory facts structures need are the sector,
//! whether it is producing right now, and the city it belongs to.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::ids::{CityId, FactoryId};
use crate::structure_catalog::FactorySector;

#[derive(Debug, Clone)]
pub struct Factory {
    pub id: FactoryId,
    pub name: String,
    pub sector: FactorySector,
    pub producing: bool,
    pub city: Option<CityId>,
}

impl Factory {
    pub fn is_currently_producing(&self) -> bool {
        self.producing
    }
}

#[derive(Resource, Debug, Default)]
pub struct FactoryRegistry {
    factories: BTreeMap<FactoryId, Factory>,
    next_id: u32,
}

impl FactoryRegistry {
    pub fn open(
        &mut self,
        name: impl Into<String>,
        sector: FactorySector,
        city: Option<CityId>,
    ) -> FactoryId {
        let id = FactoryId(self.next_id);
        self.next_id += 1;
        self.factories.insert(
            id,
            Factory {
                id,
                name: name.into(),
                sector,
                producing: true,
                city,
            },
        );
        id
    }

    pub fn get(&self, id: FactoryId) -> Option<&Factory> {
        self.factories.get(&id)
    }

    pub fn set_producing(&mut self, id: FactoryId, producing: bool) {
        if let Some(f) = self.factories.get_mut(&id) {
            f.producing = producing;
        }
    }

    /// A missing factory counts as not producing.
    pub fn is_producing(&self, id: FactoryId) -> bool {
        self.get(id).is_some_and(Factory::is_currently_producing)
    }

    pub fn close(&mut self, id: FactoryId) -> Option<Factory> {
        self.factories.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_toggle_production() {
        let mut factories = FactoryRegistry::default();
        let id = factories.open("Brewery", FactorySector::EndConsumer, None);
        assert!(factories.is_producing(id));
        factories.set_producing(id, false);
        assert!(!factories.is_producing(id));
        factories.close(id);
        assert!(!factories.is_producing(id));
    }
}
