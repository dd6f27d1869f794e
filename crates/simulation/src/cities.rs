//! City registry: the external collaborator structures join and leave.
//!
//! Membership and connected-attraction lists sit behind a `Mutex` because
//! bulk loading may add members from several places at once.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bevy::prelude::*;

use crate::grid::Koord;
use crate::ids::{CityId, StructureId};

#[derive(Debug)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub center: Koord,
    members: Mutex<Vec<StructureId>>,
    connected_attractions: Mutex<Vec<StructureId>>,
}

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl City {
    pub fn new(id: CityId, name: impl Into<String>, center: Koord) -> Self {
        Self {
            id,
            name: name.into(),
            center,
            members: Mutex::new(Vec::new()),
            connected_attractions: Mutex::new(Vec::new()),
        }
    }

    pub fn add_member(&self, structure: StructureId) {
        let mut members = locked(&self.members);
        if !members.contains(&structure) {
            members.push(structure);
        }
    }

    pub fn remove_member(&self, structure: StructureId) -> bool {
        let mut members = locked(&self.members);
        let before = members.len();
        members.retain(|&s| s != structure);
        members.len() != before
    }

    pub fn has_member(&self, structure: StructureId) -> bool {
        locked(&self.members).contains(&structure)
    }

    pub fn members(&self) -> Vec<StructureId> {
        locked(&self.members).clone()
    }

    pub fn connect_attraction(&self, structure: StructureId) {
        let mut list = locked(&self.connected_attractions);
        if !list.contains(&structure) {
            list.push(structure);
        }
    }

    pub fn remove_connected_attraction(&self, structure: StructureId) {
        locked(&self.connected_attractions).retain(|&s| s != structure);
    }

    pub fn connected_attractions(&self) -> Vec<StructureId> {
        locked(&self.connected_attractions).clone()
    }
}

/// All live cities, in founding order. Save files refer to cities by their
/// position in this list.
#[derive(Resource, Debug, Default)]
pub struct CityRegistry {
    cities: Vec<City>,
    next_id: u32,
}

impl CityRegistry {
    pub fn found(&mut self, name: impl Into<String>, center: Koord) -> CityId {
        let id = CityId(self.next_id);
        self.next_id += 1;
        self.cities.push(City::new(id, name, center));
        id
    }

    /// Removes the city. Structures still pointing at it keep a stale id.
    pub fn dissolve(&mut self, id: CityId) -> Option<City> {
        let pos = self.cities.iter().position(|c| c.id == id)?;
        Some(self.cities.remove(pos))
    }

    pub fn get(&self, id: CityId) -> Option<&City> {
        self.cities.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: CityId) -> bool {
        self.get(id).is_some()
    }

    pub fn index_of(&self, id: CityId) -> Option<usize> {
        self.cities.iter().position(|c| c.id == id)
    }

    pub fn by_index(&self, index: usize) -> Option<&City> {
        self.cities.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// City whose center is closest to `k` (squared euclidean distance).
    pub fn nearest(&self, k: Koord) -> Option<CityId> {
        self.cities
            .iter()
            .min_by_key(|c| {
                let dx = i32::from(c.center.x) - i32::from(k.x);
                let dy = i32::from(c.center.y) - i32::from(k.y);
                dx * dx + dy * dy
            })
            .map(|c| c.id)
    }

    pub fn remove_connected_attraction(&self, structure: StructureId) {
        for city in &self.cities {
            city.remove_connected_attraction(structure);
        }
    }
}
