//! The per-step update list: structures that currently need `step` calls.

use std::sync::{Mutex, PoisonError};

use bevy::prelude::*;

use crate::ids::StructureId;

#[derive(Resource, Debug, Default)]
pub struct AnimatedStructures {
    ids: Mutex<Vec<StructureId>>,
}

impl AnimatedStructures {
    pub fn add(&self, id: StructureId) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    pub fn remove(&self, id: StructureId) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|&s| s != id);
    }

    pub fn contains(&self, id: StructureId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Copy of the list in registration order.
    pub fn snapshot(&self) -> Vec<StructureId> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
