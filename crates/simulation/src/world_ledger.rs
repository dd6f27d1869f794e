//! World-level bookkeeping touched when structures come and go: owner
//! maintenance, the building and attraction lists, erected monuments and
//! the save-safety flags raised by unrecoverable rotations.

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;

use crate::ids::{OwnerId, StructureId};

#[derive(Resource, Debug, Default)]
pub struct WorldLedger {
    maintenance: BTreeMap<OwnerId, i64>,
    world_list: BTreeSet<StructureId>,
    attractions: BTreeSet<StructureId>,
    erected_monuments: BTreeSet<String>,
    /// A rotation left a structure in a state that cannot be saved.
    pub nosave: bool,
    /// A rotation produced a layout that may not reload faithfully.
    pub nosave_warning: bool,
}

impl WorldLedger {
    pub fn add_maintenance(&mut self, owner: OwnerId, amount: i64) {
        *self.maintenance.entry(owner).or_insert(0) += amount;
    }

    pub fn maintenance_of(&self, owner: OwnerId) -> i64 {
        self.maintenance.get(&owner).copied().unwrap_or(0)
    }

    pub fn add_to_world_list(&mut self, id: StructureId) {
        self.world_list.insert(id);
    }

    pub fn remove_from_world_list(&mut self, id: StructureId) -> bool {
        self.world_list.remove(&id)
    }

    pub fn in_world_list(&self, id: StructureId) -> bool {
        self.world_list.contains(&id)
    }

    pub fn world_list_len(&self) -> usize {
        self.world_list.len()
    }

    pub fn add_attraction(&mut self, id: StructureId) {
        self.attractions.insert(id);
    }

    pub fn remove_attraction(&mut self, id: StructureId) {
        self.attractions.remove(&id);
    }

    pub fn is_attraction(&self, id: StructureId) -> bool {
        self.attractions.contains(&id)
    }

    pub fn monument_erected(&mut self, name: &str) {
        self.erected_monuments.insert(name.to_owned());
    }

    pub fn is_monument_erected(&self, name: &str) -> bool {
        self.erected_monuments.contains(name)
    }
}

// ---------------------------------------------------------------------------
// Missing assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKind {
    Building,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingAsset {
    pub name: String,
    pub kind: MissingKind,
}

/// Descriptors a save referred to that no longer exist. Collected during a
/// load and shown in the load report.
#[derive(Resource, Debug, Default)]
pub struct MissingAssets {
    pub entries: Vec<MissingAsset>,
}

impl MissingAssets {
    pub fn record(&mut self, name: &str, kind: MissingKind) {
        if !self.entries.iter().any(|e| e.name == name && e.kind == kind) {
            self.entries.push(MissingAsset {
                name: name.to_owned(),
                kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maintenance_accumulates_per_owner() {
        let mut ledger = WorldLedger::default();
        ledger.add_maintenance(OwnerId(1), 500);
        ledger.add_maintenance(OwnerId(1), -200);
        ledger.add_maintenance(OwnerId(2), 10);
        assert_eq!(ledger.maintenance_of(OwnerId(1)), 300);
        assert_eq!(ledger.maintenance_of(OwnerId(2)), 10);
        assert_eq!(ledger.maintenance_of(OwnerId(9)), 0);
    }

    #[test]
    fn test_missing_assets_are_recorded_once() {
        let mut missing = MissingAssets::default();
        missing.record("Ghost", MissingKind::Building);
        missing.record("Ghost", MissingKind::Building);
        assert_eq!(missing.entries.len(), 1);
    }
}
