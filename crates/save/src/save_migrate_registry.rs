// ---------------------------------------------------------------------------
// Save migration registry: ordered, validated migration chain
// ---------------------------------------------------------------------------
//
// Each step pairs a predicate over the schema a save was written under with
// a fix-up applied to every structure record of such a save. Steps run in
// registration order. The registry validates at construction that no step
// would ever fire for a save written by this build.

use crate::save_error::SaveError;
use crate::save_types::{SaveStructure, SchemaVersion, StructureSaveData};

/// A single migration step.
pub(crate) struct MigrationStep {
    pub description: &'static str,
    /// True for schemas that need this step.
    pub applies_to: fn(SchemaVersion) -> bool,
    pub migrate_fn: fn(&mut SaveStructure),
}

/// Result of running the migration chain on a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// The schema the save was originally written under.
    pub original_version: SchemaVersion,
    /// The schema the save is now at (equals `CURRENT_SCHEMA`).
    pub final_version: SchemaVersion,
    /// Number of migration steps that were applied.
    pub steps_applied: u32,
    /// Descriptions of each step that was applied, in order.
    pub step_descriptions: Vec<&'static str>,
}

/// Registry holding the ordered chain of migration steps.
pub(crate) struct MigrationRegistry {
    steps: Vec<MigrationStep>,
    current_version: SchemaVersion,
}

impl MigrationRegistry {
    /// Build a registry from a list of migration steps.
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Two steps share a description
    /// - A step applies to `current_version` itself
    pub fn new(steps: Vec<MigrationStep>, current_version: SchemaVersion) -> Self {
        let mut seen = std::collections::HashSet::new();
        for step in &steps {
            assert!(
                seen.insert(step.description),
                "Duplicate migration step '{}'",
                step.description
            );
            assert!(
                !(step.applies_to)(current_version),
                "Migration step '{}' applies to the current schema {}",
                step.description,
                current_version
            );
        }

        Self {
            steps,
            current_version,
        }
    }

    /// Bring every record of `save` up to `current_version`.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::VersionMismatch` if the save is from a newer schema.
    pub fn migrate(&self, save: &mut StructureSaveData) -> Result<MigrationReport, SaveError> {
        let original_version = save.version;

        if save.version.is_newer_than(self.current_version) {
            return Err(SaveError::VersionMismatch {
                expected_max: self.current_version,
                found: save.version,
            });
        }

        let mut steps_applied = 0u32;
        let mut step_descriptions = Vec::new();

        for step in &self.steps {
            if (step.applies_to)(original_version) {
                for record in &mut save.structures {
                    (step.migrate_fn)(record);
                }
                steps_applied += 1;
                step_descriptions.push(step.description);
            }
        }
        save.version = self.current_version;

        Ok(MigrationReport {
            original_version,
            final_version: save.version,
            steps_applied,
            step_descriptions,
        })
    }

    #[cfg(test)]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save_types::CURRENT_SCHEMA;

    fn save_at(version: SchemaVersion) -> StructureSaveData {
        StructureSaveData {
            version,
            structures: vec![SaveStructure::default()],
            ..Default::default()
        }
    }

    #[test]
    fn test_registry_rejects_future_version() {
        let registry = crate::save_migrate::build_migration_registry();
        let mut save = save_at(SchemaVersion::new(122, 0, 16, 0));
        let result = registry.migrate(&mut save);
        assert!(matches!(
            result.unwrap_err(),
            SaveError::VersionMismatch { .. }
        ));
    }

    #[test]
    fn test_registry_noop_for_current_version() {
        let registry = crate::save_migrate::build_migration_registry();
        let mut save = save_at(CURRENT_SCHEMA);
        let before = save.clone();
        let report = registry.migrate(&mut save).unwrap();
        assert_eq!(report.original_version, CURRENT_SCHEMA);
        assert_eq!(report.final_version, CURRENT_SCHEMA);
        assert_eq!(report.steps_applied, 0);
        assert!(report.step_descriptions.is_empty());
        assert_eq!(save, before);
    }

    #[test]
    fn test_registry_reports_applied_steps_in_order() {
        let registry = crate::save_migrate::build_migration_registry();
        let mut save = save_at(SchemaVersion::default());
        let report = registry.migrate(&mut save).unwrap();
        assert!(report.steps_applied > 0);
        assert!(report.steps_applied as usize <= registry.step_count());
        assert_eq!(report.step_descriptions.len(), report.steps_applied as usize);
        assert_eq!(save.version, CURRENT_SCHEMA);
    }

    #[test]
    #[should_panic(expected = "Duplicate migration step")]
    fn test_registry_rejects_duplicate_steps() {
        let steps = vec![
            MigrationStep {
                description: "widen",
                applies_to: |v| v.extended < 3,
                migrate_fn: |_| {},
            },
            MigrationStep {
                description: "widen",
                applies_to: |v| v.extended < 4,
                migrate_fn: |_| {},
            },
        ];
        MigrationRegistry::new(steps, CURRENT_SCHEMA);
    }

    #[test]
    #[should_panic(expected = "applies to the current schema")]
    fn test_registry_rejects_step_for_current_schema() {
        let steps = vec![MigrationStep {
            description: "always",
            applies_to: |_| true,
            migrate_fn: |_| {},
        }];
        MigrationRegistry::new(steps, CURRENT_SCHEMA);
    }
}
