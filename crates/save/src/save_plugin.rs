use std::path::PathBuf;

use bevy::prelude::*;
use simulation::SaveableRegistry;

// ---------------------------------------------------------------------------
// Request buffers
// ---------------------------------------------------------------------------

/// Save request waiting for the exclusive save system.
#[derive(Resource, Default)]
pub(crate) struct PendingSave(pub(crate) Option<SaveStructuresEvent>);

/// Bytes read from disk, waiting for the exclusive load system.
#[derive(Resource, Default)]
pub(crate) struct PendingLoadBytes(pub(crate) Option<(PathBuf, Vec<u8>)>);

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Event, Debug, Clone)]
pub struct SaveStructuresEvent {
    pub path: PathBuf,
    pub compress: bool,
}

#[derive(Event, Debug, Clone)]
pub struct LoadStructuresEvent {
    pub path: PathBuf,
}

/// Result of a save or load request.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum SaveLoadOutcome {
    Saved {
        path: PathBuf,
        bytes: usize,
    },
    Loaded {
        path: PathBuf,
        restored: usize,
        dropped: usize,
    },
    Failed {
        path: PathBuf,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveStructuresEvent>()
            .add_event::<LoadStructuresEvent>()
            .add_event::<SaveLoadOutcome>()
            .init_resource::<SaveableRegistry>()
            .init_resource::<PendingSave>()
            .init_resource::<PendingLoadBytes>();

        // Detection only reads events; the exclusive systems do the work
        // with full world access once a request is buffered.
        app.add_systems(
            Update,
            (
                detect_save_event,
                detect_load_event,
                crate::exclusive_save::exclusive_save.run_if(save_pending),
                crate::exclusive_load::exclusive_load.run_if(load_pending),
            )
                .chain(),
        );
    }
}

fn save_pending(pending: Res<PendingSave>) -> bool {
    pending.0.is_some()
}

fn load_pending(pending: Res<PendingLoadBytes>) -> bool {
    pending.0.is_some()
}

// ---------------------------------------------------------------------------
// Event detection systems
// ---------------------------------------------------------------------------

/// Buffers the latest `SaveStructuresEvent`; one save per frame.
fn detect_save_event(
    mut events: EventReader<SaveStructuresEvent>,
    mut pending: ResMut<PendingSave>,
) {
    if let Some(request) = events.read().last() {
        pending.0 = Some(request.clone());
    }
}

/// Reads the requested file so the load system only deals with bytes. I/O
/// errors are reported as a failed outcome.
fn detect_load_event(
    mut events: EventReader<LoadStructuresEvent>,
    mut pending: ResMut<PendingLoadBytes>,
    mut outcomes: EventWriter<SaveLoadOutcome>,
) {
    let Some(request) = events.read().last() else {
        return;
    };
    match std::fs::read(&request.path) {
        Ok(bytes) => {
            info!(
                "Read {} bytes from {}",
                bytes.len(),
                request.path.display()
            );
            pending.0 = Some((request.path.clone(), bytes));
        }
        Err(e) => {
            error!("Failed to read {}: {e}", request.path.display());
            outcomes.send(SaveLoadOutcome::Failed {
                path: request.path.clone(),
                message: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simulation::structure::Binding;
    use simulation::structure_catalog::{BuildingDef, BuildingType};
    use simulation::test_harness::TestWorld;

    fn outcomes(world: &TestWorld) -> Vec<SaveLoadOutcome> {
        let events = world.resource::<Events<SaveLoadOutcome>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).cloned().collect()
    }

    fn world_with_bakery() -> TestWorld {
        let mut world = TestWorld::with_app(|app| {
            app.add_plugins(SavePlugin);
        })
        .with_buildings(vec![BuildingDef::new("bakery", BuildingType::Commercial, 1)]);
        world.build("bakery", 0, (4, 4), Binding::None);
        world
    }

    #[test]
    fn test_save_then_load_through_events() {
        let path = std::env::temp_dir().join("structure_plugin_roundtrip.sav");
        let mut world = world_with_bakery();

        world.world_mut().send_event(SaveStructuresEvent {
            path: path.clone(),
            compress: true,
        });
        world.app_mut().update();
        assert!(matches!(
            outcomes(&world).as_slice(),
            [SaveLoadOutcome::Saved { .. }]
        ));

        world
            .world_mut()
            .send_event(LoadStructuresEvent { path: path.clone() });
        world.app_mut().update();
        let loaded = outcomes(&world);
        assert!(loaded.contains(&SaveLoadOutcome::Loaded {
            path: path.clone(),
            restored: 1,
            dropped: 0,
        }));
        assert_eq!(world.store().len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_reports_failure() {
        let path = std::env::temp_dir().join("structure_plugin_missing.sav");
        let _ = std::fs::remove_file(&path);
        let mut world = world_with_bakery();

        world
            .world_mut()
            .send_event(LoadStructuresEvent { path: path.clone() });
        world.app_mut().update();

        assert!(matches!(
            outcomes(&world).as_slice(),
            [SaveLoadOutcome::Failed { .. }]
        ));
        assert_eq!(world.store().len(), 1);
    }
}
