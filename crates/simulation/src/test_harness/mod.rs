//! # TestWorld: headless harness for structure lifecycle tests
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` so tests can place
//! buildings, advance fixed steps and inspect the resulting resources
//! without a window or renderer.

mod queries;
mod setup;

use bevy::app::App;
use bevy::prelude::*;

use crate::structure_store::{self, StructureStore, StructureWorld};
use crate::SimulationPlugin;

/// A headless Bevy App wrapping `SimulationPlugin`.
///
/// Use builder methods to set up the world, then call `tick()` to advance
/// the simulation and query the resulting resources.
pub struct TestWorld {
    app: App,
}

impl TestWorld {
    /// An empty 128x128 world with default parameters and an empty catalog.
    pub fn new() -> Self {
        Self::with_app(|_| {})
    }

    /// Like [`TestWorld::new`], with `configure` run on the app before the
    /// first update (extra plugins, resources).
    pub fn with_app(configure: impl FnOnce(&mut App)) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(SimulationPlugin);
        configure(&mut app);
        // Run one update so Startup systems execute.
        app.update();
        Self { app }
    }

    /// Run `f` against the store with a borrowed [`StructureWorld`] built
    /// from the app's resources.
    pub fn with_structure_world<R>(
        &mut self,
        f: impl FnOnce(&mut StructureStore, &mut StructureWorld) -> R,
    ) -> R {
        structure_store::with_structure_world(self.app.world_mut(), f)
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
