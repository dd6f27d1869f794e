//! Fixed-step ordering for the structure simulation.
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** clears last tick's dirty frames and advances the world clock,
//!   so every structure stepped this tick sees the same `now`.
//! * **Simulation** steps the animated list, then applies demolition and
//!   world rotation requests. A structure is never stepped after its
//!   destruction began.
//! * **PostSim** rolls the yearly trip statistics once the clock crosses a
//!   year boundary.

use bevy::prelude::*;

/// Phases of the `FixedUpdate` schedule, chained by `SimulationPlugin`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    PreSim,
    Simulation,
    PostSim,
}
