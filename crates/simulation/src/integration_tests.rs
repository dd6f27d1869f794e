//! Integration tests for the structure lifecycle using the `TestWorld`
//! harness: a headless Bevy App with `SimulationPlugin`.

mod building_lifecycle_tests;
mod rotation_tests;
