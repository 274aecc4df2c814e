//! Integration tests for the generation plugin using the `TestGenerator`
//! harness.
//!
//! These spin up a headless Bevy App with `GenerationPlugin` and check what
//! an observer of the plugin's events sees while the city grows.

mod driver;
mod editing;
mod inputs;
