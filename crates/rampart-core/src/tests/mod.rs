//! Scenario and property tests for the full simulation pipeline.
//!
//! - `scenarios.rs`: end-to-end combat scenarios through
//!   [`Simulation`](crate::simulation::Simulation)
//! - `determinism.rs`: same seed and inputs produce identical runs
//! - `properties.rs`: proptest checks for clamping and dead-enemy exclusion
//! - `helpers.rs`: test setup utilities and factory functions

mod determinism;
mod helpers;
mod properties;
