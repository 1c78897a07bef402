//! Headless airport simulation engine.
//!
//! `SimulationEngine` owns the airport, processes manual commands, runs
//! all systems, consults the decision oracle, and produces
//! `AirportSnapshot`s. No rendering or I/O, enabling deterministic
//! testing.

pub mod engine;
pub mod systems;

#[cfg(test)]
mod tests;

pub use engine::{EngineConfig, SimulationEngine};
