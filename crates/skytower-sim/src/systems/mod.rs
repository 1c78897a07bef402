//! Simulation systems, run in a fixed order each tick by the engine.

pub mod collision;
pub mod fuel;
pub mod scheduler;
pub mod state_machine;
