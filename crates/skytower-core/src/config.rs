//! Configuration for the airport layout and the simulation run.
//!
//! Everything deserializes from TOML with full defaults, so a missing or
//! partial config file still yields a runnable simulation.

use serde::{Deserialize, Serialize};

/// Physical airport layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirportConfig {
    /// Field width in simulation units.
    pub width: f64,
    /// Field height in simulation units.
    pub height: f64,
    pub runway_count: usize,
    pub runway_length: f64,
    pub runway_width: f64,
    pub gate_count: usize,
}

impl Default for AirportConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            runway_count: 2,
            runway_length: 300.0,
            runway_width: 40.0,
            gate_count: 4,
        }
    }
}

impl AirportConfig {
    /// Center of the field.
    pub fn center(&self) -> crate::types::Position {
        crate::types::Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Total runway + gate capacity, used to scale the spawn rate.
    pub fn total_capacity(&self) -> usize {
        self.runway_count + self.gate_count
    }
}

/// Engine tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// RNG seed. Same seed = same simulation.
    pub seed: u64,
    /// Hard cap on live (non-terminal) aircraft.
    pub max_aircraft: usize,
    /// Base spawn rate in aircraft per second, before capacity and
    /// density scaling.
    pub spawn_rate: f64,
    /// Seconds between oracle polls in normal operation.
    pub ai_decision_interval: f64,
    /// Seconds between oracle polls while a collision warning is live.
    pub ai_collision_interval: f64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            max_aircraft: 20,
            spawn_rate: 1.0,
            ai_decision_interval: 0.5,
            ai_collision_interval: 0.25,
        }
    }
}

/// Top-level configuration: one file, two sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub airport: AirportConfig,
    pub simulation: SimSettings,
}
