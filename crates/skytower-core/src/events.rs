//! Simulation events surfaced to frontends and logs.

use serde::{Deserialize, Serialize};

use crate::aircraft::AircraftId;

/// A noteworthy occurrence during a tick. The engine accumulates these
/// and drains them each update; they are descriptive only and carry no
/// authority over state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    AircraftSpawned {
        aircraft_id: AircraftId,
        callsign: String,
        is_arrival: bool,
    },
    EmergencySeparation {
        aircraft_id: AircraftId,
        other_id: AircraftId,
        distance: f64,
    },
    GoAround {
        aircraft_id: AircraftId,
        reason: String,
    },
    FuelEmergency {
        aircraft_id: AircraftId,
        fuel: f64,
    },
    Crashed {
        aircraft_id: AircraftId,
        callsign: String,
        reason: String,
    },
    Departed {
        aircraft_id: AircraftId,
        callsign: String,
    },
}
