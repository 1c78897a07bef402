//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Operational phase of an aircraft's lifecycle.
///
/// The state determines movement targets, fuel consumption, and which
/// transitions the state machine may apply. `Crashed` and `Departed`
/// are terminal: once entered, no further transitions occur.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftState {
    /// Inbound toward the airport, awaiting a runway.
    #[default]
    Approaching,
    /// Cleared for a runway, executing the landing sequence.
    Landing,
    /// Aborted landing, climbing out before rejoining the pattern.
    GoAround,
    /// On the ground, moving from runway to gate.
    TaxiingToGate,
    /// Parked at a gate, ready for departure clearance.
    AtGate,
    /// Passenger exchange and refueling in progress at a gate.
    BoardingDeboarding,
    /// On the ground, moving from gate to runway.
    TaxiingToRunway,
    /// Accelerating down the runway and climbing out.
    TakingOff,
    /// Circling (airborne) or parked clear of the apron (grounded),
    /// waiting for a resource.
    Holding,
    /// Destroyed by collision or fuel exhaustion. Terminal.
    Crashed,
    /// Left the simulation area after takeoff. Terminal.
    Departed,
}

impl AircraftState {
    /// Terminal states never transition again and are excluded from
    /// collision checks, fuel monitoring, and oracle polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AircraftState::Crashed | AircraftState::Departed)
    }

    /// Gate states: parked aircraft that cannot collide with each other.
    pub fn is_at_gate(&self) -> bool {
        matches!(
            self,
            AircraftState::AtGate | AircraftState::BoardingDeboarding
        )
    }

    /// States in which the aircraft is actively moving (or may be).
    pub fn is_mobile(&self) -> bool {
        matches!(
            self,
            AircraftState::Approaching
                | AircraftState::Landing
                | AircraftState::GoAround
                | AircraftState::TaxiingToGate
                | AircraftState::TaxiingToRunway
                | AircraftState::TakingOff
                | AircraftState::Holding
        )
    }
}

/// Airframe type. Affects passenger capacity only; all types share the
/// same kinematics and fuel model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AircraftType {
    #[default]
    Boeing737,
    Boeing777,
    AirbusA320,
    AirbusA380,
}

impl AircraftType {
    pub const ALL: [AircraftType; 4] = [
        AircraftType::Boeing737,
        AircraftType::Boeing777,
        AircraftType::AirbusA320,
        AircraftType::AirbusA380,
    ];

    /// Typical passenger capacity range for this airframe.
    pub fn passenger_range(&self) -> (u32, u32) {
        match self {
            AircraftType::Boeing737 => (120, 180),
            AircraftType::AirbusA320 => (140, 190),
            AircraftType::Boeing777 => (300, 400),
            AircraftType::AirbusA380 => (500, 850),
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            AircraftType::Boeing737 => "Boeing 737",
            AircraftType::Boeing777 => "Boeing 777",
            AircraftType::AirbusA320 => "Airbus A320",
            AircraftType::AirbusA380 => "Airbus A380",
        }
    }
}

/// Runway occupancy state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunwayState {
    #[default]
    Available,
    OccupiedLanding,
    OccupiedTakeoff,
}

/// Why an aircraft is holding. Airborne holds burn fuel at pattern rates;
/// grounded holds (waiting for a departure runway) idle the engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingKind {
    Airborne,
    Grounded,
}

/// Whether a scheduled flight arrives at or departs from this airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightKind {
    Arrival,
    Departure,
}
