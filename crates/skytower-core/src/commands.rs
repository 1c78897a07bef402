//! Control actions and manual command injection.

use serde::{Deserialize, Serialize};

use crate::aircraft::AircraftId;

/// An action the tower can direct an aircraft to perform. Produced by the
/// decision oracle or injected manually; the engine validates targets
/// before applying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AtcAction {
    /// Clear for landing on a runway.
    Land { runway_id: usize },
    /// Stage for a later landing clearance on a runway.
    AssignRunway { runway_id: usize },
    /// Taxi to a gate.
    AssignGate { gate_id: usize },
    /// Clear for takeoff on a runway.
    Takeoff { runway_id: usize },
    /// Enter a holding pattern (airborne) or hold on the apron (ground).
    Hold,
    /// Do nothing this decision cycle.
    Wait,
    /// Lateral avoidance toward one of eight ring slots around the
    /// airport center (slot 0 is due +x, counter-clockwise).
    Avoid { slot: u8 },
}

/// A manually injected command, queued by external callers and drained
/// once per tick before oracle polling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualCommand {
    pub aircraft_id: AircraftId,
    pub action: AtcAction,
}
