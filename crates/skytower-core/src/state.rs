//! Serializable snapshot of the simulation, consumed by frontends and by
//! the decision oracle. Built fresh each tick; holds no references into
//! the live state.

use serde::{Deserialize, Serialize};

use crate::aircraft::{Aircraft, AircraftId};
use crate::airport::{Airport, Gate, Runway};
use crate::enums::{AircraftState, AircraftType, RunwayState};
use crate::types::Position;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftView {
    pub id: AircraftId,
    pub callsign: String,
    pub aircraft_type: AircraftType,
    pub state: AircraftState,
    pub position: Position,
    pub target_position: Position,
    pub fuel: f64,
    pub fuel_priority: u8,
    pub low_fuel: bool,
    pub critical_fuel: bool,
    pub assigned_runway: Option<usize>,
    pub assigned_gate: Option<usize>,
    pub passenger_count: u32,
}

impl AircraftView {
    pub fn from_aircraft(a: &Aircraft) -> Self {
        Self {
            id: a.id,
            callsign: a.callsign.clone(),
            aircraft_type: a.aircraft_type,
            state: a.state,
            position: a.position,
            target_position: a.target_position,
            fuel: a.fuel,
            fuel_priority: a.fuel_priority(),
            low_fuel: a.is_low_fuel(),
            critical_fuel: a.is_critical_fuel(),
            assigned_runway: a.assigned_runway,
            assigned_gate: a.assigned_gate,
            passenger_count: a.passenger_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunwayView {
    pub id: usize,
    pub start_position: Position,
    pub end_position: Position,
    pub state: RunwayState,
    pub occupied_by: Option<AircraftId>,
}

impl RunwayView {
    pub fn from_runway(r: &Runway) -> Self {
        Self {
            id: r.id,
            start_position: r.start_position,
            end_position: r.end_position,
            state: r.state,
            occupied_by: r.occupied_by,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateView {
    pub id: usize,
    pub position: Position,
    pub occupied_by: Option<AircraftId>,
}

impl GateView {
    pub fn from_gate(g: &Gate) -> Self {
        Self {
            id: g.id,
            position: g.position,
            occupied_by: g.occupied_by,
        }
    }
}

/// A detected proximity conflict between two live aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionWarning {
    pub aircraft_id: AircraftId,
    pub other_id: AircraftId,
    pub distance: f64,
}

/// The full picture at a single tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirportSnapshot {
    pub current_time: f64,
    pub aircraft: Vec<AircraftView>,
    pub runways: Vec<RunwayView>,
    pub gates: Vec<GateView>,
    pub total_crashes: u32,
    pub crashed_callsigns: Vec<String>,
    pub collision_warnings: Vec<CollisionWarning>,
}

impl AirportSnapshot {
    pub fn capture(airport: &Airport, warnings: &[CollisionWarning]) -> Self {
        Self {
            current_time: airport.current_time,
            aircraft: airport.aircraft.iter().map(AircraftView::from_aircraft).collect(),
            runways: airport.runways.iter().map(RunwayView::from_runway).collect(),
            gates: airport.gates.iter().map(GateView::from_gate).collect(),
            total_crashes: airport.total_crashes,
            crashed_callsigns: airport.crashed_callsigns.clone(),
            collision_warnings: warnings.to_vec(),
        }
    }
}
