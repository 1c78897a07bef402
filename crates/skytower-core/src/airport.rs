//! Airport infrastructure: runways, gates, and the aircraft collection.
//!
//! The airport is pure resource bookkeeping. Runways and gates are built
//! once from configuration and never change; aircraft are appended by the
//! scheduler and persist forever (terminal aircraft are kept for display
//! and audit, never deleted). Aircraft reference resources by integer id
//! only, so nothing here can dangle when an assignment changes hands.

use serde::{Deserialize, Serialize};

use crate::aircraft::{Aircraft, AircraftId};
use crate::config::AirportConfig;
use crate::enums::{AircraftType, FlightKind, RunwayState};
use crate::types::Position;

/// A runway: a line segment with occupancy tracking.
///
/// Invariant: `occupied_by` is `None` iff `state` is `Available`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runway {
    pub id: usize,
    pub start_position: Position,
    pub end_position: Position,
    pub width: f64,
    pub state: RunwayState,
    pub occupied_by: Option<AircraftId>,
}

impl Runway {
    pub fn is_available(&self) -> bool {
        self.state == RunwayState::Available && self.occupied_by.is_none()
    }

    pub fn center_position(&self) -> Position {
        Position::new(
            (self.start_position.x + self.end_position.x) / 2.0,
            (self.start_position.y + self.end_position.y) / 2.0,
        )
    }

    pub fn length(&self) -> f64 {
        self.start_position.distance_to(&self.end_position)
    }

    /// Point `distance` units past the far end, along the runway bearing.
    /// Used as the climb-out target for takeoffs.
    pub fn overshoot_position(&self, distance: f64) -> Position {
        let len = self.length();
        let dx = (self.end_position.x - self.start_position.x) / len;
        let dy = (self.end_position.y - self.start_position.y) / len;
        Position::new(
            self.end_position.x + dx * distance,
            self.end_position.y + dy * distance,
        )
    }

    /// Release whatever aircraft held this runway.
    pub fn release(&mut self) -> Option<AircraftId> {
        self.state = RunwayState::Available;
        self.occupied_by.take()
    }
}

/// A gate: a parking position with occupancy tracking.
///
/// Invariant: the gate is available iff `occupied_by` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    pub id: usize,
    pub position: Position,
    pub occupied_by: Option<AircraftId>,
}

impl Gate {
    pub fn is_available(&self) -> bool {
        self.occupied_by.is_none()
    }

    pub fn release(&mut self) -> Option<AircraftId> {
        self.occupied_by.take()
    }
}

/// Ephemeral spawn parameter: describes the flight an aircraft is created
/// for, then is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    pub origin: String,
    pub destination: String,
    pub scheduled_time: f64,
    pub kind: FlightKind,
    pub aircraft_type: AircraftType,
}

/// The complete airport: infrastructure, the live aircraft collection,
/// the simulation clock, and crash statistics.
#[derive(Debug, Clone)]
pub struct Airport {
    pub config: AirportConfig,
    pub runways: Vec<Runway>,
    pub gates: Vec<Gate>,
    pub aircraft: Vec<Aircraft>,
    /// Simulation clock in seconds, monotone.
    pub current_time: f64,
    pub total_crashes: u32,
    pub crashed_callsigns: Vec<String>,
    next_aircraft_id: AircraftId,
}

impl Airport {
    /// Build the airport from configuration. Runways stack vertically
    /// along the left side; gates line up along the top.
    pub fn new(config: AirportConfig) -> Self {
        let runways = (0..config.runway_count)
            .map(|i| {
                let y = (i as f64 + 1.0) * (config.height / (config.runway_count as f64 + 1.0));
                Runway {
                    id: i,
                    start_position: Position::new(50.0, y),
                    end_position: Position::new(50.0 + config.runway_length, y),
                    width: config.runway_width,
                    state: RunwayState::Available,
                    occupied_by: None,
                }
            })
            .collect();

        let gates = (0..config.gate_count)
            .map(|i| Gate {
                id: i,
                position: Position::new(
                    (i as f64 + 1.0) * (config.width / (config.gate_count as f64 + 1.0)),
                    100.0,
                ),
                occupied_by: None,
            })
            .collect();

        Self {
            config,
            runways,
            gates,
            aircraft: Vec::new(),
            current_time: 0.0,
            total_crashes: 0,
            crashed_callsigns: Vec::new(),
            next_aircraft_id: 0,
        }
    }

    /// Advance the clock and every aircraft's physics by `dt`.
    pub fn update(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        self.current_time += dt;
        for aircraft in &mut self.aircraft {
            aircraft.update(dt, &self.config);
        }
    }

    /// Allocate the next aircraft id.
    pub fn next_aircraft_id(&mut self) -> AircraftId {
        let id = self.next_aircraft_id;
        self.next_aircraft_id += 1;
        id
    }

    pub fn add_aircraft(&mut self, aircraft: Aircraft) {
        self.aircraft.push(aircraft);
    }

    /// Id of the first available runway, if any.
    pub fn available_runway(&self) -> Option<usize> {
        self.runways.iter().find(|r| r.is_available()).map(|r| r.id)
    }

    /// Id of the first available gate, if any.
    pub fn available_gate(&self) -> Option<usize> {
        self.gates.iter().find(|g| g.is_available()).map(|g| g.id)
    }

    /// Index of an aircraft in the collection by id.
    pub fn aircraft_index(&self, id: AircraftId) -> Option<usize> {
        self.aircraft.iter().position(|a| a.id == id)
    }

    pub fn get_aircraft(&self, id: AircraftId) -> Option<&Aircraft> {
        self.aircraft.iter().find(|a| a.id == id)
    }

    pub fn get_aircraft_mut(&mut self, id: AircraftId) -> Option<&mut Aircraft> {
        self.aircraft.iter_mut().find(|a| a.id == id)
    }

    /// Indices of all non-terminal aircraft.
    pub fn active_indices(&self) -> Vec<usize> {
        self.aircraft
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.state.is_terminal())
            .map(|(i, _)| i)
            .collect()
    }

    /// Count of non-terminal aircraft.
    pub fn active_count(&self) -> usize {
        self.aircraft
            .iter()
            .filter(|a| !a.state.is_terminal())
            .count()
    }

    /// Record a crash: bump counters and release any runway or gate whose
    /// occupancy still names the crashed aircraft.
    pub fn record_crash(&mut self, aircraft_index: usize) {
        let id = self.aircraft[aircraft_index].id;
        let callsign = self.aircraft[aircraft_index].callsign.clone();
        self.total_crashes += 1;
        self.crashed_callsigns.push(callsign);

        for runway in &mut self.runways {
            if runway.occupied_by == Some(id) {
                runway.release();
            }
        }
        for gate in &mut self.gates {
            if gate.occupied_by == Some(id) {
                gate.release();
            }
        }
        let aircraft = &mut self.aircraft[aircraft_index];
        aircraft.assigned_runway = None;
        aircraft.assigned_gate = None;
    }
}
