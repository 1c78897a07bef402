//! Aircraft lifecycle transitions.
//!
//! Handles every position-triggered transition (an aircraft within 10
//! units of its target) plus the time-triggered gate flow: landing
//! rollout, taxi, boarding, departure staging, and holding promotion.

use rand::Rng;
use tracing::{debug, info};

use skytower_core::airport::Airport;
use skytower_core::constants::*;
use skytower_core::enums::{AircraftState, HoldingKind, RunwayState};
use skytower_core::events::SimEvent;
use skytower_core::types::Position;

/// Advance refueling timelines and apply position-triggered transitions.
pub fn run<R: Rng>(airport: &mut Airport, rng: &mut R, events: &mut Vec<SimEvent>) {
    let now = airport.current_time;

    for aircraft in &mut airport.aircraft {
        if aircraft.state == AircraftState::BoardingDeboarding {
            aircraft.update_refueling(now);
        }
    }

    for i in 0..airport.aircraft.len() {
        let aircraft = &airport.aircraft[i];
        if aircraft
            .position
            .distance_to(&aircraft.target_position)
            >= TARGET_REACHED_RADIUS
        {
            continue;
        }
        match aircraft.state {
            AircraftState::Landing => landing_complete(airport, i),
            AircraftState::TaxiingToGate => gate_arrival(airport, i, rng),
            AircraftState::TaxiingToRunway => takeoff_start(airport, i),
            AircraftState::TakingOff => takeoff_progress(airport, i, events),
            AircraftState::GoAround => go_around_complete(airport, i),
            _ => {}
        }
    }
}

/// Landed aircraft rolls out: free the runway and taxi to a gate if one
/// is open, otherwise block the runway until `assign_gates_to_waiting`
/// finds one.
fn landing_complete(airport: &mut Airport, i: usize) {
    let Some(gate_id) = airport.available_gate() else {
        debug!(
            callsign = %airport.aircraft[i].callsign,
            runway = ?airport.aircraft[i].assigned_runway,
            "landed aircraft waiting for gate"
        );
        return;
    };

    let id = airport.aircraft[i].id;
    if let Some(runway_id) = airport.aircraft[i].assigned_runway {
        airport.runways[runway_id].release();
    }
    let gate_position = airport.gates[gate_id].position;
    airport.gates[gate_id].occupied_by = Some(id);

    let aircraft = &mut airport.aircraft[i];
    aircraft.assigned_gate = Some(gate_id);
    aircraft.assigned_runway = None;
    aircraft.target_position = gate_position;
    aircraft.state = AircraftState::TaxiingToGate;
    info!(callsign = %aircraft.callsign, gate = gate_id, "assigned gate after landing");
}

fn gate_arrival<R: Rng>(airport: &mut Airport, i: usize, rng: &mut R) {
    let now = airport.current_time;
    let aircraft = &mut airport.aircraft[i];
    aircraft.state = AircraftState::BoardingDeboarding;
    aircraft.start_gate_operations(now, rng);
    info!(
        callsign = %aircraft.callsign,
        gate = ?aircraft.assigned_gate,
        "at gate, boarding and refueling started"
    );
}

fn takeoff_start(airport: &mut Airport, i: usize) {
    let Some(runway_id) = airport.aircraft[i].assigned_runway else {
        return;
    };
    let target = airport.runways[runway_id].overshoot_position(TAKEOFF_CLIMB_OUT_DISTANCE);
    let aircraft = &mut airport.aircraft[i];
    aircraft.state = AircraftState::TakingOff;
    aircraft.target_position = target;
    info!(callsign = %aircraft.callsign, runway = runway_id, "taking off");
}

/// Departing aircraft climb out along the runway heading until they
/// leave the field; each time the interim target is reached it is
/// extended another climb-out step.
fn takeoff_progress(airport: &mut Airport, i: usize, events: &mut Vec<SimEvent>) {
    let (w, h) = (airport.config.width, airport.config.height);
    let pos = airport.aircraft[i].position;
    let gone = pos.x < -DEPARTURE_MARGIN
        || pos.x > w + DEPARTURE_MARGIN
        || pos.y < -DEPARTURE_MARGIN
        || pos.y > h + DEPARTURE_MARGIN;

    if gone {
        if let Some(runway_id) = airport.aircraft[i].assigned_runway {
            airport.runways[runway_id].release();
        }
        let aircraft = &mut airport.aircraft[i];
        aircraft.state = AircraftState::Departed;
        aircraft.assigned_runway = None;
        info!(callsign = %aircraft.callsign, "departed");
        events.push(SimEvent::Departed {
            aircraft_id: aircraft.id,
            callsign: aircraft.callsign.clone(),
        });
        return;
    }

    // Still inside the field: extend the climb-out.
    if let Some(runway_id) = airport.aircraft[i].assigned_runway {
        let runway = &airport.runways[runway_id];
        let len = runway.length();
        let dx = (runway.end_position.x - runway.start_position.x) / len;
        let dy = (runway.end_position.y - runway.start_position.y) / len;
        let aircraft = &mut airport.aircraft[i];
        aircraft.target_position = Position::new(
            aircraft.target_position.x + dx * TAKEOFF_CLIMB_OUT_DISTANCE,
            aircraft.target_position.y + dy * TAKEOFF_CLIMB_OUT_DISTANCE,
        );
    }
}

fn go_around_complete(airport: &mut Airport, i: usize) {
    let aircraft = &mut airport.aircraft[i];
    aircraft.state = AircraftState::Holding;
    aircraft.holding_kind = Some(HoldingKind::Airborne);
    info!(callsign = %aircraft.callsign, "go-around complete, holding for another attempt");
}

/// Landed aircraft stuck on a runway (no gate was free at rollout) get a
/// gate as soon as one opens.
pub fn assign_gates_to_waiting(airport: &mut Airport) {
    for i in 0..airport.aircraft.len() {
        let aircraft = &airport.aircraft[i];
        if aircraft.state != AircraftState::Landing || aircraft.assigned_gate.is_some() {
            continue;
        }
        let Some(runway_id) = aircraft.assigned_runway else {
            continue;
        };
        let rollout = airport.runways[runway_id].center_position();
        if aircraft.position.distance_to(&rollout) >= 20.0 {
            continue;
        }
        let Some(gate_id) = airport.available_gate() else {
            return;
        };

        let id = aircraft.id;
        let gate_position = airport.gates[gate_id].position;
        airport.gates[gate_id].occupied_by = Some(id);
        airport.runways[runway_id].release();

        let aircraft = &mut airport.aircraft[i];
        aircraft.assigned_gate = Some(gate_id);
        aircraft.assigned_runway = None;
        aircraft.target_position = gate_position;
        aircraft.state = AircraftState::TaxiingToGate;
        info!(callsign = %aircraft.callsign, gate = gate_id, "gate freed, leaving runway");
    }
}

/// Promote boarding aircraft whose gate operations finished, then stage
/// departures: each AT_GATE aircraft has a per-tick chance to request
/// takeoff, modeling variable departure readiness.
pub fn schedule_departures<R: Rng>(airport: &mut Airport, rng: &mut R) {
    let now = airport.current_time;

    for aircraft in &mut airport.aircraft {
        if aircraft.state == AircraftState::BoardingDeboarding
            && aircraft.is_ready_for_departure(now)
        {
            aircraft.state = AircraftState::AtGate;
            info!(
                callsign = %aircraft.callsign,
                fuel = aircraft.fuel,
                "gate operations complete, ready for departure"
            );
        }
    }

    for i in 0..airport.aircraft.len() {
        if airport.aircraft[i].state != AircraftState::AtGate {
            continue;
        }
        if rng.gen::<f64>() >= DEPARTURE_READINESS_CHANCE {
            continue;
        }
        match airport.available_runway() {
            Some(runway_id) => {
                let id = airport.aircraft[i].id;
                if let Some(gate_id) = airport.aircraft[i].assigned_gate {
                    airport.gates[gate_id].release();
                }
                let target = airport.runways[runway_id].center_position();
                airport.runways[runway_id].state = RunwayState::OccupiedTakeoff;
                airport.runways[runway_id].occupied_by = Some(id);

                let aircraft = &mut airport.aircraft[i];
                aircraft.assigned_runway = Some(runway_id);
                aircraft.assigned_gate = None;
                aircraft.target_position = target;
                aircraft.state = AircraftState::TaxiingToRunway;
                info!(
                    callsign = %aircraft.callsign,
                    runway = runway_id,
                    fuel = aircraft.fuel,
                    passengers = aircraft.passenger_count,
                    "cleared for takeoff"
                );
                // One departure per cycle keeps runway contention fair.
                break;
            }
            None => {
                // No runway: vacate the gate and hold on the apron.
                move_to_ground_holding(airport, i, rng);
                break;
            }
        }
    }
}

fn move_to_ground_holding<R: Rng>(airport: &mut Airport, i: usize, rng: &mut R) {
    if let Some(gate_id) = airport.aircraft[i].assigned_gate {
        airport.gates[gate_id].release();
    }
    let center = airport.config.center();
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);

    let aircraft = &mut airport.aircraft[i];
    aircraft.assigned_gate = None;
    aircraft.target_position = Position::new(
        center.x + angle.cos() * GROUND_HOLDING_RADIUS,
        center.y + angle.sin() * GROUND_HOLDING_RADIUS,
    );
    aircraft.state = AircraftState::Holding;
    aircraft.holding_kind = Some(HoldingKind::Grounded);
    info!(callsign = %aircraft.callsign, "no runway free, holding on the ground");
}

/// Promote at most one ground-holding aircraft per tick onto a freed
/// runway. The single-promotion bound prevents double-assignment of one
/// freed runway within a tick.
pub fn process_holding(airport: &mut Airport) {
    for i in 0..airport.aircraft.len() {
        let aircraft = &airport.aircraft[i];
        if aircraft.state != AircraftState::Holding
            || aircraft.holding_kind != Some(HoldingKind::Grounded)
        {
            continue;
        }
        let Some(runway_id) = airport.available_runway() else {
            return;
        };

        let id = aircraft.id;
        let target = airport.runways[runway_id].center_position();
        airport.runways[runway_id].state = RunwayState::OccupiedTakeoff;
        airport.runways[runway_id].occupied_by = Some(id);

        let aircraft = &mut airport.aircraft[i];
        aircraft.assigned_runway = Some(runway_id);
        aircraft.target_position = target;
        aircraft.state = AircraftState::TaxiingToRunway;
        aircraft.holding_kind = None;
        info!(callsign = %aircraft.callsign, runway = runway_id, "promoted from ground holding");
        return;
    }
}
