//! Fuel monitoring and emergency handling.
//!
//! Watches every non-terminal aircraft for low and critical fuel,
//! converts empty tanks into crashes, and runs the priority-preemptive
//! emergency scheduler: a critical aircraft is never deferred, and an
//! occupied runway is cleared by forcing its non-critical lander into a
//! go-around.

use std::collections::HashMap;

use rand::Rng;
use tracing::{error, warn};

use skytower_core::aircraft::AircraftId;
use skytower_core::airport::Airport;
use skytower_core::constants::*;
use skytower_core::enums::{AircraftState, HoldingKind, RunwayState};
use skytower_core::events::SimEvent;
use skytower_core::types::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Throttle {
    Critical,
    Low,
    Holding,
}

/// Fuel safety system. Holds only log-throttling state; all authority
/// lives in the airport it is handed each tick.
#[derive(Default)]
pub struct FuelSystem {
    last_logged: HashMap<(Throttle, AircraftId), f64>,
}

impl FuelSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `interval` seconds have passed since this key last
    /// fired; updates the timestamp when it has.
    fn should_log(&mut self, key: (Throttle, AircraftId), now: f64, interval: f64) -> bool {
        match self.last_logged.get(&key) {
            Some(&last) if now - last < interval => false,
            _ => {
                self.last_logged.insert(key, now);
                true
            }
        }
    }

    /// Throttled fuel-state logging plus the fuel-exhaustion transition.
    pub fn monitor(&mut self, airport: &mut Airport, events: &mut Vec<SimEvent>) {
        let now = airport.current_time;

        for aircraft in &mut airport.aircraft {
            if aircraft.state.is_terminal() {
                continue;
            }
            let in_pattern = matches!(
                aircraft.state,
                AircraftState::Approaching | AircraftState::Holding
            );

            if aircraft.is_critical_fuel() {
                if self.should_log((Throttle::Critical, aircraft.id), now, FUEL_LOG_INTERVAL)
                    && in_pattern
                {
                    warn!(
                        callsign = %aircraft.callsign,
                        fuel = aircraft.fuel,
                        "critical fuel, immediate landing required"
                    );
                    events.push(SimEvent::FuelEmergency {
                        aircraft_id: aircraft.id,
                        fuel: aircraft.fuel,
                    });
                    if aircraft.state == AircraftState::Holding {
                        warn!(
                            callsign = %aircraft.callsign,
                            safe_minutes = aircraft.safe_holding_time_minutes(),
                            "critical fuel while holding"
                        );
                    }
                }
            } else if aircraft.is_low_fuel()
                && self.should_log((Throttle::Low, aircraft.id), now, FUEL_LOG_INTERVAL)
                && in_pattern
            {
                warn!(
                    callsign = %aircraft.callsign,
                    fuel = aircraft.fuel,
                    "low fuel, priority landing needed"
                );
            }

            if aircraft.state == AircraftState::Holding {
                let safe_minutes = aircraft.safe_holding_time_minutes();
                let key = (Throttle::Holding, aircraft.id);
                match aircraft.holding_kind {
                    Some(HoldingKind::Grounded) => {
                        if safe_minutes < GROUND_HOLDING_WARN_MINUTES
                            && aircraft.fuel > HOLDING_MARGIN_GROUNDED
                            && self.should_log(key, now, GROUND_HOLDING_WARN_INTERVAL)
                        {
                            warn!(
                                callsign = %aircraft.callsign,
                                safe_minutes,
                                "ground holding endurance shrinking"
                            );
                        }
                    }
                    _ => {
                        if safe_minutes < HOLDING_ESCALATE_MINUTES {
                            if self.should_log(key, now, HOLDING_ESCALATE_INTERVAL) {
                                error!(
                                    callsign = %aircraft.callsign,
                                    safe_minutes,
                                    "holding endurance critical, must exit holding now"
                                );
                            }
                        } else if safe_minutes < HOLDING_WARN_MINUTES
                            && aircraft.fuel > CRITICAL_FUEL_THRESHOLD
                            && self.should_log(key, now, HOLDING_WARN_INTERVAL)
                        {
                            warn!(
                                callsign = %aircraft.callsign,
                                safe_minutes,
                                "airborne holding endurance low"
                            );
                        }
                    }
                }
            }

            if aircraft.fuel <= 0.0 && aircraft.state != AircraftState::Crashed {
                aircraft.state = AircraftState::Crashed;
                aircraft.crash_reason = Some("FUEL EXHAUSTION".to_string());
                error!(callsign = %aircraft.callsign, "crashed, fuel exhausted");
            }
        }
    }

    /// Priority-preemptive emergency landings, most-critical first.
    pub fn handle_emergencies<R: Rng>(
        &mut self,
        airport: &mut Airport,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) {
        let mut critical: Vec<(usize, f64)> = airport
            .aircraft
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                a.is_critical_fuel()
                    && matches!(
                        a.state,
                        AircraftState::Approaching | AircraftState::Holding
                    )
            })
            .map(|(i, a)| (i, a.fuel))
            .collect();
        if critical.is_empty() {
            return;
        }
        critical.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (idx, fuel) in critical {
            warn!(
                callsign = %airport.aircraft[idx].callsign,
                fuel,
                "critical fuel emergency"
            );
            if let Some(runway_id) = airport.available_runway() {
                assign_emergency_landing(airport, idx, runway_id);
            } else if let Some(runway_id) = find_runway_to_clear(airport) {
                execute_emergency_go_around(airport, runway_id, rng, events);
                assign_emergency_landing(airport, idx, runway_id);
            }
        }
    }
}

/// A runway occupied by a non-critical lander, eligible for clearing.
fn find_runway_to_clear(airport: &Airport) -> Option<usize> {
    airport.runways.iter().find_map(|runway| {
        if runway.state != RunwayState::OccupiedLanding {
            return None;
        }
        let occupant = airport.get_aircraft(runway.occupied_by?)?;
        (!occupant.is_critical_fuel()).then_some(runway.id)
    })
}

/// Force the lander off the runway into a go-around toward a random
/// point on the climb-out circle.
fn execute_emergency_go_around<R: Rng>(
    airport: &mut Airport,
    runway_id: usize,
    rng: &mut R,
    events: &mut Vec<SimEvent>,
) {
    let Some(occupant_id) = airport.runways[runway_id].occupied_by else {
        return;
    };
    let Some(idx) = airport.aircraft_index(occupant_id) else {
        return;
    };
    if airport.aircraft[idx].state != AircraftState::Landing {
        // Occupant already diverted elsewhere; just take the reservation.
        airport.runways[runway_id].release();
        airport.aircraft[idx].assigned_runway = None;
        return;
    }

    airport.runways[runway_id].release();
    let center = airport.config.center();
    let angle = rng.gen_range(0.0..std::f64::consts::TAU);

    let aircraft = &mut airport.aircraft[idx];
    aircraft.assigned_runway = None;
    aircraft.state = AircraftState::GoAround;
    aircraft.target_position = Position::new(
        center.x + angle.cos() * GO_AROUND_RADIUS,
        center.y + angle.sin() * GO_AROUND_RADIUS,
    );
    warn!(
        callsign = %aircraft.callsign,
        runway = runway_id,
        "landing aborted, runway cleared for fuel emergency"
    );
    events.push(SimEvent::GoAround {
        aircraft_id: aircraft.id,
        reason: "runway cleared for fuel emergency".to_string(),
    });
}

fn assign_emergency_landing(airport: &mut Airport, idx: usize, runway_id: usize) {
    let id = airport.aircraft[idx].id;
    for runway in &mut airport.runways {
        if runway.id != runway_id && runway.occupied_by == Some(id) {
            runway.release();
        }
    }
    let target = airport.runways[runway_id].center_position();
    airport.runways[runway_id].state = RunwayState::OccupiedLanding;
    airport.runways[runway_id].occupied_by = Some(id);

    let aircraft = &mut airport.aircraft[idx];
    aircraft.assigned_runway = Some(runway_id);
    aircraft.target_position = target;
    aircraft.state = AircraftState::Landing;
    aircraft.holding_kind = None;
    warn!(
        callsign = %aircraft.callsign,
        runway = runway_id,
        fuel = aircraft.fuel,
        "cleared for immediate emergency landing"
    );
}
