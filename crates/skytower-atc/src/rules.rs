//! Deterministic rule-based oracle.
//!
//! Decision priority, highest first: critical-fuel emergencies, low-fuel
//! priority handling, then per-state traffic flow. Safety rules always
//! outrank throughput: a critical-fuel aircraft is cleared to land even
//! onto an occupied runway, and a low-fuel aircraft is never sent to a
//! holding pattern.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use skytower_core::commands::AtcAction;
use skytower_core::enums::AircraftState;
use skytower_core::state::{AircraftView, AirportSnapshot};

use crate::decision::{Decision, DecisionRequest, OracleError};
use crate::Oracle;

/// Chance per decision cycle that a gate-ready aircraft requests takeoff.
const GATE_DEPARTURE_CHANCE: f64 = 0.1;

/// Approaching aircraft above this fuel level may enter a holding pattern.
const HOLD_COMFORT_FUEL: f64 = 30.0;

/// Between this and [`HOLD_COMFORT_FUEL`], only a short hold is granted.
const HOLD_MARGINAL_FUEL: f64 = 20.0;

/// Local, deterministic tower policy. Owns its own seeded RNG so the
/// same seed replays the same decisions.
pub struct RuleBasedOracle {
    rng: ChaCha8Rng,
}

impl RuleBasedOracle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// First available runway, or (when `prefer_available` fails or is
    /// off) runway 0 as the one to clear for an emergency.
    fn best_runway(snapshot: &AirportSnapshot, prefer_available: bool) -> Option<usize> {
        if snapshot.runways.is_empty() {
            return None;
        }
        if prefer_available {
            if let Some(r) = snapshot.runways.iter().find(|r| r.occupied_by.is_none()) {
                return Some(r.id);
            }
        }
        Some(0)
    }

    fn available_runway(snapshot: &AirportSnapshot) -> Option<usize> {
        snapshot
            .runways
            .iter()
            .find(|r| r.occupied_by.is_none())
            .map(|r| r.id)
    }

    fn fuel_emergency(aircraft: &AircraftView, snapshot: &AirportSnapshot) -> Decision {
        match Self::available_runway(snapshot) {
            Some(runway_id) => Decision::new(
                AtcAction::Land { runway_id },
                format!(
                    "FUEL EMERGENCY: {} at {:.1}% fuel, immediate landing required",
                    aircraft.callsign, aircraft.fuel
                ),
            ),
            None => {
                // Every runway occupied: clear one anyway.
                let runway_id = Self::best_runway(snapshot, false).unwrap_or(0);
                Decision::new(
                    AtcAction::Land { runway_id },
                    format!(
                        "FUEL EMERGENCY: {} at {:.1}% fuel, clearing runway {} for emergency landing",
                        aircraft.callsign, aircraft.fuel, runway_id
                    ),
                )
            }
        }
    }

    fn low_fuel(aircraft: &AircraftView, snapshot: &AirportSnapshot) -> Decision {
        match aircraft.state {
            AircraftState::Approaching => match Self::available_runway(snapshot) {
                Some(runway_id) => Decision::new(
                    AtcAction::AssignRunway { runway_id },
                    format!(
                        "LOW FUEL: {} at {:.1}%, priority runway assignment",
                        aircraft.callsign, aircraft.fuel
                    ),
                ),
                // Never send a low-fuel aircraft to a holding pattern.
                None => Decision::new(
                    AtcAction::Wait,
                    format!("LOW FUEL: {} waiting for runway, no holding", aircraft.callsign),
                ),
            },
            AircraftState::Landing => Decision::new(
                AtcAction::Land {
                    runway_id: aircraft.assigned_runway.unwrap_or(0),
                },
                format!("LOW FUEL: {} continuing priority landing", aircraft.callsign),
            ),
            _ => Decision::new(
                AtcAction::Wait,
                format!(
                    "PRIORITY: normal handling for {} in state {:?}",
                    aircraft.callsign, aircraft.state
                ),
            ),
        }
    }

    fn approaching(aircraft: &AircraftView, snapshot: &AirportSnapshot) -> Decision {
        if let Some(runway_id) = Self::available_runway(snapshot) {
            return Decision::new(
                AtcAction::AssignRunway { runway_id },
                format!("assigning runway {} to {}", runway_id, aircraft.callsign),
            );
        }
        if aircraft.fuel > HOLD_COMFORT_FUEL {
            Decision::new(
                AtcAction::Hold,
                format!(
                    "no runway available, {} entering holding pattern at {:.1}% fuel",
                    aircraft.callsign, aircraft.fuel
                ),
            )
        } else if aircraft.fuel > HOLD_MARGINAL_FUEL {
            Decision::new(
                AtcAction::Hold,
                format!(
                    "no runway available, {} short holding only at {:.1}% fuel",
                    aircraft.callsign, aircraft.fuel
                ),
            )
        } else {
            let runway_id = Self::best_runway(snapshot, false).unwrap_or(0);
            Decision::new(
                AtcAction::Land { runway_id },
                format!(
                    "FUEL EMERGENCY: {} too low to hold ({:.1}%), forcing landing on runway {}",
                    aircraft.callsign, aircraft.fuel, runway_id
                ),
            )
        }
    }

    fn holding(aircraft: &AircraftView, snapshot: &AirportSnapshot) -> Decision {
        if aircraft.critical_fuel {
            let runway_id = Self::best_runway(snapshot, false).unwrap_or(0);
            return Decision::new(
                AtcAction::Land { runway_id },
                format!(
                    "CRITICAL FUEL: {} ({:.1}%), immediate landing on runway {}",
                    aircraft.callsign, aircraft.fuel, runway_id
                ),
            );
        }
        match Self::available_runway(snapshot) {
            Some(runway_id) => Decision::new(
                AtcAction::AssignRunway { runway_id },
                format!(
                    "runway {} available, bringing {} out of holding",
                    runway_id, aircraft.callsign
                ),
            ),
            None if aircraft.low_fuel => Decision::new(
                AtcAction::Hold,
                format!(
                    "LOW FUEL: {} ({:.1}%) continuing holding briefly",
                    aircraft.callsign, aircraft.fuel
                ),
            ),
            None => Decision::new(
                AtcAction::Hold,
                format!(
                    "{} continuing holding pattern at {:.1}% fuel",
                    aircraft.callsign, aircraft.fuel
                ),
            ),
        }
    }

    fn at_gate(&mut self, aircraft: &AircraftView, snapshot: &AirportSnapshot) -> Decision {
        if self.rng.gen::<f64>() < GATE_DEPARTURE_CHANCE {
            match Self::available_runway(snapshot) {
                Some(runway_id) => Decision::new(
                    AtcAction::Takeoff { runway_id },
                    format!(
                        "clearing {} for departure on runway {}",
                        aircraft.callsign, runway_id
                    ),
                ),
                None => Decision::new(
                    AtcAction::Wait,
                    format!("no runway available, {} waiting at gate", aircraft.callsign),
                ),
            }
        } else {
            Decision::new(
                AtcAction::Wait,
                format!("{} completing gate procedures", aircraft.callsign),
            )
        }
    }
}

impl Oracle for RuleBasedOracle {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn decide(&mut self, request: &DecisionRequest) -> Result<Decision, OracleError> {
        let aircraft = &request.aircraft;
        let snapshot = &request.snapshot;

        if aircraft.critical_fuel {
            return Ok(Self::fuel_emergency(aircraft, snapshot));
        }
        if aircraft.low_fuel {
            return Ok(Self::low_fuel(aircraft, snapshot));
        }

        Ok(match aircraft.state {
            AircraftState::Approaching => Self::approaching(aircraft, snapshot),
            AircraftState::Landing => Decision::new(
                AtcAction::Land {
                    runway_id: aircraft.assigned_runway.unwrap_or(0),
                },
                format!(
                    "{} continuing landing on runway {}",
                    aircraft.callsign,
                    aircraft.assigned_runway.unwrap_or(0)
                ),
            ),
            AircraftState::AtGate => self.at_gate(aircraft, snapshot),
            AircraftState::Holding => Self::holding(aircraft, snapshot),
            state => Decision::new(
                AtcAction::Wait,
                format!("no specific rule for state {state:?}"),
            ),
        })
    }
}
