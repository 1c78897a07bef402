//! The aircraft entity: position, state, fuel model, and gate operations.
//!
//! Aircraft own their per-tick physics (movement interpolation and fuel
//! burn) and the gate-operations sub-protocol. Lifecycle transitions and
//! resource assignment live in the simulation systems, not here.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::AirportConfig;
use crate::constants::*;
use crate::enums::{AircraftState, AircraftType, HoldingKind};
use crate::types::Position;

/// Unique aircraft identifier, assigned by the airport at spawn time.
pub type AircraftId = u32;

/// An individual aircraft in the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: AircraftId,
    pub callsign: String,
    pub aircraft_type: AircraftType,

    pub position: Position,
    pub target_position: Position,
    /// Movement speed (units per second).
    pub speed: f64,

    pub state: AircraftState,
    /// Fuel level as a percentage, always within [0, 100].
    pub fuel: f64,
    /// Why the aircraft is holding, when it is.
    pub holding_kind: Option<HoldingKind>,

    pub assigned_runway: Option<usize>,
    pub assigned_gate: Option<usize>,

    pub passenger_count: u32,

    // Gate-operations timeline. All times are simulation seconds.
    pub gate_arrival_time: Option<f64>,
    pub fuel_at_arrival: Option<f64>,
    pub target_fuel_level: Option<f64>,
    pub refuel_start_time: Option<f64>,
    pub refuel_completed: bool,

    /// Set exactly once, when the state becomes `Crashed`.
    pub crash_reason: Option<String>,
}

impl Aircraft {
    /// Create an aircraft with a sampled passenger count for its type.
    pub fn new<R: Rng>(
        id: AircraftId,
        aircraft_type: AircraftType,
        rng: &mut R,
    ) -> Self {
        let (min_pax, max_pax) = aircraft_type.passenger_range();
        Self {
            id,
            callsign: format!("FL{:08}", rng.gen_range(10_000_000u32..100_000_000)),
            aircraft_type,
            position: Position::default(),
            target_position: Position::default(),
            speed: AIRCRAFT_SPEED,
            state: AircraftState::Approaching,
            fuel: 100.0,
            holding_kind: None,
            assigned_runway: None,
            assigned_gate: None,
            passenger_count: rng.gen_range(min_pax..=max_pax),
            gate_arrival_time: None,
            fuel_at_arrival: None,
            target_fuel_level: None,
            refuel_start_time: None,
            refuel_completed: false,
            crash_reason: None,
        }
    }

    /// Advance position and fuel by `dt` seconds.
    ///
    /// Movement is capped so the aircraft never overshoots its target.
    /// Positions are clamped inside the field bounds except while taking
    /// off, where leaving the bounds signals departure.
    pub fn update(&mut self, dt: f64, bounds: &AirportConfig) {
        if dt <= 0.0 {
            return;
        }

        let mut next = self
            .position
            .move_towards(&self.target_position, self.speed, dt);
        if self.state != AircraftState::TakingOff {
            next = next.clamped(bounds.width, bounds.height, BOUNDS_MARGIN);
        }
        self.position = next;

        // Refueling at the gate is driven by the state machine; engines
        // are off, so nothing burns here.
        if self.state != AircraftState::BoardingDeboarding {
            self.consume_fuel(dt);
        }
    }

    /// Per-state fuel burn. Fuel floors at zero; the fuel system converts
    /// an empty tank into a crash on its next pass.
    fn consume_fuel(&mut self, dt: f64) {
        let rate = match self.state {
            AircraftState::Approaching => BURN_APPROACHING,
            AircraftState::Landing => BURN_LANDING,
            AircraftState::GoAround => BURN_GO_AROUND,
            AircraftState::TaxiingToGate | AircraftState::TaxiingToRunway => BURN_TAXIING,
            AircraftState::TakingOff => BURN_TAKING_OFF,
            AircraftState::Holding => match self.holding_kind {
                Some(HoldingKind::Grounded) => BURN_HOLDING_GROUNDED,
                _ => BURN_HOLDING_AIRBORNE,
            },
            AircraftState::AtGate
            | AircraftState::BoardingDeboarding
            | AircraftState::Crashed
            | AircraftState::Departed => 0.0,
        };
        self.fuel = (self.fuel - rate * dt).max(0.0);
    }

    /// Below the 25% low-fuel threshold.
    pub fn is_low_fuel(&self) -> bool {
        self.fuel < LOW_FUEL_THRESHOLD
    }

    /// Below the 15% critical-fuel threshold.
    pub fn is_critical_fuel(&self) -> bool {
        self.fuel < CRITICAL_FUEL_THRESHOLD
    }

    /// Ordinal fuel priority for ranking competing emergencies.
    /// 5 = critical emergency (<10%), 4 = urgent (<15%), 3 = warning
    /// (<25%), 2 = moderate (<50%), 1 = good.
    pub fn fuel_priority(&self) -> u8 {
        if self.fuel < EMERGENCY_FUEL_THRESHOLD {
            5
        } else if self.fuel < CRITICAL_FUEL_THRESHOLD {
            4
        } else if self.fuel < LOW_FUEL_THRESHOLD {
            3
        } else if self.fuel < 50.0 {
            2
        } else {
            1
        }
    }

    /// Burn rate and reserve margin for holding-endurance projections,
    /// picked by where the hold would happen.
    fn holding_profile(&self) -> (f64, f64) {
        match self.holding_kind {
            Some(HoldingKind::Grounded) => (BURN_HOLDING_GROUNDED, HOLDING_MARGIN_GROUNDED),
            _ => (BURN_HOLDING_AIRBORNE, HOLDING_MARGIN_AIRBORNE),
        }
    }

    /// Whether the tank covers `minutes` of holding plus the reserve.
    pub fn can_safely_hold(&self, minutes: f64) -> bool {
        let (rate, margin) = self.holding_profile();
        self.fuel >= rate * minutes * 60.0 + margin
    }

    /// Maximum holding endurance in minutes, keeping the reserve.
    pub fn safe_holding_time_minutes(&self) -> f64 {
        let (rate, margin) = self.holding_profile();
        let available = (self.fuel - margin).max(0.0);
        available / (rate * 60.0)
    }

    // --- Gate operations ---

    /// Begin boarding/deboarding and refueling in parallel.
    ///
    /// The target fuel level is sampled: 30% chance of full tanks, then
    /// 50% chance of 80-99%, otherwise 50-79%.
    pub fn start_gate_operations<R: Rng>(&mut self, now: f64, rng: &mut R) {
        self.gate_arrival_time = Some(now);
        self.fuel_at_arrival = Some(self.fuel);

        let target = if rng.gen::<f64>() < 0.3 {
            100.0
        } else if rng.gen::<f64>() < 0.5 {
            rng.gen_range(80.0..99.0)
        } else {
            rng.gen_range(50.0..79.0)
        };
        self.target_fuel_level = Some(target);
        self.refuel_start_time = Some(now);
        self.refuel_completed = false;
    }

    /// Seconds the fuel truck needs for the sampled top-up. Larger
    /// amounts pump slower; 30 seconds minimum for hookup.
    pub fn refuel_time(&self) -> f64 {
        let (Some(at_arrival), Some(target)) = (self.fuel_at_arrival, self.target_fuel_level)
        else {
            return 0.0;
        };
        let needed = (target - at_arrival).max(0.0);
        let duration = if needed <= REFUEL_SMALL_MAX {
            needed / REFUEL_RATE_SMALL
        } else if needed <= REFUEL_MEDIUM_MAX {
            needed / REFUEL_RATE_MEDIUM
        } else {
            needed / REFUEL_RATE_LARGE
        };
        duration.max(REFUEL_MIN_SECS)
    }

    /// Boarding/deboarding duration, scaling with passenger count.
    pub fn boarding_time(&self) -> f64 {
        BOARDING_BASE_SECS + self.passenger_count as f64 * BOARDING_SECS_PER_PASSENGER
    }

    /// Total gate dwell: boarding and refueling run in parallel, plus a
    /// buffer for final preparations.
    pub fn total_gate_time(&self) -> f64 {
        self.boarding_time().max(self.refuel_time()) + GATE_BUFFER_SECS
    }

    /// Advance the refueling timeline. Fuel rises linearly toward the
    /// target and snaps onto it exactly when the refuel duration elapses.
    pub fn update_refueling(&mut self, now: f64) {
        if self.state != AircraftState::BoardingDeboarding || self.refuel_completed {
            return;
        }
        let (Some(start), Some(target), Some(at_arrival)) = (
            self.refuel_start_time,
            self.target_fuel_level,
            self.fuel_at_arrival,
        ) else {
            return;
        };

        let duration = self.refuel_time();
        let elapsed = now - start;
        if elapsed >= duration {
            self.fuel = target;
            self.refuel_completed = true;
        } else {
            let needed = (target - at_arrival).max(0.0);
            let progress = elapsed / duration;
            self.fuel = (at_arrival + needed * progress).min(target);
        }
    }

    /// Ready once the full gate dwell has elapsed and refueling finished.
    pub fn is_ready_for_departure(&self, now: f64) -> bool {
        let Some(arrived) = self.gate_arrival_time else {
            return false;
        };
        now - arrived >= self.total_gate_time()
            && (self.refuel_completed || self.target_fuel_level.is_none())
    }

    // --- Pair predicates ---

    pub fn distance_to(&self, other: &Aircraft) -> f64 {
        self.position.distance_to(&other.position)
    }

    /// Whether this aircraft has collided with another.
    ///
    /// Terminal aircraft never collide. Aircraft parked at gates never
    /// collide with each other, and a parked aircraft only collides with
    /// a mobile one.
    pub fn check_collision(&self, other: &Aircraft) -> bool {
        if self.state.is_terminal() || other.state.is_terminal() {
            return false;
        }
        if self.state.is_at_gate() && other.state.is_at_gate() {
            return false;
        }
        if self.state.is_at_gate() && !other.state.is_mobile() {
            return false;
        }
        if other.state.is_at_gate() && !self.state.is_mobile() {
            return false;
        }
        self.distance_to(other) <= COLLISION_DISTANCE
    }

    /// Whether a collision with `other` is close enough to warrant
    /// avoidance. Excludes terminal states, gate pairs, non-mobile
    /// aircraft, and landings on short final (to avoid last-second
    /// avoidance thrash).
    pub fn is_collision_imminent(&self, other: &Aircraft, warning_distance: f64) -> bool {
        if self.state.is_terminal() || other.state.is_terminal() {
            return false;
        }
        if self.state == AircraftState::AtGate && other.state == AircraftState::AtGate {
            return false;
        }
        if self.on_short_final() || other.on_short_final() {
            return false;
        }
        if !self.state.is_mobile() || !other.state.is_mobile() {
            return false;
        }
        self.distance_to(other) <= warning_distance
    }

    /// Landing and within 20 units of touchdown.
    pub fn on_short_final(&self) -> bool {
        self.state == AircraftState::Landing
            && self.position.distance_to(&self.target_position) < LANDING_SHORT_FINAL_RADIUS
    }
}
