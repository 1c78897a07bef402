//! Simulation engine — coordinates every system in a fixed tick order.
//!
//! `SimulationEngine` owns the airport, the RNG, the decision oracle,
//! and the manual command queue. Each `update(dt)` is one complete
//! sequential pass; nothing suspends mid-tick and the oracle is a
//! blocking call whose failures degrade to a wait instruction.

use std::collections::{HashSet, VecDeque};
use std::f64::consts::{FRAC_PI_2, TAU};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, warn};

use skytower_atc::{Decision, DecisionRequest, Oracle};
use skytower_core::aircraft::AircraftId;
use skytower_core::airport::Airport;
use skytower_core::commands::{AtcAction, ManualCommand};
use skytower_core::config::{AirportConfig, SimConfig, SimSettings};
use skytower_core::constants::*;
use skytower_core::enums::{AircraftState, HoldingKind, RunwayState};
use skytower_core::events::SimEvent;
use skytower_core::state::{AircraftView, AirportSnapshot, CollisionWarning};
use skytower_core::types::{Position, SimTime};

use crate::systems;
use crate::systems::collision::CollisionSystem;
use crate::systems::fuel::FuelSystem;
use crate::systems::scheduler::FlightScheduler;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub airport: AirportConfig,
    pub settings: SimSettings,
}

impl From<SimConfig> for EngineConfig {
    fn from(config: SimConfig) -> Self {
        Self {
            airport: config.airport,
            settings: config.simulation,
        }
    }
}

/// The simulation engine. Owns the airport and all sim state.
pub struct SimulationEngine {
    airport: Airport,
    settings: SimSettings,
    time: SimTime,
    rng: ChaCha8Rng,
    oracle: Box<dyn Oracle>,
    scheduler: FlightScheduler,
    fuel: FuelSystem,
    collision: CollisionSystem,
    command_queue: VecDeque<ManualCommand>,
    last_oracle_poll: f64,
    counted_crashes: HashSet<AircraftId>,
    warnings: Vec<CollisionWarning>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create an engine with the given configuration and oracle.
    pub fn new(config: EngineConfig, oracle: Box<dyn Oracle>) -> Self {
        Self {
            airport: Airport::new(config.airport),
            rng: ChaCha8Rng::seed_from_u64(config.settings.seed),
            settings: config.settings,
            time: SimTime::default(),
            oracle,
            scheduler: FlightScheduler::new(),
            fuel: FuelSystem::new(),
            collision: CollisionSystem::new(),
            command_queue: VecDeque::new(),
            last_oracle_poll: 0.0,
            counted_crashes: HashSet::new(),
            warnings: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn airport(&self) -> &Airport {
        &self.airport
    }

    pub fn airport_mut(&mut self) -> &mut Airport {
        &mut self.airport
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Queue a manual command, drained before oracle polling next tick.
    pub fn queue_command(&mut self, command: ManualCommand) {
        self.command_queue.push_back(command);
    }

    /// Drain events accumulated since the last call.
    pub fn take_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> AirportSnapshot {
        AirportSnapshot::capture(&self.airport, &self.warnings)
    }

    /// Advance the simulation by `dt` seconds and return the resulting
    /// snapshot. `dt <= 0` is a complete no-op.
    pub fn update(&mut self, dt: f64) -> AirportSnapshot {
        if dt <= 0.0 {
            return self.snapshot();
        }

        self.airport.update(dt);
        self.time.advance(dt);

        self.scheduler
            .update(&mut self.airport, &self.settings, &mut self.rng, &mut self.events);
        systems::state_machine::run(&mut self.airport, &mut self.rng, &mut self.events);

        self.fuel.monitor(&mut self.airport, &mut self.events);
        self.fuel
            .handle_emergencies(&mut self.airport, &mut self.rng, &mut self.events);

        let warnings = self.collision.check_imminent(&mut self.airport, &mut self.events);
        for warning in &warnings {
            self.escalate_collision(warning);
        }

        let collisions = self.collision.check_collisions(&self.airport);
        self.collision.handle_collisions(&mut self.airport, &collisions);
        self.handle_crashes();

        while let Some(command) = self.command_queue.pop_front() {
            self.apply_command(command);
        }

        self.warnings = warnings;
        self.poll_oracle();

        systems::state_machine::assign_gates_to_waiting(&mut self.airport);
        systems::state_machine::schedule_departures(&mut self.airport, &mut self.rng);
        systems::state_machine::process_holding(&mut self.airport);

        self.snapshot()
    }

    /// Consult the oracle for one aircraft flagged by the advisory
    /// collision tier. Any failure or non-actionable answer falls back
    /// to an automatic push perpendicular to the relative bearing.
    fn escalate_collision(&mut self, warning: &CollisionWarning) {
        let Some(idx) = self.airport.aircraft_index(warning.aircraft_id) else {
            return;
        };
        let request = DecisionRequest {
            aircraft: AircraftView::from_aircraft(&self.airport.aircraft[idx]),
            snapshot: AirportSnapshot::capture(&self.airport, std::slice::from_ref(warning)),
        };

        match self.oracle.decide(&request) {
            Ok(Decision {
                action: AtcAction::Wait,
                ..
            })
            | Err(_) => {
                warn!(
                    aircraft = warning.aircraft_id,
                    "no actionable avoidance from oracle, automatic maneuver"
                );
                self.automatic_avoidance(warning);
            }
            Ok(decision) => self.apply_action(warning.aircraft_id, decision.action),
        }
    }

    /// Push perpendicular to the bearing between the pair, quantized to
    /// the nearest of the eight ring slots.
    fn automatic_avoidance(&mut self, warning: &CollisionWarning) {
        let (Some(avoid_idx), Some(other_idx)) = (
            self.airport.aircraft_index(warning.aircraft_id),
            self.airport.aircraft_index(warning.other_id),
        ) else {
            return;
        };
        let bearing = self.airport.aircraft[other_idx]
            .position
            .bearing_to(&self.airport.aircraft[avoid_idx].position);
        let angle = (bearing + FRAC_PI_2).rem_euclid(TAU);
        let slot = ((angle / (TAU / AVOIDANCE_SLOT_COUNT as f64)).round() as u8)
            % AVOIDANCE_SLOT_COUNT;
        systems::collision::execute_slot_avoidance(&mut self.airport, avoid_idx, slot);
    }

    /// Poll the oracle for every aircraft in a decision-eligible state.
    /// A live collision warning shortens the polling interval.
    fn poll_oracle(&mut self) {
        let interval = if self.warnings.is_empty() {
            self.settings.ai_decision_interval
        } else {
            self.settings.ai_collision_interval
        };
        if self.airport.current_time - self.last_oracle_poll < interval {
            return;
        }
        self.last_oracle_poll = self.airport.current_time;

        let eligible: Vec<AircraftId> = self
            .airport
            .aircraft
            .iter()
            .filter(|a| {
                match a.state {
                    AircraftState::Approaching
                    | AircraftState::AtGate
                    | AircraftState::BoardingDeboarding => true,
                    // Grounded holds are promoted by the holding queue,
                    // not the oracle.
                    AircraftState::Holding => a.holding_kind != Some(HoldingKind::Grounded),
                    _ => false,
                }
            })
            .map(|a| a.id)
            .collect();

        for id in eligible {
            let Some(idx) = self.airport.aircraft_index(id) else {
                continue;
            };
            let request = DecisionRequest {
                aircraft: AircraftView::from_aircraft(&self.airport.aircraft[idx]),
                snapshot: AirportSnapshot::capture(&self.airport, &self.warnings),
            };
            match self.oracle.decide(&request) {
                Ok(decision) => {
                    if decision.action != AtcAction::Wait {
                        debug!(
                            oracle = self.oracle.name(),
                            aircraft = id,
                            action = ?decision.action,
                            reasoning = %decision.reasoning,
                            "oracle decision"
                        );
                    }
                    self.apply_action(id, decision.action);
                }
                Err(err) => {
                    warn!(
                        oracle = self.oracle.name(),
                        aircraft = id,
                        %err,
                        "oracle failure, treating as wait"
                    );
                }
            }
        }
    }

    fn apply_command(&mut self, command: ManualCommand) {
        if self.airport.aircraft_index(command.aircraft_id).is_none() {
            warn!(aircraft = command.aircraft_id, "manual command for unknown aircraft, dropped");
            return;
        }
        self.apply_action(command.aircraft_id, command.action);
    }

    /// Apply a control action to an aircraft. Invalid targets drop the
    /// action with a warning and leave the aircraft untouched.
    fn apply_action(&mut self, id: AircraftId, action: AtcAction) {
        let Some(idx) = self.airport.aircraft_index(id) else {
            return;
        };
        match action {
            AtcAction::Land { runway_id } => self.clear_to_land(idx, runway_id, true),
            AtcAction::AssignRunway { runway_id } => self.clear_to_land(idx, runway_id, false),
            AtcAction::AssignGate { gate_id } => self.assign_gate(idx, gate_id),
            AtcAction::Takeoff { runway_id } => self.clear_for_takeoff(idx, runway_id),
            AtcAction::Hold => self.enter_holding(idx),
            AtcAction::Wait => {}
            AtcAction::Avoid { slot } => {
                systems::collision::execute_slot_avoidance(&mut self.airport, idx, slot);
            }
        }
    }

    /// Landing clearance. An emergency clearance (`preempt`) may
    /// displace a non-critical occupant into holding; a plain runway
    /// assignment requires the runway to be free.
    fn clear_to_land(&mut self, idx: usize, runway_id: usize, preempt: bool) {
        if runway_id >= self.airport.runways.len() {
            warn!(runway = runway_id, "landing clearance for unknown runway, dropped");
            return;
        }
        let id = self.airport.aircraft[idx].id;
        if let Some(occupant_id) = self.airport.runways[runway_id].occupied_by {
            if occupant_id != id {
                if !preempt {
                    warn!(runway = runway_id, "runway occupied, assignment dropped");
                    return;
                }
                if !self.displace_occupant(runway_id) {
                    warn!(runway = runway_id, "occupant not displaceable, clearance dropped");
                    return;
                }
            }
        }

        // Release any runway still reserved from an aborted approach.
        for runway in &mut self.airport.runways {
            if runway.id != runway_id && runway.occupied_by == Some(id) {
                runway.release();
            }
        }

        let target = self.airport.runways[runway_id].center_position();
        self.airport.runways[runway_id].state = RunwayState::OccupiedLanding;
        self.airport.runways[runway_id].occupied_by = Some(id);

        let aircraft = &mut self.airport.aircraft[idx];
        aircraft.assigned_runway = Some(runway_id);
        aircraft.target_position = target;
        aircraft.state = AircraftState::Landing;
        aircraft.holding_kind = None;
    }

    /// Move a non-critical occupant off a runway into an airborne hold.
    /// Returns false when the occupant must keep the runway.
    fn displace_occupant(&mut self, runway_id: usize) -> bool {
        let Some(occupant_id) = self.airport.runways[runway_id].occupied_by else {
            return true;
        };
        let Some(occ_idx) = self.airport.aircraft_index(occupant_id) else {
            self.airport.runways[runway_id].release();
            return true;
        };
        let occupant = &self.airport.aircraft[occ_idx];
        if occupant.is_critical_fuel() || !occupant.can_safely_hold(5.0) {
            return false;
        }

        let center = self.airport.config.center();
        let angle = self.rng.gen_range(0.0..TAU);
        self.airport.runways[runway_id].release();

        let occupant = &mut self.airport.aircraft[occ_idx];
        occupant.assigned_runway = None;
        occupant.target_position = Position::new(
            center.x + angle.cos() * HOLDING_PATTERN_RADIUS,
            center.y + angle.sin() * HOLDING_PATTERN_RADIUS,
        );
        occupant.state = AircraftState::Holding;
        occupant.holding_kind = Some(HoldingKind::Airborne);
        warn!(callsign = %occupant.callsign, runway = runway_id, "displaced to holding");
        true
    }

    fn assign_gate(&mut self, idx: usize, gate_id: usize) {
        if gate_id >= self.airport.gates.len() {
            warn!(gate = gate_id, "gate assignment for unknown gate, dropped");
            return;
        }
        let id = self.airport.aircraft[idx].id;
        if matches!(self.airport.gates[gate_id].occupied_by, Some(occ) if occ != id) {
            warn!(gate = gate_id, "gate occupied, assignment dropped");
            return;
        }
        let target = self.airport.gates[gate_id].position;
        self.airport.gates[gate_id].occupied_by = Some(id);

        let aircraft = &mut self.airport.aircraft[idx];
        aircraft.assigned_gate = Some(gate_id);
        aircraft.target_position = target;
        aircraft.state = AircraftState::TaxiingToGate;
    }

    fn clear_for_takeoff(&mut self, idx: usize, runway_id: usize) {
        if runway_id >= self.airport.runways.len() {
            warn!(runway = runway_id, "takeoff clearance for unknown runway, dropped");
            return;
        }
        if !self.airport.runways[runway_id].is_available() {
            warn!(runway = runway_id, "runway occupied, takeoff clearance dropped");
            return;
        }
        let id = self.airport.aircraft[idx].id;
        if let Some(gate_id) = self.airport.aircraft[idx].assigned_gate {
            self.airport.gates[gate_id].release();
        }
        let target = self.airport.runways[runway_id].center_position();
        self.airport.runways[runway_id].state = RunwayState::OccupiedTakeoff;
        self.airport.runways[runway_id].occupied_by = Some(id);

        let aircraft = &mut self.airport.aircraft[idx];
        aircraft.assigned_runway = Some(runway_id);
        aircraft.assigned_gate = None;
        aircraft.target_position = target;
        aircraft.state = AircraftState::TaxiingToRunway;
    }

    /// Holding instruction. An aircraft that cannot hold safely for ten
    /// minutes is redirected to a forced landing instead, preempting a
    /// non-critical occupant if every runway is taken.
    fn enter_holding(&mut self, idx: usize) {
        if self.airport.aircraft[idx].can_safely_hold(10.0) {
            let center = self.airport.config.center();
            let angle = self.rng.gen_range(0.0..TAU);
            let aircraft = &mut self.airport.aircraft[idx];
            aircraft.target_position = Position::new(
                center.x + angle.cos() * HOLDING_PATTERN_RADIUS,
                center.y + angle.sin() * HOLDING_PATTERN_RADIUS,
            );
            aircraft.state = AircraftState::Holding;
            aircraft.holding_kind = Some(HoldingKind::Airborne);
            return;
        }

        let runway_id = match self.airport.available_runway() {
            Some(id) => id,
            None => {
                // Must land anyway: take runway 0, displacing its
                // occupant when that is safe.
                self.displace_occupant(0);
                0
            }
        };
        warn!(
            callsign = %self.airport.aircraft[idx].callsign,
            fuel = self.airport.aircraft[idx].fuel,
            runway = runway_id,
            "cannot hold safely, forced landing"
        );
        self.clear_to_land(idx, runway_id, true);
    }

    /// Count new crashes, release their resources, and log full context
    /// for post-hoc analysis.
    fn handle_crashes(&mut self) {
        for idx in 0..self.airport.aircraft.len() {
            let aircraft = &self.airport.aircraft[idx];
            if aircraft.state != AircraftState::Crashed
                || !self.counted_crashes.insert(aircraft.id)
            {
                continue;
            }
            error!(
                callsign = %aircraft.callsign,
                reason = aircraft.crash_reason.as_deref().unwrap_or("unknown"),
                fuel = aircraft.fuel,
                x = aircraft.position.x,
                y = aircraft.position.y,
                runway = ?aircraft.assigned_runway,
                gate = ?aircraft.assigned_gate,
                "aircraft crashed"
            );
            self.events.push(SimEvent::Crashed {
                aircraft_id: aircraft.id,
                callsign: aircraft.callsign.clone(),
                reason: aircraft
                    .crash_reason
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            });
            self.airport.record_crash(idx);
        }
    }
}
