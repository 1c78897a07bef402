//! Flight generation and aircraft spawning.
//!
//! Spawns arrivals around the field perimeter with sector rotation and
//! separation checks, and departures directly at free gates. The spawn
//! rate scales with airport capacity and backs off as the airspace
//! fills.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use skytower_core::aircraft::Aircraft;
use skytower_core::airport::{Airport, Flight};
use skytower_core::config::SimSettings;
use skytower_core::constants::*;
use skytower_core::enums::{AircraftState, AircraftType, FlightKind};
use skytower_core::events::SimEvent;
use skytower_core::types::Position;

const ORIGINS: [&str; 8] = ["JFK", "LAX", "ORD", "DFW", "DEN", "SFO", "SEA", "MIA"];
const DESTINATIONS: [&str; 8] = ["ATL", "BOS", "LAS", "PHX", "IAH", "CLT", "MSP", "DTW"];

/// How many recent spawn sectors are avoided when placing arrivals.
const RECENT_SECTOR_AVOID: usize = 3;
const RECENT_SECTOR_HISTORY: usize = 5;

pub struct FlightScheduler {
    last_spawn_time: f64,
    recent_sectors: Vec<usize>,
}

impl FlightScheduler {
    pub fn new() -> Self {
        Self {
            last_spawn_time: 0.0,
            recent_sectors: Vec::new(),
        }
    }

    /// Spawn new traffic when the (density-adjusted) spawn interval has
    /// elapsed and the aircraft cap allows it.
    pub fn update<R: Rng>(
        &mut self,
        airport: &mut Airport,
        settings: &SimSettings,
        rng: &mut R,
        events: &mut Vec<SimEvent>,
    ) {
        let mut rate = settings.spawn_rate * airport.config.total_capacity() as f64
            / BASELINE_CAPACITY;

        let density = airport.active_count() as f64 / settings.max_aircraft as f64;
        if density > 0.7 {
            rate *= 0.5;
        } else if density > 0.5 {
            rate *= 0.75;
        }
        if rate <= 0.0 {
            return;
        }

        let interval = 1.0 / rate;
        if airport.current_time - self.last_spawn_time <= interval {
            return;
        }
        if airport.active_count() >= settings.max_aircraft {
            return;
        }

        let kind = if rng.gen::<f64>() < ARRIVAL_FRACTION {
            FlightKind::Arrival
        } else {
            FlightKind::Departure
        };
        let flight = self.generate_flight(airport, kind, rng);
        let Some(aircraft) = self.spawn_aircraft(airport, &flight, rng) else {
            return;
        };
        self.last_spawn_time = airport.current_time;
        info!(
            callsign = %aircraft.callsign,
            kind = ?flight.kind,
            origin = %flight.origin,
            destination = %flight.destination,
            aircraft_type = aircraft.aircraft_type.name(),
            "spawned"
        );
        events.push(SimEvent::AircraftSpawned {
            aircraft_id: aircraft.id,
            callsign: aircraft.callsign.clone(),
            is_arrival: kind == FlightKind::Arrival,
        });
        airport.add_aircraft(aircraft);
    }

    fn generate_flight<R: Rng>(
        &self,
        airport: &Airport,
        kind: FlightKind,
        rng: &mut R,
    ) -> Flight {
        let (origin, destination) = match kind {
            FlightKind::Arrival => (*ORIGINS.choose(rng).unwrap_or(&"JFK"), "HOME"),
            FlightKind::Departure => ("HOME", *DESTINATIONS.choose(rng).unwrap_or(&"ATL")),
        };
        Flight {
            origin: origin.to_string(),
            destination: destination.to_string(),
            scheduled_time: airport.current_time,
            kind,
            aircraft_type: *AircraftType::ALL.choose(rng).unwrap_or(&AircraftType::Boeing737),
        }
    }

    fn spawn_aircraft<R: Rng>(
        &mut self,
        airport: &mut Airport,
        flight: &Flight,
        rng: &mut R,
    ) -> Option<Aircraft> {
        let id = airport.next_aircraft_id();
        let mut aircraft = Aircraft::new(id, flight.aircraft_type, rng);
        match flight.kind {
            FlightKind::Arrival => {
                self.spawn_arrival(airport, &mut aircraft, rng);
                Some(aircraft)
            }
            FlightKind::Departure => self
                .spawn_departure(airport, aircraft, rng),
        }
    }

    /// Place an arrival on the perimeter with sector rotation; after the
    /// attempt limit, fall back to the widest open spot.
    fn spawn_arrival<R: Rng>(&mut self, airport: &Airport, aircraft: &mut Aircraft, rng: &mut R) {
        let center = airport.config.center();

        for attempt in 0..SPAWN_ATTEMPT_LIMIT {
            let Some(position) = self.candidate_position(airport, attempt, rng) else {
                continue;
            };
            aircraft.position = position;
            aircraft.state = AircraftState::Approaching;
            aircraft.target_position = Position::new(
                center.x + rng.gen_range(-50.0..50.0),
                center.y + rng.gen_range(-50.0..50.0),
            );
            aircraft.fuel = rng.gen_range(ARRIVAL_FUEL_MIN..ARRIVAL_FUEL_MAX);
            return;
        }

        warn!(callsign = %aircraft.callsign, "no safe spawn position, using emergency spawn");
        self.emergency_spawn(airport, aircraft, rng);
    }

    /// One sector-based placement attempt. Returns None when the
    /// candidate violates separation from existing traffic.
    fn candidate_position<R: Rng>(
        &mut self,
        airport: &Airport,
        attempt: usize,
        rng: &mut R,
    ) -> Option<Position> {
        let center = airport.config.center();
        let sector_angle = std::f64::consts::TAU / SPAWN_SECTORS as f64;

        let mut available: Vec<usize> = (0..SPAWN_SECTORS).collect();
        let recent_start = self.recent_sectors.len().saturating_sub(RECENT_SECTOR_AVOID);
        for recent in &self.recent_sectors[recent_start..] {
            available.retain(|s| s != recent);
        }
        if available.is_empty() {
            available = (0..SPAWN_SECTORS).collect();
        }

        let sector = if attempt < 3 {
            *available.choose(rng).unwrap_or(&0)
        } else {
            rng.gen_range(0..SPAWN_SECTORS)
        };

        let angle = sector as f64 * sector_angle
            + rng.gen_range(-sector_angle / 4.0..sector_angle / 4.0);
        let distance =
            SPAWN_BASE_DISTANCE + rng.gen_range(-50.0..100.0) + attempt as f64 * 20.0;
        let position = Position::new(
            center.x + angle.cos() * distance,
            center.y + angle.sin() * distance,
        )
        .clamped(airport.config.width, airport.config.height, 50.0);

        if !self.spawn_position_safe(airport, &position) {
            return None;
        }
        self.recent_sectors.push(sector);
        if self.recent_sectors.len() > RECENT_SECTOR_HISTORY {
            self.recent_sectors.remove(0);
        }
        Some(position)
    }

    fn spawn_position_safe(&self, airport: &Airport, position: &Position) -> bool {
        airport
            .aircraft
            .iter()
            .filter(|a| !a.state.is_terminal())
            .all(|a| {
                position.distance_to(&a.position) >= SPAWN_MIN_SEPARATION
                    && position.distance_to(&a.target_position)
                        >= SPAWN_MIN_SEPARATION * SPAWN_TARGET_SEPARATION_FACTOR
            })
    }

    /// Perimeter sweep for the point farthest from all active traffic.
    fn emergency_spawn<R: Rng>(&self, airport: &Airport, aircraft: &mut Aircraft, rng: &mut R) {
        let center = airport.config.center();
        let (w, h) = (airport.config.width, airport.config.height);
        let mut best = Position::new(center.x + 400.0, center.y);
        let mut best_clearance = 0.0;

        for sector in 0..SPAWN_SECTORS {
            let angle = sector as f64 / SPAWN_SECTORS as f64 * std::f64::consts::TAU;
            for distance in [400.0, 500.0, 600.0] {
                let candidate = Position::new(
                    center.x + angle.cos() * distance,
                    center.y + angle.sin() * distance,
                )
                .clamped(w, h, 30.0);
                let clearance = airport
                    .aircraft
                    .iter()
                    .filter(|a| !a.state.is_terminal())
                    .map(|a| candidate.distance_to(&a.position))
                    .fold(f64::INFINITY, f64::min);
                if clearance > best_clearance && clearance.is_finite() {
                    best_clearance = clearance;
                    best = candidate;
                }
            }
        }

        aircraft.position = best;
        aircraft.state = AircraftState::Approaching;
        aircraft.target_position = center;
        aircraft.fuel = rng.gen_range(ARRIVAL_FUEL_MIN..ARRIVAL_FUEL_MAX);
    }

    /// Departures materialize at a free gate, part-fueled from their
    /// previous leg, with gate operations already running. No free gate
    /// means no spawn this cycle.
    fn spawn_departure<R: Rng>(
        &self,
        airport: &mut Airport,
        mut aircraft: Aircraft,
        rng: &mut R,
    ) -> Option<Aircraft> {
        let gate_id = airport.available_gate()?;
        let now = airport.current_time;
        airport.gates[gate_id].occupied_by = Some(aircraft.id);

        aircraft.position = airport.gates[gate_id].position;
        aircraft.target_position = aircraft.position;
        aircraft.assigned_gate = Some(gate_id);
        aircraft.state = AircraftState::BoardingDeboarding;
        aircraft.fuel = rng.gen_range(DEPARTURE_FUEL_MIN..DEPARTURE_FUEL_MAX);
        aircraft.start_gate_operations(now, rng);
        Some(aircraft)
    }
}
