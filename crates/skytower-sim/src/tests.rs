use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skytower_atc::{Decision, DecisionRequest, Oracle, OracleError, RuleBasedOracle};
use skytower_core::aircraft::Aircraft;
use skytower_core::airport::Airport;
use skytower_core::commands::{AtcAction, ManualCommand};
use skytower_core::config::{AirportConfig, SimSettings};
use skytower_core::constants::*;
use skytower_core::enums::{AircraftState, AircraftType, RunwayState};
use skytower_core::events::SimEvent;
use skytower_core::types::Position;

use crate::engine::{EngineConfig, SimulationEngine};
use crate::systems::collision::CollisionSystem;
use crate::systems::fuel::FuelSystem;

const DT: f64 = 0.1;

/// Oracle that always fails, for exercising the engine's fallback path.
struct BrokenOracle;

impl Oracle for BrokenOracle {
    fn name(&self) -> &str {
        "broken"
    }

    fn decide(&mut self, _request: &DecisionRequest) -> Result<Decision, OracleError> {
        Err(OracleError::Unavailable("backend offline".to_string()))
    }
}

fn engine_with_seed(seed: u64) -> SimulationEngine {
    let config = EngineConfig {
        airport: AirportConfig::default(),
        settings: SimSettings {
            seed,
            ..SimSettings::default()
        },
    };
    SimulationEngine::new(config, Box::new(RuleBasedOracle::new(seed)))
}

/// Engine that never spawns traffic, for hand-built scenarios.
fn quiet_engine(oracle: Box<dyn Oracle>) -> SimulationEngine {
    let config = EngineConfig {
        airport: AirportConfig::default(),
        settings: SimSettings {
            seed: 5,
            spawn_rate: 0.0,
            ..SimSettings::default()
        },
    };
    SimulationEngine::new(config, oracle)
}

fn add_aircraft(airport: &mut Airport, state: AircraftState, fuel: f64, position: Position) -> u32 {
    let mut rng = ChaCha8Rng::seed_from_u64(airport.aircraft.len() as u64);
    let id = airport.next_aircraft_id();
    let mut a = Aircraft::new(id, AircraftType::Boeing737, &mut rng);
    a.state = state;
    a.fuel = fuel;
    a.position = position;
    a.target_position = position;
    airport.add_aircraft(a);
    id
}

fn occupy_runway_with_lander(airport: &mut Airport, runway_id: usize, fuel: f64) -> u32 {
    let target = airport.runways[runway_id].center_position();
    let id = add_aircraft(
        airport,
        AircraftState::Landing,
        fuel,
        Position::new(target.x + 150.0, target.y + 150.0),
    );
    let idx = airport.aircraft_index(id).unwrap();
    airport.aircraft[idx].assigned_runway = Some(runway_id);
    airport.aircraft[idx].target_position = target;
    airport.runways[runway_id].state = RunwayState::OccupiedLanding;
    airport.runways[runway_id].occupied_by = Some(id);
    id
}

// --- Determinism ---

#[test]
fn same_seed_same_simulation() {
    let mut a = engine_with_seed(42);
    let mut b = engine_with_seed(42);
    for _ in 0..400 {
        a.update(DT);
        b.update(DT);
    }
    let snap_a = serde_json::to_string(&a.snapshot()).unwrap();
    let snap_b = serde_json::to_string(&b.snapshot()).unwrap();
    assert_eq!(snap_a, snap_b);
}

#[test]
fn different_seeds_diverge() {
    let mut a = engine_with_seed(1);
    let mut b = engine_with_seed(2);
    for _ in 0..400 {
        a.update(DT);
        b.update(DT);
    }
    let snap_a = serde_json::to_string(&a.snapshot()).unwrap();
    let snap_b = serde_json::to_string(&b.snapshot()).unwrap();
    assert_ne!(snap_a, snap_b);
}

#[test]
fn zero_dt_update_changes_nothing() {
    let mut engine = engine_with_seed(9);
    for _ in 0..100 {
        engine.update(DT);
    }
    let before = serde_json::to_string(&engine.snapshot()).unwrap();
    engine.update(0.0);
    let after = serde_json::to_string(&engine.snapshot()).unwrap();
    assert_eq!(before, after);
}

// --- Fuel emergencies ---

#[test]
fn critical_aircraft_preempts_occupied_runways() {
    // Scenario: every runway occupied by a non-critical lander; a 12%
    // aircraft must be forced onto one of them, not held.
    let mut airport = Airport::new(AirportConfig::default());
    let lander_a = occupy_runway_with_lander(&mut airport, 0, 60.0);
    occupy_runway_with_lander(&mut airport, 1, 55.0);
    let critical = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        12.0,
        Position::new(900.0, 600.0),
    );

    let mut fuel = FuelSystem::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let mut events = Vec::new();
    fuel.handle_emergencies(&mut airport, &mut rng, &mut events);

    let critical = airport.get_aircraft(critical).unwrap();
    assert_eq!(critical.state, AircraftState::Landing);
    let runway_id = critical.assigned_runway.expect("critical aircraft got a runway");
    assert_eq!(airport.runways[runway_id].occupied_by, Some(critical.id));

    // The displaced lander is going around, not landing.
    let displaced = airport.get_aircraft(lander_a).unwrap();
    assert_eq!(displaced.state, AircraftState::GoAround);
    assert_eq!(displaced.assigned_runway, None);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::GoAround { .. })));
}

#[test]
fn most_critical_aircraft_served_first() {
    // One free runway, 8% and 13% both critical: 8% gets it.
    let mut airport = Airport::new(AirportConfig::default());
    occupy_runway_with_lander(&mut airport, 1, 60.0);
    let less = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        13.0,
        Position::new(900.0, 200.0),
    );
    let most = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        8.0,
        Position::new(900.0, 600.0),
    );

    let mut fuel = FuelSystem::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    fuel.handle_emergencies(&mut airport, &mut rng, &mut Vec::new());

    assert_eq!(airport.runways[0].occupied_by, Some(most));
    assert_eq!(
        airport.get_aircraft(most).unwrap().state,
        AircraftState::Landing
    );
    // The 13% aircraft preempts the non-critical lander on runway 1.
    assert_eq!(airport.runways[1].occupied_by, Some(less));
}

#[test]
fn empty_tank_crashes_with_fuel_reason() {
    let mut airport = Airport::new(AirportConfig::default());
    let id = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        0.0,
        Position::new(600.0, 400.0),
    );

    let mut fuel = FuelSystem::new();
    fuel.monitor(&mut airport, &mut Vec::new());

    let aircraft = airport.get_aircraft(id).unwrap();
    assert_eq!(aircraft.state, AircraftState::Crashed);
    assert!(aircraft.crash_reason.as_deref().unwrap().contains("FUEL"));
}

// --- Collision tiers ---

#[test]
fn emergency_separation_holds_both_apart() {
    // Scenario: two mobile aircraft 50 units apart. One collision pass
    // later both are holding with targets well clear of each other.
    let mut airport = Airport::new(AirportConfig::default());
    let a = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        60.0,
        Position::new(600.0, 400.0),
    );
    let b = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        55.0,
        Position::new(650.0, 400.0),
    );

    let mut collision = CollisionSystem::new();
    let mut events = Vec::new();
    collision.check_imminent(&mut airport, &mut events);

    let a = airport.get_aircraft(a).unwrap();
    let b = airport.get_aircraft(b).unwrap();
    assert_eq!(a.state, AircraftState::Holding);
    assert_eq!(b.state, AircraftState::Holding);
    assert!(a.target_position.distance_to(&b.target_position) >= EMERGENCY_CLEARANCE);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::EmergencySeparation { .. })));
}

#[test]
fn crash_tier_destroys_both_aircraft() {
    let mut airport = Airport::new(AirportConfig::default());
    let a = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        60.0,
        Position::new(600.0, 400.0),
    );
    let b = add_aircraft(
        &mut airport,
        AircraftState::Approaching,
        55.0,
        Position::new(605.0, 400.0),
    );

    let collision = CollisionSystem::new();
    let collisions = collision.check_collisions(&airport);
    assert_eq!(collisions.len(), 1);
    let mut airport = airport;
    collision.handle_collisions(&mut airport, &collisions);

    for id in [a, b] {
        let aircraft = airport.get_aircraft(id).unwrap();
        assert_eq!(aircraft.state, AircraftState::Crashed);
        assert_eq!(aircraft.crash_reason.as_deref(), Some("MID-AIR COLLISION"));
    }
}

#[test]
fn parked_aircraft_do_not_crash_into_each_other() {
    let mut airport = Airport::new(AirportConfig::default());
    add_aircraft(
        &mut airport,
        AircraftState::AtGate,
        80.0,
        Position::new(240.0, 100.0),
    );
    add_aircraft(
        &mut airport,
        AircraftState::BoardingDeboarding,
        75.0,
        Position::new(245.0, 100.0),
    );

    let collision = CollisionSystem::new();
    assert!(collision.check_collisions(&airport).is_empty());
}

// --- Engine behavior ---

#[test]
fn oracle_failure_degrades_to_wait() {
    // Scenario: the oracle errors on every call; the aircraft keeps its
    // state and update() never panics.
    let mut engine = quiet_engine(Box::new(BrokenOracle));
    let id = add_aircraft(
        engine.airport_mut(),
        AircraftState::Approaching,
        80.0,
        Position::new(600.0, 405.0),
    );

    for _ in 0..20 {
        engine.update(DT);
    }

    let aircraft = engine.airport().get_aircraft(id).unwrap();
    assert_eq!(aircraft.state, AircraftState::Approaching);
}

#[test]
fn unsafe_hold_command_redirects_to_landing() {
    let mut engine = quiet_engine(Box::new(BrokenOracle));
    let id = add_aircraft(
        engine.airport_mut(),
        AircraftState::Approaching,
        40.0,
        Position::new(900.0, 600.0),
    );
    engine.queue_command(ManualCommand {
        aircraft_id: id,
        action: AtcAction::Hold,
    });

    engine.update(DT);

    // 40% fuel cannot cover a ten-minute airborne hold, so the command
    // becomes a forced landing.
    let aircraft = engine.airport().get_aircraft(id).unwrap();
    assert_eq!(aircraft.state, AircraftState::Landing);
    let runway_id = aircraft.assigned_runway.unwrap();
    assert_eq!(engine.airport().runways[runway_id].occupied_by, Some(id));
}

#[test]
fn invalid_command_target_is_dropped() {
    let mut engine = quiet_engine(Box::new(BrokenOracle));
    let id = add_aircraft(
        engine.airport_mut(),
        AircraftState::Approaching,
        80.0,
        Position::new(900.0, 600.0),
    );
    engine.queue_command(ManualCommand {
        aircraft_id: id,
        action: AtcAction::Takeoff { runway_id: 99 },
    });

    engine.update(DT);

    let aircraft = engine.airport().get_aircraft(id).unwrap();
    assert_eq!(aircraft.state, AircraftState::Approaching);
    assert_eq!(aircraft.assigned_runway, None);
}

#[test]
fn manual_takeoff_clearance_stages_departure() {
    let mut engine = quiet_engine(Box::new(BrokenOracle));
    let gate_pos = engine.airport().gates[0].position;
    let id = add_aircraft(engine.airport_mut(), AircraftState::AtGate, 90.0, gate_pos);
    {
        let airport = engine.airport_mut();
        airport.gates[0].occupied_by = Some(id);
        let idx = airport.aircraft_index(id).unwrap();
        airport.aircraft[idx].assigned_gate = Some(0);
    }
    engine.queue_command(ManualCommand {
        aircraft_id: id,
        action: AtcAction::Takeoff { runway_id: 0 },
    });

    engine.update(DT);

    let aircraft = engine.airport().get_aircraft(id).unwrap();
    assert_eq!(aircraft.state, AircraftState::TaxiingToRunway);
    assert_eq!(aircraft.assigned_runway, Some(0));
    assert_eq!(aircraft.assigned_gate, None);
    assert!(engine.airport().gates[0].is_available());
    assert_eq!(engine.airport().runways[0].state, RunwayState::OccupiedTakeoff);
}

#[test]
fn long_run_preserves_invariants() {
    let mut engine = engine_with_seed(1234);
    for tick in 0..3000 {
        engine.update(DT);
        if tick % 100 != 0 {
            continue;
        }
        let airport = engine.airport();
        for aircraft in &airport.aircraft {
            assert!(
                (0.0..=100.0).contains(&aircraft.fuel),
                "fuel out of range: {}",
                aircraft.fuel
            );
        }
        for runway in &airport.runways {
            assert_eq!(
                runway.occupied_by.is_none(),
                runway.state == RunwayState::Available,
                "runway occupancy out of sync"
            );
        }
        // No live pair may end a tick in collision range.
        let actives = airport.active_indices();
        for (n, &i) in actives.iter().enumerate() {
            for &j in &actives[n + 1..] {
                assert!(
                    !airport.aircraft[i].check_collision(&airport.aircraft[j]),
                    "unresolved collision between {} and {}",
                    airport.aircraft[i].callsign,
                    airport.aircraft[j].callsign
                );
            }
        }
    }
}

#[test]
fn simulation_produces_traffic_and_departures() {
    let mut engine = engine_with_seed(7);
    let mut saw_spawn = false;
    let mut saw_departure = false;
    for _ in 0..20_000 {
        engine.update(DT);
        for event in engine.take_events() {
            match event {
                SimEvent::AircraftSpawned { .. } => saw_spawn = true,
                SimEvent::Departed { .. } => saw_departure = true,
                _ => {}
            }
        }
    }
    assert!(saw_spawn, "no aircraft spawned in 2000 simulated seconds");
    assert!(saw_departure, "no aircraft departed in 2000 simulated seconds");
}
