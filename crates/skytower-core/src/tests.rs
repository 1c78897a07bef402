use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::aircraft::Aircraft;
use crate::airport::Airport;
use crate::config::{AirportConfig, SimConfig};
use crate::constants::*;
use crate::enums::{AircraftState, AircraftType, HoldingKind};
use crate::types::Position;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(7)
}

fn test_aircraft() -> Aircraft {
    let mut r = rng();
    Aircraft::new(0, AircraftType::Boeing737, &mut r)
}

// --- Position math ---

#[test]
fn move_towards_caps_step_at_speed() {
    let here = Position::new(0.0, 0.0);
    let target = Position::new(1000.0, 0.0);
    let next = here.move_towards(&target, 150.0, 1.0);
    assert!((next.x - 150.0).abs() < 1e-9);
    assert_eq!(next.y, 0.0);
}

#[test]
fn move_towards_never_overshoots() {
    let here = Position::new(0.0, 0.0);
    let target = Position::new(50.0, 0.0);
    let next = here.move_towards(&target, 150.0, 1.0);
    assert_eq!(next, target);
}

#[test]
fn move_towards_snaps_when_adjacent() {
    let here = Position::new(99.95, 0.0);
    let target = Position::new(100.0, 0.0);
    assert_eq!(here.move_towards(&target, 150.0, 0.0001), target);
}

#[test]
fn clamped_keeps_positions_inside_margin() {
    let p = Position::new(-50.0, 9999.0).clamped(1200.0, 800.0, 20.0);
    assert_eq!(p, Position::new(20.0, 780.0));
}

// --- Fuel model ---

#[test]
fn fuel_burns_at_per_state_rates() {
    let bounds = AirportConfig::default();
    let cases = [
        (AircraftState::Approaching, BURN_APPROACHING),
        (AircraftState::Landing, BURN_LANDING),
        (AircraftState::GoAround, BURN_GO_AROUND),
        (AircraftState::TaxiingToGate, BURN_TAXIING),
        (AircraftState::TakingOff, BURN_TAKING_OFF),
    ];
    for (state, rate) in cases {
        let mut a = test_aircraft();
        a.state = state;
        a.position = Position::new(600.0, 400.0);
        a.target_position = a.position;
        a.update(10.0, &bounds);
        assert!(
            (a.fuel - (100.0 - rate * 10.0)).abs() < 1e-9,
            "state {state:?} burned wrong amount: {}",
            a.fuel
        );
    }
}

#[test]
fn holding_burn_depends_on_holding_kind() {
    let bounds = AirportConfig::default();
    let mut airborne = test_aircraft();
    airborne.state = AircraftState::Holding;
    airborne.holding_kind = Some(HoldingKind::Airborne);
    airborne.target_position = airborne.position;
    airborne.update(10.0, &bounds);
    assert!((airborne.fuel - (100.0 - BURN_HOLDING_AIRBORNE * 10.0)).abs() < 1e-9);

    let mut grounded = test_aircraft();
    grounded.state = AircraftState::Holding;
    grounded.holding_kind = Some(HoldingKind::Grounded);
    grounded.target_position = grounded.position;
    grounded.update(10.0, &bounds);
    assert!((grounded.fuel - (100.0 - BURN_HOLDING_GROUNDED * 10.0)).abs() < 1e-9);
}

#[test]
fn fuel_never_goes_negative() {
    let bounds = AirportConfig::default();
    let mut a = test_aircraft();
    a.state = AircraftState::GoAround;
    a.fuel = 0.1;
    a.target_position = a.position;
    a.update(100.0, &bounds);
    assert_eq!(a.fuel, 0.0);
}

#[test]
fn no_burn_while_boarding() {
    let bounds = AirportConfig::default();
    let mut a = test_aircraft();
    a.state = AircraftState::BoardingDeboarding;
    a.fuel = 40.0;
    a.target_position = a.position;
    a.update(100.0, &bounds);
    assert_eq!(a.fuel, 40.0);
}

#[test]
fn update_with_zero_dt_is_a_no_op() {
    let bounds = AirportConfig::default();
    let mut a = test_aircraft();
    a.state = AircraftState::Approaching;
    a.position = Position::new(100.0, 100.0);
    a.target_position = Position::new(900.0, 700.0);
    let before = (a.position, a.fuel);
    a.update(0.0, &bounds);
    assert_eq!((a.position, a.fuel), before);
}

#[test]
fn fuel_priority_bands() {
    let mut a = test_aircraft();
    for (fuel, priority) in [(80.0, 1), (40.0, 2), (20.0, 3), (12.0, 4), (5.0, 5)] {
        a.fuel = fuel;
        assert_eq!(a.fuel_priority(), priority, "fuel {fuel}");
    }
}

#[test]
fn threshold_predicates_are_strict() {
    let mut a = test_aircraft();
    a.fuel = LOW_FUEL_THRESHOLD;
    assert!(!a.is_low_fuel());
    a.fuel = LOW_FUEL_THRESHOLD - 0.01;
    assert!(a.is_low_fuel());
    a.fuel = CRITICAL_FUEL_THRESHOLD;
    assert!(!a.is_critical_fuel());
    a.fuel = CRITICAL_FUEL_THRESHOLD - 0.01;
    assert!(a.is_critical_fuel());
}

#[test]
fn safe_holding_respects_reserve_margin() {
    let mut a = test_aircraft();
    a.holding_kind = Some(HoldingKind::Airborne);
    // 10 minutes airborne costs 0.20 * 600 = 120% plus the 10% reserve.
    a.fuel = 100.0;
    assert!(!a.can_safely_hold(10.0));
    // 5 minutes costs 60% plus reserve = 70%.
    assert!(a.can_safely_hold(5.0));
    a.fuel = 69.9;
    assert!(!a.can_safely_hold(5.0));

    a.holding_kind = Some(HoldingKind::Grounded);
    a.fuel = 100.0;
    // Grounded: 0.05 * 600 = 30% plus 5% reserve.
    assert!(a.can_safely_hold(10.0));
    let endurance = a.safe_holding_time_minutes();
    assert!((endurance - (100.0 - 5.0) / (0.05 * 60.0)).abs() < 1e-9);
}

// --- Gate operations ---

#[test]
fn refuel_time_tiers_and_floor() {
    let mut a = test_aircraft();
    a.fuel_at_arrival = Some(90.0);
    a.target_fuel_level = Some(100.0);
    // 10% at the small rate is 10s, floored to 30s.
    assert_eq!(a.refuel_time(), REFUEL_MIN_SECS);

    a.fuel_at_arrival = Some(30.0);
    a.target_fuel_level = Some(70.0);
    // 40% at the medium rate.
    assert!((a.refuel_time() - 40.0 / REFUEL_RATE_MEDIUM).abs() < 1e-9);

    a.fuel_at_arrival = Some(15.0);
    a.target_fuel_level = Some(100.0);
    // 85% at the large rate.
    assert!((a.refuel_time() - 85.0 / REFUEL_RATE_LARGE).abs() < 1e-9);
}

#[test]
fn boarding_time_scales_with_passengers() {
    let mut a = test_aircraft();
    a.passenger_count = 150;
    assert!((a.boarding_time() - (BOARDING_BASE_SECS + 15.0)).abs() < 1e-9);
}

#[test]
fn refueling_snaps_exactly_onto_target() {
    let mut r = rng();
    let mut a = test_aircraft();
    a.state = AircraftState::BoardingDeboarding;
    a.fuel = 28.0;
    a.start_gate_operations(100.0, &mut r);
    let target = a.target_fuel_level.unwrap();
    let duration = a.refuel_time();

    a.update_refueling(100.0 + duration / 2.0);
    assert!(a.fuel < target);
    assert!(!a.refuel_completed);

    a.update_refueling(100.0 + duration);
    assert_eq!(a.fuel, target);
    assert!(a.refuel_completed);

    // Further updates leave the level alone.
    a.update_refueling(100.0 + duration + 500.0);
    assert_eq!(a.fuel, target);
}

#[test]
fn departure_requires_full_dwell_and_refuel() {
    let mut r = rng();
    let mut a = test_aircraft();
    a.state = AircraftState::BoardingDeboarding;
    a.fuel = 28.0;
    a.start_gate_operations(0.0, &mut r);
    let dwell = a.total_gate_time();

    assert!(!a.is_ready_for_departure(dwell - 1.0));
    a.update_refueling(dwell);
    assert!(a.is_ready_for_departure(dwell));
}

#[test]
fn gate_dwell_always_covers_refueling() {
    // The buffer guarantees refueling finishes before the dwell ends, so
    // a cleared departure always has its target fuel exactly.
    let mut r = rng();
    for fuel in [5.0, 28.0, 60.0, 95.0] {
        let mut a = test_aircraft();
        a.state = AircraftState::BoardingDeboarding;
        a.fuel = fuel;
        a.start_gate_operations(0.0, &mut r);
        assert!(a.total_gate_time() >= a.refuel_time());
    }
}

// --- Collision predicates ---

#[test]
fn gate_pairs_never_collide() {
    let mut a = test_aircraft();
    let mut b = test_aircraft();
    b.id = 1;
    a.state = AircraftState::AtGate;
    b.state = AircraftState::BoardingDeboarding;
    a.position = Position::new(300.0, 100.0);
    b.position = Position::new(302.0, 100.0);
    assert!(!a.check_collision(&b));

    // A mobile intruder does collide with a parked aircraft.
    b.state = AircraftState::TaxiingToGate;
    assert!(a.check_collision(&b));
}

#[test]
fn terminal_aircraft_never_collide() {
    let mut a = test_aircraft();
    let mut b = test_aircraft();
    b.id = 1;
    a.state = AircraftState::Crashed;
    b.state = AircraftState::Approaching;
    a.position = Position::new(300.0, 100.0);
    b.position = a.position;
    assert!(!a.check_collision(&b));
    assert!(!a.is_collision_imminent(&b, COLLISION_WARNING_DISTANCE));
}

#[test]
fn short_final_exempt_from_imminence() {
    let mut a = test_aircraft();
    let mut b = test_aircraft();
    b.id = 1;
    a.state = AircraftState::Landing;
    a.position = Position::new(200.0, 266.0);
    a.target_position = Position::new(200.0, 260.0);
    b.state = AircraftState::TaxiingToRunway;
    b.position = Position::new(230.0, 266.0);
    assert!(a.on_short_final());
    assert!(!a.is_collision_imminent(&b, SMART_AVOIDANCE_DISTANCE));
}

// --- Airport ---

#[test]
fn airport_builds_configured_layout() {
    let airport = Airport::new(AirportConfig::default());
    assert_eq!(airport.runways.len(), 2);
    assert_eq!(airport.gates.len(), 4);
    for runway in &airport.runways {
        assert!(runway.is_available());
        assert!((runway.length() - 300.0).abs() < 1e-9);
        assert_eq!(runway.start_position.x, 50.0);
    }
    for gate in &airport.gates {
        assert!(gate.is_available());
        assert_eq!(gate.position.y, 100.0);
    }
    // Runways are spread evenly down the field.
    assert!((airport.runways[0].start_position.y - 800.0 / 3.0).abs() < 1e-9);
}

#[test]
fn takeoff_climb_out_extends_past_runway_end() {
    let airport = Airport::new(AirportConfig::default());
    let runway = &airport.runways[0];
    let target = runway.overshoot_position(TAKEOFF_CLIMB_OUT_DISTANCE);
    assert!((target.x - (runway.end_position.x + TAKEOFF_CLIMB_OUT_DISTANCE)).abs() < 1e-9);
    assert_eq!(target.y, runway.end_position.y);
}

#[test]
fn crash_releases_runway_and_gate() {
    let mut airport = Airport::new(AirportConfig::default());
    let mut r = rng();
    let id = airport.next_aircraft_id();
    let mut a = Aircraft::new(id, AircraftType::AirbusA320, &mut r);
    a.state = AircraftState::Landing;
    a.assigned_runway = Some(0);
    a.assigned_gate = Some(2);
    airport.add_aircraft(a);
    airport.runways[0].state = crate::enums::RunwayState::OccupiedLanding;
    airport.runways[0].occupied_by = Some(id);
    airport.gates[2].occupied_by = Some(id);

    airport.record_crash(0);

    assert_eq!(airport.total_crashes, 1);
    assert!(airport.runways[0].is_available());
    assert!(airport.gates[2].is_available());
    assert_eq!(airport.aircraft[0].assigned_runway, None);
    assert_eq!(airport.available_runway(), Some(0));
}

#[test]
fn airport_update_advances_clock_and_aircraft() {
    let mut airport = Airport::new(AirportConfig::default());
    let mut r = rng();
    let id = airport.next_aircraft_id();
    let mut a = Aircraft::new(id, AircraftType::Boeing737, &mut r);
    a.position = Position::new(100.0, 400.0);
    a.target_position = Position::new(1000.0, 400.0);
    airport.add_aircraft(a);

    airport.update(1.0);
    assert_eq!(airport.current_time, 1.0);
    assert!((airport.aircraft[0].position.x - 250.0).abs() < 1e-9);

    airport.update(0.0);
    assert_eq!(airport.current_time, 1.0);
}

// --- Config ---

#[test]
fn config_defaults_fill_missing_sections() {
    let cfg: SimConfig = toml::from_str("").unwrap();
    assert_eq!(cfg.airport.runway_count, 2);
    assert_eq!(cfg.simulation.seed, 42);

    let cfg: SimConfig = toml::from_str("[airport]\nrunway_count = 3\n").unwrap();
    assert_eq!(cfg.airport.runway_count, 3);
    assert_eq!(cfg.airport.gate_count, 4);
    assert_eq!(cfg.simulation.max_aircraft, 20);
}
