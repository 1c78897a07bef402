//! Simulation constants and tuning parameters.
//!
//! Fuel thresholds and consumption rates are load-bearing safety
//! contracts shared by the engine, the oracle, and any frontend.

// --- Fuel thresholds ---

/// Below this the aircraft needs priority handling (percent).
pub const LOW_FUEL_THRESHOLD: f64 = 25.0;

/// Below this the aircraft needs an emergency landing (percent).
pub const CRITICAL_FUEL_THRESHOLD: f64 = 15.0;

/// Below this the fuel priority reaches its maximum level (percent).
pub const EMERGENCY_FUEL_THRESHOLD: f64 = 10.0;

// --- Fuel consumption (percent per second, by state) ---

pub const BURN_APPROACHING: f64 = 0.15;
pub const BURN_LANDING: f64 = 0.10;
/// Highest burn rate: penalizes aborted landings.
pub const BURN_GO_AROUND: f64 = 0.25;
pub const BURN_TAXIING: f64 = 0.02;
pub const BURN_TAKING_OFF: f64 = 0.30;
/// Airborne holding pattern.
pub const BURN_HOLDING_AIRBORNE: f64 = 0.20;
/// Grounded holding (engines idling waiting for a runway).
pub const BURN_HOLDING_GROUNDED: f64 = 0.05;

/// Fuel reserve kept when projecting airborne holding endurance (percent).
pub const HOLDING_MARGIN_AIRBORNE: f64 = 10.0;

/// Fuel reserve kept when projecting grounded holding endurance (percent).
pub const HOLDING_MARGIN_GROUNDED: f64 = 5.0;

// --- Movement ---

/// Aircraft speed (units per second). Identical for all airframes.
pub const AIRCRAFT_SPEED: f64 = 150.0;

/// Aircraft are clamped this far inside the field bounds, except while
/// taking off.
pub const BOUNDS_MARGIN: f64 = 20.0;

/// Radius within which an aircraft counts as having reached its target.
pub const TARGET_REACHED_RADIUS: f64 = 10.0;

/// Takeoff target extends this far past the runway's far end.
pub const TAKEOFF_CLIMB_OUT_DISTANCE: f64 = 500.0;

/// Distance beyond the field bounds at which a departing aircraft is gone.
pub const DEPARTURE_MARGIN: f64 = 100.0;

// --- Collision tiers (distances in units) ---

/// Two aircraft closer than this have collided.
pub const COLLISION_DISTANCE: f64 = 10.0;

/// Emergency separation fires inside this distance.
pub const EMERGENCY_SEPARATION_DISTANCE: f64 = 100.0;

/// Smart avoidance fires inside this distance.
pub const SMART_AVOIDANCE_DISTANCE: f64 = 200.0;

/// Advisory warnings (escalated to the oracle) fire inside this distance.
pub const COLLISION_WARNING_DISTANCE: f64 = 500.0;

/// How far emergency separation pushes each aircraft apart.
pub const EMERGENCY_PUSH_DISTANCE: f64 = 250.0;

/// Minimum clearance a pushed aircraft must keep from everyone else.
pub const EMERGENCY_CLEARANCE: f64 = 120.0;

/// Minimum clearance for a smart-avoidance candidate point, checked
/// against both current and target positions of other aircraft.
pub const SMART_CLEARANCE: f64 = 180.0;

/// Ring radii searched for smart-avoidance candidates.
pub const AVOIDANCE_RING_RADII: [f64; 3] = [300.0, 400.0, 500.0];

/// Angular samples per avoidance ring.
pub const AVOIDANCE_RING_SAMPLES: usize = 16;

/// Fallback avoidance ring for slot-indexed (0-7) maneuvers.
pub const AVOIDANCE_SLOT_RADIUS: f64 = 350.0;
pub const AVOIDANCE_SLOT_COUNT: u8 = 8;

/// Seconds between smart-avoidance maneuvers for the same pair.
pub const AVOIDANCE_PAIR_INTERVAL: f64 = 1.5;

/// Seconds an aircraft stays ineligible for another emergency separation.
pub const EMERGENCY_SEPARATION_COOLDOWN: f64 = 5.0;

/// Landings within this distance of touchdown are exempt from avoidance.
pub const LANDING_SHORT_FINAL_RADIUS: f64 = 20.0;

/// Grid step and margin for the maximum-separation fallback search.
pub const SEPARATION_GRID_STEP: f64 = 100.0;
pub const SEPARATION_GRID_MARGIN: f64 = 100.0;

// --- Gate operations ---

/// Base boarding time plus per-passenger increment (seconds).
pub const BOARDING_BASE_SECS: f64 = 30.0;
pub const BOARDING_SECS_PER_PASSENGER: f64 = 0.1;

/// Refuel rates (percent per second) by amount needed.
pub const REFUEL_RATE_SMALL: f64 = 1.0;
pub const REFUEL_RATE_MEDIUM: f64 = 0.8;
pub const REFUEL_RATE_LARGE: f64 = 0.6;
pub const REFUEL_SMALL_MAX: f64 = 20.0;
pub const REFUEL_MEDIUM_MAX: f64 = 50.0;

/// Minimum refuel duration (hookup and safety checks).
pub const REFUEL_MIN_SECS: f64 = 30.0;

/// Buffer added after the longer of boarding/refueling completes.
pub const GATE_BUFFER_SECS: f64 = 30.0;

// --- Spawning ---

/// Minimum distance between a new spawn and every active aircraft.
pub const SPAWN_MIN_SEPARATION: f64 = 300.0;

/// Fraction of the spawn separation applied against target positions.
pub const SPAWN_TARGET_SEPARATION_FACTOR: f64 = 0.7;

/// Placement attempts before falling back to the emergency spawn.
pub const SPAWN_ATTEMPT_LIMIT: usize = 10;

/// Spawn sectors around the field perimeter.
pub const SPAWN_SECTORS: usize = 8;

/// Base spawn distance from the field center.
pub const SPAWN_BASE_DISTANCE: f64 = 450.0;

/// Arriving aircraft fuel range (percent).
pub const ARRIVAL_FUEL_MIN: f64 = 25.0;
pub const ARRIVAL_FUEL_MAX: f64 = 35.0;

/// Departing aircraft fuel range at spawn, prior to refueling (percent).
pub const DEPARTURE_FUEL_MIN: f64 = 15.0;
pub const DEPARTURE_FUEL_MAX: f64 = 40.0;

/// Share of spawns that are arrivals (rest are gate departures).
pub const ARRIVAL_FRACTION: f64 = 0.7;

// --- Holding geometry ---

/// Radius of the airborne holding circle around the field center.
pub const HOLDING_PATTERN_RADIUS: f64 = 200.0;

/// Radius of the grounded holding area around the field center.
pub const GROUND_HOLDING_RADIUS: f64 = 150.0;

/// Radius of the go-around climb-out circle.
pub const GO_AROUND_RADIUS: f64 = 300.0;

// --- Scheduling / oracle ---

/// Chance per tick that an AT_GATE aircraft requests departure.
pub const DEPARTURE_READINESS_CHANCE: f64 = 0.15;

/// Baseline airport capacity the spawn rate is normalized against.
pub const BASELINE_CAPACITY: f64 = 6.0;

/// Fuel-system log throttle (seconds between repeats per aircraft).
pub const FUEL_LOG_INTERVAL: f64 = 10.0;

/// Holding-fuel warning intervals (seconds).
pub const HOLDING_WARN_INTERVAL: f64 = 30.0;
pub const HOLDING_ESCALATE_INTERVAL: f64 = 10.0;
pub const GROUND_HOLDING_WARN_INTERVAL: f64 = 60.0;

/// Remaining-endurance thresholds for holding warnings (minutes).
pub const HOLDING_WARN_MINUTES: f64 = 5.0;
pub const HOLDING_ESCALATE_MINUTES: f64 = 2.0;
pub const GROUND_HOLDING_WARN_MINUTES: f64 = 10.0;
