//! Multi-tier collision detection and avoidance.
//!
//! Four concentric tiers over all non-terminal pairs each tick:
//! advisory (500) escalates to the oracle, smart avoidance (200)
//! repositions one aircraft onto a vetted ring point, emergency
//! separation (100) pushes both apart synchronously, and the crash tier
//! (10) marks both aircraft destroyed. Pairwise O(n^2), fine at the
//! aircraft counts this simulation runs.

use std::collections::HashMap;

use tracing::{error, info, warn};

use skytower_core::aircraft::{Aircraft, AircraftId};
use skytower_core::airport::Airport;
use skytower_core::constants::*;
use skytower_core::enums::{AircraftState, HoldingKind};
use skytower_core::events::SimEvent;
use skytower_core::state::CollisionWarning;
use skytower_core::types::Position;

/// Clamp margin for computed avoidance positions.
const AVOIDANCE_BOUNDS_MARGIN: f64 = 50.0;

/// Collision safety system. Holds throttling state only.
#[derive(Default)]
pub struct CollisionSystem {
    /// Per-pair timestamp of the last smart/advisory trigger.
    pair_last_triggered: HashMap<(AircraftId, AircraftId), f64>,
    /// Per-aircraft emergency-separation cool-down. While either member
    /// of a pair is listed, that pair cannot re-trigger an emergency;
    /// a second pair sharing an aircraft defers to the next tick.
    emergency_active: HashMap<AircraftId, f64>,
}

fn pair_key(a: AircraftId, b: AircraftId) -> (AircraftId, AircraftId) {
    (a.min(b), a.max(b))
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the emergency and smart tiers, and collect advisory pairs
    /// for oracle escalation. Each warning names the aircraft that
    /// should maneuver first.
    pub fn check_imminent(
        &mut self,
        airport: &mut Airport,
        events: &mut Vec<SimEvent>,
    ) -> Vec<CollisionWarning> {
        let now = airport.current_time;
        let actives = airport.active_indices();
        let mut advisories = Vec::new();

        for ii in 0..actives.len() {
            for jj in (ii + 1)..actives.len() {
                let (i, j) = (actives[ii], actives[jj]);
                let (id_a, id_b, distance) = {
                    let a = &airport.aircraft[i];
                    let b = &airport.aircraft[j];
                    (a.id, b.id, a.distance_to(b))
                };

                if distance <= EMERGENCY_SEPARATION_DISTANCE {
                    if !self.emergency_active.contains_key(&id_a)
                        && !self.emergency_active.contains_key(&id_b)
                    {
                        self.emergency_active.insert(id_a, now);
                        self.emergency_active.insert(id_b, now);
                        warn!(
                            a = %airport.aircraft[i].callsign,
                            b = %airport.aircraft[j].callsign,
                            distance,
                            "emergency separation"
                        );
                        emergency_separation(airport, i, j);
                        events.push(SimEvent::EmergencySeparation {
                            aircraft_id: id_a,
                            other_id: id_b,
                            distance,
                        });
                    }
                    continue;
                }

                if distance <= SMART_AVOIDANCE_DISTANCE {
                    let key = pair_key(id_a, id_b);
                    if self.pair_ready(key, now) {
                        self.pair_last_triggered.insert(key, now);
                        let avoid_idx = if avoider_is_first(&airport.aircraft[i], &airport.aircraft[j])
                        {
                            i
                        } else {
                            j
                        };
                        let avoid_id = airport.aircraft[avoid_idx].id;
                        let safe = find_safe_position(airport, avoid_id);
                        let aircraft = &mut airport.aircraft[avoid_idx];
                        aircraft.target_position = safe;
                        aircraft.state = AircraftState::Holding;
                        aircraft.holding_kind = Some(HoldingKind::Airborne);
                        info!(
                            callsign = %aircraft.callsign,
                            x = safe.x,
                            y = safe.y,
                            "smart avoidance reposition"
                        );
                    }
                    continue;
                }

                if airport.aircraft[i]
                    .is_collision_imminent(&airport.aircraft[j], COLLISION_WARNING_DISTANCE)
                {
                    let key = pair_key(id_a, id_b);
                    if self.pair_ready(key, now) {
                        self.pair_last_triggered.insert(key, now);
                        let (avoid_id, other_id) =
                            if avoider_is_first(&airport.aircraft[i], &airport.aircraft[j]) {
                                (id_a, id_b)
                            } else {
                                (id_b, id_a)
                            };
                        advisories.push(CollisionWarning {
                            aircraft_id: avoid_id,
                            other_id,
                            distance,
                        });
                    }
                }
            }
        }

        self.emergency_active
            .retain(|_, started| now - *started <= EMERGENCY_SEPARATION_COOLDOWN);
        advisories
    }

    fn pair_ready(&self, key: (AircraftId, AircraftId), now: f64) -> bool {
        match self.pair_last_triggered.get(&key) {
            Some(&last) => now - last >= AVOIDANCE_PAIR_INTERVAL,
            None => true,
        }
    }

    /// All pairs currently in actual collision.
    pub fn check_collisions(&self, airport: &Airport) -> Vec<(usize, usize)> {
        let actives = airport.active_indices();
        let mut collisions = Vec::new();
        for ii in 0..actives.len() {
            for jj in (ii + 1)..actives.len() {
                let (i, j) = (actives[ii], actives[jj]);
                if airport.aircraft[i].check_collision(&airport.aircraft[j]) {
                    collisions.push((i, j));
                }
            }
        }
        collisions
    }

    /// Both members of every collided pair crash.
    pub fn handle_collisions(&self, airport: &mut Airport, collisions: &[(usize, usize)]) {
        for &(i, j) in collisions {
            error!(
                a = %airport.aircraft[i].callsign,
                b = %airport.aircraft[j].callsign,
                "mid-air collision"
            );
            for idx in [i, j] {
                let aircraft = &mut airport.aircraft[idx];
                aircraft.state = AircraftState::Crashed;
                aircraft.crash_reason = Some("MID-AIR COLLISION".to_string());
            }
        }
    }
}

/// Who maneuvers: prefer the non-critical aircraft; if both or neither
/// are critical, the one with more fuel (it can afford the detour).
fn avoider_is_first(a: &Aircraft, b: &Aircraft) -> bool {
    match (a.is_critical_fuel(), b.is_critical_fuel()) {
        (true, false) => false,
        (false, true) => true,
        _ => a.fuel >= b.fuel,
    }
}

/// Push both aircraft 250 units directly apart along their separation
/// axis, verify clearance against everyone else, and set both holding.
fn emergency_separation(airport: &mut Airport, i: usize, j: usize) {
    let pos_a = airport.aircraft[i].position;
    let pos_b = airport.aircraft[j].position;
    let distance = pos_a.distance_to(&pos_b);
    if distance <= 0.0 {
        return;
    }
    let unit_x = (pos_a.x - pos_b.x) / distance;
    let unit_y = (pos_a.y - pos_b.y) / distance;
    let (w, h) = (airport.config.width, airport.config.height);

    let mut target_a = Position::new(
        pos_a.x + unit_x * EMERGENCY_PUSH_DISTANCE,
        pos_a.y + unit_y * EMERGENCY_PUSH_DISTANCE,
    )
    .clamped(w, h, AVOIDANCE_BOUNDS_MARGIN);
    let mut target_b = Position::new(
        pos_b.x - unit_x * EMERGENCY_PUSH_DISTANCE,
        pos_b.y - unit_y * EMERGENCY_PUSH_DISTANCE,
    )
    .clamped(w, h, AVOIDANCE_BOUNDS_MARGIN);

    let id_a = airport.aircraft[i].id;
    let id_b = airport.aircraft[j].id;
    if !is_position_safe(airport, &target_a, id_a, EMERGENCY_CLEARANCE) {
        target_a = max_separation_position(airport, id_a);
    }
    if !is_position_safe(airport, &target_b, id_b, EMERGENCY_CLEARANCE) {
        target_b = max_separation_position(airport, id_b);
    }

    for (idx, target) in [(i, target_a), (j, target_b)] {
        let aircraft = &mut airport.aircraft[idx];
        aircraft.target_position = target;
        aircraft.state = AircraftState::Holding;
        aircraft.holding_kind = Some(HoldingKind::Airborne);
    }
}

/// Position safety check against every other active aircraft's current
/// and predicted (target) position.
fn is_position_safe(
    airport: &Airport,
    position: &Position,
    exclude: AircraftId,
    min_distance: f64,
) -> bool {
    airport
        .aircraft
        .iter()
        .filter(|a| a.id != exclude && !a.state.is_terminal())
        .all(|a| {
            position.distance_to(&a.position) >= min_distance
                && position.distance_to(&a.target_position) >= min_distance
        })
}

/// Search concentric rings around the field center for a point clear of
/// everyone, falling back to the maximum-separation grid search.
fn find_safe_position(airport: &Airport, exclude: AircraftId) -> Position {
    let center = airport.config.center();
    let (w, h) = (airport.config.width, airport.config.height);

    for radius in AVOIDANCE_RING_RADII {
        for sample in 0..AVOIDANCE_RING_SAMPLES {
            let angle = sample as f64 / AVOIDANCE_RING_SAMPLES as f64 * std::f64::consts::TAU;
            let candidate = Position::new(
                center.x + angle.cos() * radius,
                center.y + angle.sin() * radius,
            )
            .clamped(w, h, 80.0);
            if is_position_safe(airport, &candidate, exclude, SMART_CLEARANCE) {
                return candidate;
            }
        }
    }
    max_separation_position(airport, exclude)
}

/// Grid-search the field for the point farthest from the nearest other
/// active aircraft.
fn max_separation_position(airport: &Airport, exclude: AircraftId) -> Position {
    let (w, h) = (airport.config.width, airport.config.height);
    let mut best = airport.config.center();
    let mut best_clearance = 0.0;

    let mut x = SEPARATION_GRID_MARGIN;
    while x < w - SEPARATION_GRID_MARGIN {
        let mut y = SEPARATION_GRID_MARGIN;
        while y < h - SEPARATION_GRID_MARGIN {
            let candidate = Position::new(x, y);
            let clearance = airport
                .aircraft
                .iter()
                .filter(|a| a.id != exclude && !a.state.is_terminal())
                .map(|a| candidate.distance_to(&a.position))
                .fold(f64::INFINITY, f64::min);
            if clearance > best_clearance && clearance.is_finite() {
                best_clearance = clearance;
                best = candidate;
            }
            y += SEPARATION_GRID_STEP;
        }
        x += SEPARATION_GRID_STEP;
    }
    best
}

/// Move an aircraft to one of eight fixed ring slots around the center.
/// The slot point is used when clear; otherwise the searched safe
/// position takes over.
pub fn execute_slot_avoidance(airport: &mut Airport, idx: usize, slot: u8) {
    let slot = slot.min(AVOIDANCE_SLOT_COUNT - 1);
    let center = airport.config.center();
    let (w, h) = (airport.config.width, airport.config.height);
    let angle = slot as f64 / AVOIDANCE_SLOT_COUNT as f64 * std::f64::consts::TAU;
    let candidate = Position::new(
        center.x + angle.cos() * AVOIDANCE_SLOT_RADIUS,
        center.y + angle.sin() * AVOIDANCE_SLOT_RADIUS,
    )
    .clamped(w, h, AVOIDANCE_BOUNDS_MARGIN);

    let id = airport.aircraft[idx].id;
    let target = if is_position_safe(airport, &candidate, id, EMERGENCY_CLEARANCE) {
        candidate
    } else {
        find_safe_position(airport, id)
    };

    let aircraft = &mut airport.aircraft[idx];
    aircraft.target_position = target;
    aircraft.state = AircraftState::Holding;
    aircraft.holding_kind = Some(HoldingKind::Airborne);
    info!(
        callsign = %aircraft.callsign,
        slot,
        x = target.x,
        y = target.y,
        "collision avoidance maneuver"
    );
}
