//! Fundamental geometric and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D position in simulation space (abstract units).
/// x grows to the right, y grows downward, (0, 0) is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each engine update).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        DVec2::new(self.x, self.y).distance(DVec2::new(other.x, other.y))
    }

    /// Bearing to another position in radians (0 = +x axis, atan2 convention).
    pub fn bearing_to(&self, other: &Position) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Move toward a target at the given speed, capped so the step never
    /// overshoots. Snaps onto the target once within 0.1 units.
    pub fn move_towards(&self, target: &Position, speed: f64, dt: f64) -> Position {
        let here = DVec2::new(self.x, self.y);
        let there = DVec2::new(target.x, target.y);
        let offset = there - here;
        let distance = offset.length();

        if distance <= 0.1 {
            return *target;
        }

        let max_step = speed * dt;
        if max_step >= distance {
            return *target;
        }

        let next = here + offset / distance * max_step;
        Position::new(next.x, next.y)
    }

    /// Clamp the position into a rectangle inset by `margin`.
    pub fn clamped(&self, width: f64, height: f64, margin: f64) -> Position {
        Position::new(
            self.x.clamp(margin, width - margin),
            self.y.clamp(margin, height - margin),
        )
    }
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}
