//! Motion integration: one shared velocity scrolls every family.
//!
//! Each family decomposes the shared step along its own normal and tangent.
//! Families with different orientations therefore drift at different rates,
//! which is where the moiré and rhythm between them come from.

use glam::{DVec2, dvec2};

use crate::grid::GridFamily;
use crate::log::trace;
use crate::types::UnitVec;

/// Advance every family by one `step` (velocity already scaled by dt).
///
/// `offset += normal · step` slides the lines across the field;
/// `dash_phase -= tangent · step` scrolls the dashes so they travel in the
/// same visual direction as the translation.
pub fn advance(families: &mut [GridFamily], step: DVec2) {
    for family in families {
        let along_normal = family.normal().dot(step);
        let along_tangent = family.tangent().dot(step);
        family.advance(along_normal, along_tangent);
    }
}

/// Which way a "rotate" control turns the heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// Counter-clockwise on screen (angle decreases, Y down)
    Left,
    /// Clockwise on screen
    Right,
}

/// Which way a "speed" control pushes the speed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Throttle {
    Up,
    Down,
}

/// Control rates for the heading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rates {
    /// Radians per second while a rotate control is held
    pub turn_rate: f64,
    /// Units per second squared while a speed control is held
    pub acceleration: f64,
}

impl Default for Rates {
    fn default() -> Self {
        Rates {
            turn_rate: 90f64.to_radians(),
            acceleration: 120.0,
        }
    }
}

/// Direction and speed of the shared motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Heading {
    direction: UnitVec,
    speed: f64,
}

impl Heading {
    /// Negative speeds are clamped to zero.
    pub fn new(direction: UnitVec, speed: f64) -> Self {
        Heading {
            direction,
            speed: speed.max(0.0),
        }
    }

    pub fn direction(&self) -> UnitVec {
        self.direction
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Turn by `rates.turn_rate * dt` radians.
    pub fn rotate(&mut self, turn: Turn, rates: &Rates, dt: f64) {
        let delta = rates.turn_rate * dt;
        let angle = match turn {
            Turn::Left => self.direction.angle() - delta,
            Turn::Right => self.direction.angle() + delta,
        };
        self.direction = UnitVec::from_angle(angle);
    }

    /// Change speed by `rates.acceleration * dt`, never going below zero.
    pub fn accelerate(&mut self, throttle: Throttle, rates: &Rates, dt: f64) {
        let delta = rates.acceleration * dt;
        self.speed = match throttle {
            Throttle::Up => self.speed + delta,
            Throttle::Down => self.speed - delta,
        }
        .max(0.0);
    }

    /// Displacement over `dt` seconds.
    pub fn step(&self, dt: f64) -> DVec2 {
        let step = self.direction * (self.speed * dt);
        trace!(dx = step.x, dy = step.y, speed = self.speed, "heading step");
        step
    }
}

impl Default for Heading {
    fn default() -> Self {
        // (1, 0.3) normalized; the literal is non-zero and finite
        let v = dvec2(1.0, 0.3);
        Heading {
            direction: UnitVec::normalized(v).unwrap_or(UnitVec::EAST),
            speed: 120.0,
        }
    }
}
