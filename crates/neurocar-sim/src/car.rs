use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{Vec2, World, wrap_angle};

/// Physical description of a car and its sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarDef {
    pub position: Vec2,
    /// Initial heading in radians, counter-clockwise from the x axis
    pub angle: f64,
    pub width: f64,
    pub length: f64,
    /// Speed gained (or lost when braking) per second
    pub acceleration: f64,
    pub max_speed: f64,
    /// Fraction of the speed lost per second when coasting
    pub drag: f64,
    /// Heading change per second while steering, in radians
    pub turn_rate: f64,
    pub raycast_distance: f64,
    /// Raycast directions relative to the heading, in radians
    pub raycast_angles: Vec<f64>,
}

impl Default for CarDef {
    fn default() -> Self {
        Self {
            position: Vec2::new(25.0, 250.0),
            angle: 0.0,
            width: 2.0,
            length: 3.0,
            acceleration: 18.0,
            max_speed: 30.0,
            drag: 0.5,
            turn_rate: PI,
            raycast_distance: 25.0,
            raycast_angles: vec![
                0.0,
                PI,
                PI / 2.0,
                -PI / 2.0,
                PI / 4.0,
                -PI / 4.0,
                PI / 8.0,
                -PI / 8.0,
                3.0 * PI / 8.0,
                -3.0 * PI / 8.0,
            ],
        }
    }
}

impl CarDef {
    /// Radius of the circle used for collision checks.
    #[must_use]
    pub fn collision_radius(&self) -> f64 {
        0.5 * self.width.max(self.length)
    }
}

/// Driver inputs for one simulation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// A car moving through a [`World`].
#[derive(Debug, Clone, PartialEq)]
pub struct Car {
    def: CarDef,
    position: Vec2,
    angle: f64,
    speed: f64,
    crashed: bool,
}

impl Car {
    #[must_use]
    pub fn new(def: CarDef) -> Self {
        Self {
            position: def.position,
            angle: def.angle,
            speed: 0.0,
            crashed: false,
            def,
        }
    }

    /// Puts the car back at its initial position, stopped and undamaged.
    pub fn reset(&mut self) {
        self.position = self.def.position;
        self.angle = self.def.angle;
        self.speed = 0.0;
        self.crashed = false;
    }

    #[must_use]
    pub fn def(&self) -> &CarDef {
        &self.def
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn angle(&self) -> f64 {
        self.angle
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    /// Raycast readings normalized to `[0, 1]`, one per sensor angle.
    ///
    /// `1.0` means nothing was hit within the sensor range.
    #[must_use]
    pub fn sense(&self, world: &World) -> Vec<f64> {
        let range = self.def.raycast_distance;
        self.def
            .raycast_angles
            .iter()
            .map(|a| world.raycast(self.position, self.angle + a, range) / range)
            .collect()
    }

    /// Advances the car by `dt` seconds.
    ///
    /// A crashed car does not move anymore.
    pub fn step(&mut self, controls: Controls, dt: f64, world: &World) {
        if self.crashed {
            return;
        }

        let mut acceleration = 0.0;
        if controls.accelerate {
            acceleration += self.def.acceleration;
        }
        if controls.brake {
            acceleration -= self.def.acceleration;
        }
        if acceleration == 0.0 {
            self.speed -= self.speed * (self.def.drag * dt).min(1.0);
        } else {
            self.speed = (self.speed + acceleration * dt).clamp(0.0, self.def.max_speed);
        }

        let steering = f64::from(i8::from(controls.turn_left) - i8::from(controls.turn_right));
        self.angle = wrap_angle(self.angle + steering * self.def.turn_rate * dt);
        self.position += Vec2::from_angle(self.angle) * (self.speed * dt);

        if world.collides(self.position, self.def.collision_radius()) {
            self.crashed = true;
        }
    }
}
