use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::Vec2;

/// A world definition that cannot produce a world.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum WorldError {
    #[display("world size must be positive, got {width}x{height}")]
    InvalidSize { width: f64, height: f64 },
    #[display("invalid obstacle radius range {min}..={max}")]
    InvalidObstacleRadius { min: f64, max: f64 },
}

/// Parameters of a randomly generated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldDef {
    pub width: f64,
    pub height: f64,
    pub obstacle_count: usize,
    pub min_obstacle_radius: f64,
    pub max_obstacle_radius: f64,
    /// Obstacle-free distance kept around the start and the destination
    pub clearance: f64,
}

impl Default for WorldDef {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            obstacle_count: 200,
            min_obstacle_radius: 2.0,
            max_obstacle_radius: 8.0,
            clearance: 15.0,
        }
    }
}

impl WorldDef {
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(WorldError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.min_obstacle_radius > 0.0 && self.min_obstacle_radius <= self.max_obstacle_radius)
        {
            return Err(WorldError::InvalidObstacleRadius {
                min: self.min_obstacle_radius,
                max: self.max_obstacle_radius,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f64,
}

impl Obstacle {
    /// Distance along a ray to the first intersection with this obstacle.
    ///
    /// `direction` must be a unit vector. Returns `Some(0.0)` when `origin` is inside.
    fn ray_distance(&self, origin: Vec2, direction: Vec2) -> Option<f64> {
        let offset = origin - self.center;
        let b = offset.dot(direction);
        let c = offset.dot(offset) - self.radius * self.radius;
        if c <= 0.0 {
            return Some(0.0);
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let t = -b - discriminant.sqrt();
        (t >= 0.0).then_some(t)
    }
}

/// A rectangular area `[0, width] x [0, height]` with circular obstacles.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    width: f64,
    height: f64,
    obstacles: Vec<Obstacle>,
}

impl World {
    pub fn new(width: f64, height: f64, obstacles: Vec<Obstacle>) -> Result<Self, WorldError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(WorldError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            obstacles,
        })
    }

    /// Generates a world from `def`.
    ///
    /// The same definition and seed always produce the same obstacles. Obstacles
    /// overlapping the clearance area around `start` or `destination` are skipped, so
    /// the world may hold fewer than `def.obstacle_count` obstacles.
    pub fn generate(
        def: &WorldDef,
        seed: u64,
        start: Vec2,
        destination: Vec2,
    ) -> Result<Self, WorldError> {
        def.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut obstacles = Vec::with_capacity(def.obstacle_count);
        for _ in 0..def.obstacle_count {
            let obstacle = Obstacle {
                center: Vec2::new(
                    rng.random_range(0.0..=def.width),
                    rng.random_range(0.0..=def.height),
                ),
                radius: rng.random_range(def.min_obstacle_radius..=def.max_obstacle_radius),
            };
            let keep_out = obstacle.radius + def.clearance;
            if obstacle.center.distance(start) > keep_out
                && obstacle.center.distance(destination) > keep_out
            {
                obstacles.push(obstacle);
            }
        }
        Self::new(def.width, def.height, obstacles)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Length of the diagonal, the longest straight distance inside the world.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.height)
    }

    /// Returns `true` if a circle leaves the world or touches an obstacle.
    #[must_use]
    pub fn collides(&self, center: Vec2, radius: f64) -> bool {
        let outside = center.x - radius < 0.0
            || center.y - radius < 0.0
            || center.x + radius > self.width
            || center.y + radius > self.height;
        outside
            || self
                .obstacles
                .iter()
                .any(|o| center.distance(o.center) < o.radius + radius)
    }

    /// Distance from `origin` to the nearest obstacle or boundary along `angle`,
    /// capped at `max_distance`.
    #[must_use]
    pub fn raycast(&self, origin: Vec2, angle: f64, max_distance: f64) -> f64 {
        let direction = Vec2::from_angle(angle);
        let wall = self.boundary_distance(origin, direction);
        self.obstacles
            .iter()
            .filter_map(|o| o.ray_distance(origin, direction))
            .fold(wall.min(max_distance), f64::min)
            .max(0.0)
    }

    fn boundary_distance(&self, origin: Vec2, direction: Vec2) -> f64 {
        let axis = |position: f64, direction: f64, size: f64| {
            if direction > 0.0 {
                (size - position) / direction
            } else if direction < 0.0 {
                -position / direction
            } else {
                f64::INFINITY
            }
        };
        f64::min(
            axis(origin.x, direction.x, self.width),
            axis(origin.y, direction.y, self.height),
        )
    }
}
