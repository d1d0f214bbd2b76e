//! Simulation and world configuration.

use crate::error::ConfigError;
use crate::math::{Point2d, Rect};
use crate::vehicle::{Pose, VehicleAttributes};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The size and make-up of a generated parking lot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WorldConfig {
    /// The world width in world units.
    pub width: f64,
    /// The world height in world units.
    pub height: f64,
    /// The probability that any given slot is taken by a parked car.
    pub occupancy: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            occupancy: 0.7,
        }
    }
}

impl WorldConfig {
    /// The rectangle covering the whole world.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// The parameters of a [crate::Simulation].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulationConfig {
    pub world: WorldConfig,
    pub vehicle: VehicleAttributes,
    /// Where the vehicle starts, and returns to after a failed attempt.
    pub start: Pose,
    /// The side length of a planner grid cell in world units.
    pub cell_size: f64,
    /// The number of spots to try before giving up.
    pub max_attempts: usize,
    /// Seeds the random number generator used to lay out the world.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            vehicle: VehicleAttributes::default(),
            start: Pose::new(Point2d::new(100.0, 400.0), 0.0),
            cell_size: 20.0,
            max_attempts: 3,
            seed: 0,
        }
    }
}

impl SimulationConfig {
    pub fn with_world(mut self, world: WorldConfig) -> Self {
        self.world = world;
        self
    }

    pub fn with_vehicle(mut self, vehicle: VehicleAttributes) -> Self {
        self.vehicle = vehicle;
        self
    }

    pub fn with_start(mut self, start: Pose) -> Self {
        self.start = start;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks that the configuration describes a runnable simulation of a
    /// generated world.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_within(&self.world.bounds())
    }

    /// Checks that the configuration describes a runnable simulation of a
    /// world with the given bounds.
    pub fn validate_within(&self, bounds: &Rect) -> Result<(), ConfigError> {
        if !(self.cell_size > 0.0) {
            return Err(ConfigError::CellSize(self.cell_size));
        }
        if !(bounds.width() >= self.cell_size && bounds.height() >= self.cell_size) {
            return Err(ConfigError::WorldTooSmall {
                width: bounds.width(),
                height: bounds.height(),
                cell_size: self.cell_size,
            });
        }
        let world = &self.world;
        if self.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if !(0.0..=1.0).contains(&world.occupancy) {
            return Err(ConfigError::Occupancy(world.occupancy));
        }

        let vehicle = &self.vehicle;
        let positive = [
            ("length", vehicle.length),
            ("width", vehicle.width),
            ("max velocity", vehicle.max_velocity),
            ("acceleration", vehicle.acceleration),
            ("deceleration", vehicle.deceleration),
            ("turning rate", vehicle.turning_rate),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Vehicle { name, value });
            }
        }

        let position = self.start.position;
        if !bounds.contains(position) {
            return Err(ConfigError::StartOutsideWorld {
                x: position.x,
                y: position.y,
            });
        }
        Ok(())
    }
}
