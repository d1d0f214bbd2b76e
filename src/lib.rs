pub use cgmath;
pub use config::{SimulationConfig, WorldConfig};
pub use error::ConfigError;
pub use parking::{ParkingPlan, ParkingSpot, SpotId, SpotKind, SpotOrientation};
pub use planner::{GridPlanner, Route};
pub use render::{Canvas, Colour, Frame, SpotView};
pub use simulation::{Command, Outcome, Simulation};
pub use util::Interval;
pub use vehicle::{MotionState, ParkingPhase, Pose, Vehicle, VehicleAttributes};
pub use world::World;

mod config;
mod debug;
mod error;
pub mod math;
pub mod parking;
pub mod planner;
mod render;
mod simulation;
mod util;
mod vehicle;
mod world;
