use crate::math::{angle_between, heading_vector, normalize_degrees, wrap_degrees, Point2d};
use crate::vehicle::Pose;

/// Heading errors within this band, in degrees, do not trigger a turn
/// while translating.
const TRANSLATION_DEADBAND: f64 = 2.0;

/// The steering model of a vehicle: a proportional heading controller
/// with a capped turning rate and a simple speed policy.
#[derive(Clone, Debug)]
pub struct SteeringModel {
    max_vel: f64,
    acc: f64,
    dec: f64,
    turn_rate: f64,
}

/// The parameters of the steering model.
pub struct ModelParams {
    /// The top speed in world units per tick.
    pub max_velocity: f64,
    /// The speed gained per tick when lined up with the target.
    pub acceleration: f64,
    /// The speed shed per tick while turning.
    pub deceleration: f64,
    /// The maximum change in heading per tick, in degrees.
    pub turning_rate: f64,
}

/// How eagerly the vehicle drives towards its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pace {
    /// Full speed and acceleration.
    Cruise,
    /// Half speed and half acceleration, used while parking.
    Creep,
}

impl SteeringModel {
    /// Creates a new steering model.
    pub fn new(params: &ModelParams) -> Self {
        Self {
            max_vel: params.max_velocity,
            acc: params.acceleration,
            dec: params.deceleration,
            turn_rate: params.turning_rate,
        }
    }

    /// Turns from `heading` towards `desired` by at most the turning rate,
    /// taking the shorter way round.
    pub fn turn_towards(&self, heading: f64, desired: f64) -> f64 {
        let error = wrap_degrees(desired - heading);
        normalize_degrees(heading + error.clamp(-self.turn_rate, self.turn_rate))
    }

    /// Advances the vehicle one tick towards `target`.
    ///
    /// If the target is off to one side, the vehicle turns towards it and
    /// sheds speed so it does not cut the corner. Otherwise it speeds up
    /// towards the limit for the given pace. Either way the position is then
    /// integrated along the (new) heading.
    ///
    /// # Returns
    /// The new pose and velocity.
    pub fn pursue(&self, pose: Pose, vel: f64, target: Point2d, pace: Pace) -> (Pose, f64) {
        let (cap, acc) = match pace {
            Pace::Cruise => (self.max_vel, self.acc),
            Pace::Creep => (0.5 * self.max_vel, 0.5 * self.acc),
        };

        let desired = angle_between(pose.position, target);
        let error = wrap_degrees(desired - pose.heading);

        let (heading, vel) = if error.abs() > TRANSLATION_DEADBAND {
            (
                self.turn_towards(pose.heading, desired),
                f64::max(vel - self.dec, 0.0),
            )
        } else {
            (pose.heading, f64::min(vel + acc, cap))
        };

        let position = pose.position + vel * heading_vector(heading);
        (Pose { position, heading }, vel)
    }
}
