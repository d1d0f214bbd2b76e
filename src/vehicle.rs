use self::footprint::Footprint;
use self::steering::{ModelParams, Pace, SteeringModel};
use crate::math::{distance, normalize_degrees, wrap_degrees, Point2d, Rect};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod footprint;
mod steering;

/// A waypoint counts as reached within this distance.
const WAYPOINT_RADIUS: f64 = 5.0;

/// A returning vehicle snaps to its start position within this distance.
const HOME_RADIUS: f64 = 10.0;

/// A returning vehicle is done once its heading is within this many degrees of the start heading.
const HOME_HEADING_TOLERANCE: f64 = 2.0;

/// A rotation is done once the heading is within this many degrees of the target.
const ROTATION_TOLERANCE: f64 = 1.0;

/// Path colours for the first, second and later attempts.
const PATH_COLOURS: [[u8; 3]; 3] = [[0, 255, 0], [255, 165, 0], [128, 0, 128]];

/// A position and heading in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose {
    /// The centre of the vehicle.
    pub position: Point2d,
    /// The heading in degrees, in `[0, 360)`. 0 faces +x, 90 faces +y.
    pub heading: f64,
}

impl Pose {
    /// Creates a pose, normalising the heading.
    pub fn new(position: Point2d, heading: f64) -> Self {
        Self {
            position,
            heading: normalize_degrees(heading),
        }
    }
}

/// The externally visible state of the vehicle's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionState {
    Idle,
    Moving,
    Rotating,
    Parking,
    Returning,
}

/// Which part of a parking path the vehicle is following.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParkingPhase {
    /// Driving the planned route to the spot's entry point.
    Approach,
    /// Driving the short maneuver from the entry point into the spot.
    Maneuver,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleAttributes {
    /// The vehicle length in world units.
    pub length: f64,
    /// The vehicle width in world units.
    pub width: f64,
    /// The top speed in world units per tick.
    pub max_velocity: f64,
    /// The speed gained per tick when lined up with the target.
    pub acceleration: f64,
    /// The speed shed per tick while turning.
    pub deceleration: f64,
    /// The maximum change in heading per tick, in degrees.
    pub turning_rate: f64,
    /// The number of ticks the vehicle may spend chasing one waypoint while
    /// parking before it gives up on the attempt.
    pub stall_limit: usize,
}

impl Default for VehicleAttributes {
    fn default() -> Self {
        Self {
            length: 80.0,
            width: 40.0,
            max_velocity: 4.0,
            acceleration: 0.1,
            deceleration: 0.05,
            turning_rate: 2.0,
            stall_limit: 600,
        }
    }
}

/// What the vehicle is currently doing, along with the data that activity needs.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Activity {
    Idle,
    Moving { target: Point2d, heading: Option<f64> },
    Rotating { heading: f64 },
    Parking,
    Returning,
}

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The vehicle's outline.
    footprint: Footprint,
    /// The steering model.
    steering: SteeringModel,
    /// See [VehicleAttributes::stall_limit].
    stall_limit: usize,
    /// The current pose.
    pose: Pose,
    /// The pose the vehicle returns to after a failed attempt.
    start: Pose,
    /// The velocity in world units per tick.
    vel: f64,
    /// The current activity.
    activity: Activity,
    /// The path being followed.
    path: Vec<Point2d>,
    /// The index of the next unreached waypoint in `path`.
    cursor: usize,
    /// The index in `path` at which the in-spot maneuver begins.
    maneuver_start: usize,
    /// The part of the path currently being followed.
    phase: ParkingPhase,
    /// The number of ticks since the cursor last advanced.
    stall: usize,
    /// The attempt number the current path belongs to.
    attempt: usize,
    /// Leaving this area while parking counts as a collision.
    bounds: Option<Rect>,
}

impl Vehicle {
    /// Creates a new, idle vehicle at the given start pose.
    pub fn new(attributes: &VehicleAttributes, start: Pose) -> Self {
        Self {
            footprint: Footprint::new(attributes.length, attributes.width),
            steering: SteeringModel::new(&ModelParams {
                max_velocity: attributes.max_velocity,
                acceleration: attributes.acceleration,
                deceleration: attributes.deceleration,
                turning_rate: attributes.turning_rate,
            }),
            stall_limit: attributes.stall_limit,
            pose: start,
            start,
            vel: 0.0,
            activity: Activity::Idle,
            path: vec![],
            cursor: 0,
            maneuver_start: 0,
            phase: ParkingPhase::Approach,
            stall: 0,
            attempt: 0,
            bounds: None,
        }
    }

    /// The vehicle's length.
    pub fn length(&self) -> f64 {
        self.footprint.length()
    }

    /// The vehicle's width.
    pub fn width(&self) -> f64 {
        self.footprint.width()
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The pose the vehicle started from, and returns to after a failure.
    pub fn start_pose(&self) -> Pose {
        self.start
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.pose.position
    }

    /// The heading in degrees.
    pub fn heading(&self) -> f64 {
        self.pose.heading
    }

    /// The vehicle's velocity in world units per tick.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    /// The current state of the motion state machine.
    pub fn state(&self) -> MotionState {
        match self.activity {
            Activity::Idle => MotionState::Idle,
            Activity::Moving { .. } => MotionState::Moving,
            Activity::Rotating { .. } => MotionState::Rotating,
            Activity::Parking => MotionState::Parking,
            Activity::Returning => MotionState::Returning,
        }
    }

    /// The path assigned by the last call to [Self::set_path].
    pub fn path(&self) -> &[Point2d] {
        &self.path
    }

    /// The index of the next unreached waypoint.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The waypoint the vehicle is heading for, if it has one.
    pub fn current_waypoint(&self) -> Option<Point2d> {
        self.path.get(self.cursor).copied()
    }

    pub fn parking_phase(&self) -> ParkingPhase {
        self.phase
    }

    /// The attempt number the current path was assigned for.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// The display colour of the current path, as RGB.
    pub fn path_colour(&self) -> [u8; 3] {
        let idx = usize::min(self.attempt.saturating_sub(1), PATH_COLOURS.len() - 1);
        PATH_COLOURS[idx]
    }

    /// The four corners of the vehicle in world space.
    pub fn corners(&self) -> [Point2d; 4] {
        self.footprint.corners(&self.pose)
    }

    /// A small triangle at the front of the vehicle, tip first.
    pub fn heading_indicator(&self) -> [Point2d; 3] {
        self.footprint.heading_indicator(&self.pose)
    }

    /// Sets the area the vehicle must stay inside while parking.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }

    /// Whether the vehicle overlaps any of the obstacles.
    pub fn is_colliding(&self, obstacles: &[Rect]) -> bool {
        self.footprint.collides(&self.pose, obstacles)
    }

    /// Drives to a point, optionally turning to a heading on arrival.
    pub fn move_to(&mut self, target: Point2d, heading: Option<f64>) {
        self.activity = Activity::Moving {
            target,
            heading: heading.map(normalize_degrees),
        };
    }

    /// Assigns a new path. The vehicle does not start following it until
    /// [Self::start_parking] is called.
    ///
    /// # Parameters
    /// * `path` - The waypoints to follow
    /// * `maneuver_start` - The index at which the in-spot maneuver begins
    /// * `attempt` - The attempt number, which determines the path colour
    pub fn set_path(&mut self, path: Vec<Point2d>, maneuver_start: usize, attempt: usize) {
        self.path = path;
        self.cursor = 0;
        self.maneuver_start = maneuver_start;
        self.phase = if maneuver_start == 0 {
            ParkingPhase::Maneuver
        } else {
            ParkingPhase::Approach
        };
        self.stall = 0;
        self.attempt = attempt;
    }

    /// Starts following the assigned path.
    pub fn start_parking(&mut self) {
        self.stall = 0;
        self.activity = Activity::Parking;
    }

    /// Puts the vehicle back at its start pose, stopped and without a path.
    pub fn reset(&mut self) {
        self.pose = self.start;
        self.vel = 0.0;
        self.activity = Activity::Idle;
        self.path.clear();
        self.cursor = 0;
        self.maneuver_start = 0;
        self.phase = ParkingPhase::Approach;
        self.stall = 0;
        self.attempt = 0;
    }

    /// Advances the vehicle by one tick.
    ///
    /// # Parameters
    /// * `obstacles` - The obstacles to check for collisions while parking
    pub fn update(&mut self, obstacles: &[Rect]) {
        let before = self.state();
        match self.activity {
            Activity::Idle => {}
            Activity::Moving { target, heading } => self.update_moving(target, heading),
            Activity::Rotating { heading } => self.update_rotating(heading),
            Activity::Parking => self.update_parking(obstacles),
            Activity::Returning => self.update_returning(),
        }
        let after = self.state();
        if before != after {
            log::debug!("vehicle {:?} -> {:?} at {:?}", before, after, self.pose);
        }
    }

    fn update_moving(&mut self, target: Point2d, heading: Option<f64>) {
        let dist = distance(self.pose.position, target);
        self.drive_towards(target, Pace::Cruise);

        if dist < WAYPOINT_RADIUS {
            self.vel = 0.0;
            self.activity = match heading {
                Some(heading) => Activity::Rotating { heading },
                None => Activity::Idle,
            };
        }
    }

    fn update_rotating(&mut self, heading: f64) {
        let error = wrap_degrees(heading - self.pose.heading);
        if error.abs() > ROTATION_TOLERANCE {
            self.pose.heading = self.steering.turn_towards(self.pose.heading, heading);
        } else {
            self.pose.heading = heading;
            self.activity = Activity::Idle;
        }
    }

    fn update_parking(&mut self, obstacles: &[Rect]) {
        if self.is_colliding(obstacles) {
            log::warn!("collision while parking at {:?}", self.pose);
            self.activity = Activity::Returning;
            return;
        }
        if self.is_out_of_bounds() {
            log::warn!("left the world while parking at {:?}", self.pose);
            self.activity = Activity::Returning;
            return;
        }

        let target = match self.current_waypoint() {
            Some(target) => target,
            None => {
                self.finish_parking();
                return;
            }
        };

        let dist = distance(self.pose.position, target);
        self.drive_towards(target, Pace::Creep);

        if dist < WAYPOINT_RADIUS {
            self.advance_cursor();
            if self.cursor >= self.path.len() {
                self.finish_parking();
            }
        } else {
            self.stall += 1;
            if self.stall > self.stall_limit {
                log::warn!(
                    "gave up on waypoint {} of {} after {} ticks",
                    self.cursor,
                    self.path.len(),
                    self.stall_limit
                );
                self.activity = Activity::Returning;
            }
        }
    }

    fn update_returning(&mut self) {
        let home = self.start;
        if distance(self.pose.position, home.position) < HOME_RADIUS {
            // Arrived, now straighten up
            self.pose.position = home.position;
            let error = wrap_degrees(home.heading - self.pose.heading);
            if error.abs() < HOME_HEADING_TOLERANCE {
                self.pose.heading = home.heading;
                self.vel = 0.0;
                self.activity = Activity::Idle;
            } else {
                self.pose.heading = self.steering.turn_towards(self.pose.heading, home.heading);
            }
        } else {
            self.drive_towards(home.position, Pace::Cruise);
        }
    }

    fn drive_towards(&mut self, target: Point2d, pace: Pace) {
        let (pose, vel) = self.steering.pursue(self.pose, self.vel, target, pace);
        self.pose = pose;
        self.vel = vel;
    }

    fn advance_cursor(&mut self) {
        self.cursor += 1;
        self.stall = 0;
        if self.cursor >= self.maneuver_start {
            self.phase = ParkingPhase::Maneuver;
        }
    }

    fn finish_parking(&mut self) {
        self.vel = 0.0;
        self.activity = Activity::Idle;
    }

    fn is_out_of_bounds(&self) -> bool {
        self.bounds
            .map_or(false, |bounds| !bounds.contains(self.pose.position))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn vehicle_at(x: f64, y: f64) -> Vehicle {
        Vehicle::new(
            &VehicleAttributes::default(),
            Pose::new(Point2d::new(x, y), 0.0),
        )
    }

    /// Runs the vehicle until it is idle, returning the states it passed through.
    fn run_to_idle(vehicle: &mut Vehicle, obstacles: &[Rect], max_ticks: usize) -> Vec<MotionState> {
        let mut states = vec![vehicle.state()];
        for _ in 0..max_ticks {
            vehicle.update(obstacles);
            if *states.last().unwrap() != vehicle.state() {
                states.push(vehicle.state());
            }
            if vehicle.state() == MotionState::Idle {
                return states;
            }
        }
        panic!("vehicle did not settle: {:?}", states);
    }

    #[test]
    fn move_without_heading() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        vehicle.move_to(Point2d::new(300.0, 300.0), None);
        assert_eq!(vehicle.state(), MotionState::Moving);

        let states = run_to_idle(&mut vehicle, &[], 2000);
        assert_eq!(states, [MotionState::Moving, MotionState::Idle]);
        assert!(distance(vehicle.position(), Point2d::new(300.0, 300.0)) < 2.0 * WAYPOINT_RADIUS);
        assert_eq!(vehicle.vel(), 0.0);
    }

    #[test]
    fn move_then_rotate() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        vehicle.move_to(Point2d::new(300.0, 400.0), Some(-90.0));

        let states = run_to_idle(&mut vehicle, &[], 2000);
        assert_eq!(
            states,
            [MotionState::Moving, MotionState::Rotating, MotionState::Idle]
        );
        assert_eq!(vehicle.heading(), 270.0);
    }

    #[test]
    fn parks_along_path() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        let path = vec![
            Point2d::new(110.0, 410.0),
            Point2d::new(200.0, 410.0),
            Point2d::new(260.0, 470.0),
            Point2d::new(300.0, 470.0),
        ];
        vehicle.set_path(path, 2, 1);
        assert_eq!(vehicle.state(), MotionState::Idle);
        assert_eq!(vehicle.parking_phase(), ParkingPhase::Approach);
        vehicle.start_parking();

        let states = run_to_idle(&mut vehicle, &[], 5000);
        assert_eq!(states, [MotionState::Parking, MotionState::Idle]);
        assert_eq!(vehicle.cursor(), 4);
        assert_eq!(vehicle.parking_phase(), ParkingPhase::Maneuver);
        assert!(distance(vehicle.position(), Point2d::new(300.0, 470.0)) < 2.0 * WAYPOINT_RADIUS);
        assert_eq!(vehicle.path_colour(), [0, 255, 0]);
    }

    #[test]
    fn collision_sends_vehicle_home() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        let obstacles = [Rect::new(250.0, 380.0, 20.0, 40.0)];
        vehicle.set_path(vec![Point2d::new(400.0, 400.0)], 1, 2);
        vehicle.start_parking();

        let states = run_to_idle(&mut vehicle, &obstacles, 5000);
        assert_eq!(
            states,
            [MotionState::Parking, MotionState::Returning, MotionState::Idle]
        );
        assert_eq!(vehicle.pose(), vehicle.start_pose());
        assert_eq!(vehicle.path_colour(), [255, 165, 0]);
    }

    #[test]
    fn leaving_bounds_counts_as_collision() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        vehicle.set_bounds(Some(Rect::new(0.0, 0.0, 200.0, 800.0)));
        vehicle.set_path(vec![Point2d::new(400.0, 400.0)], 1, 1);
        vehicle.start_parking();

        let states = run_to_idle(&mut vehicle, &[], 5000);
        assert_eq!(
            states,
            [MotionState::Parking, MotionState::Returning, MotionState::Idle]
        );
    }

    #[test]
    fn empty_path_finishes_immediately() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        vehicle.set_path(vec![], 0, 1);
        vehicle.start_parking();
        vehicle.update(&[]);
        assert_eq!(vehicle.state(), MotionState::Idle);
    }

    #[test]
    fn stalling_abandons_attempt() {
        let attributes = VehicleAttributes {
            stall_limit: 3,
            ..Default::default()
        };
        let mut vehicle = Vehicle::new(&attributes, Pose::new(Point2d::new(100.0, 400.0), 0.0));
        vehicle.set_path(vec![Point2d::new(900.0, 400.0)], 1, 1);
        vehicle.start_parking();
        for _ in 0..4 {
            vehicle.update(&[]);
        }
        assert_eq!(vehicle.state(), MotionState::Returning);
    }

    #[test]
    fn parking_always_resolves() {
        let attributes = VehicleAttributes::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mut vehicle = vehicle_at(600.0, 400.0);
            let path: Vec<_> = (0..rng.gen_range(0..6))
                .map(|_| Point2d::new(rng.gen_range(100.0..1100.0), rng.gen_range(100.0..700.0)))
                .collect();
            let obstacles = [Rect::new(
                rng.gen_range(100.0..1100.0),
                rng.gen_range(100.0..700.0),
                50.0,
                50.0,
            )];
            let budget = (path.len() + 1) * (attributes.stall_limit + 1);
            vehicle.set_path(path, 0, 1);
            vehicle.start_parking();

            let mut resolved = None;
            for _ in 0..=budget {
                vehicle.update(&obstacles);
                if vehicle.state() != MotionState::Parking {
                    resolved = Some(vehicle.state());
                    break;
                }
            }
            assert!(matches!(
                resolved,
                Some(MotionState::Idle) | Some(MotionState::Returning)
            ));
        }
    }

    #[test]
    fn reset_restores_start() {
        let mut vehicle = vehicle_at(100.0, 400.0);
        vehicle.move_to(Point2d::new(300.0, 300.0), None);
        for _ in 0..50 {
            vehicle.update(&[]);
        }
        vehicle.set_path(vec![Point2d::new(1.0, 1.0)], 0, 3);
        vehicle.reset();
        assert_eq!(vehicle.pose(), vehicle.start_pose());
        assert_eq!(vehicle.state(), MotionState::Idle);
        assert!(vehicle.path().is_empty());
        assert_eq!(vehicle.vel(), 0.0);
    }
}
