use crate::math::{heading_vector, polygons_collide, rotate, Point2d, Rect};
use crate::vehicle::Pose;

/// The length of the heading indicator's sides.
const INDICATOR_SIZE: f64 = 8.0;

/// The rectangular outline of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Footprint {
    half_len: f64,
    half_wid: f64,
}

impl Footprint {
    pub fn new(length: f64, width: f64) -> Self {
        Self {
            half_len: 0.5 * length,
            half_wid: 0.5 * width,
        }
    }

    pub fn length(&self) -> f64 {
        2.0 * self.half_len
    }

    pub fn width(&self) -> f64 {
        2.0 * self.half_wid
    }

    /// The four world space corners at the given pose: rear-left, front-left,
    /// front-right, rear-right (left being -y in the vehicle frame).
    pub fn corners(&self, pose: &Pose) -> [Point2d; 4] {
        let (l, w) = (self.half_len, self.half_wid);
        let origin = Point2d::new(0.0, 0.0);
        [(-l, -w), (l, -w), (l, w), (-l, w)].map(|(x, y)| {
            let offset = rotate(Point2d::new(x, y), origin, pose.heading) - origin;
            pose.position + offset
        })
    }

    /// A small triangle marking the front of the vehicle, tip first.
    pub fn heading_indicator(&self, pose: &Pose) -> [Point2d; 3] {
        let front = pose.position + self.half_len * heading_vector(pose.heading);
        [
            front,
            front - INDICATOR_SIZE * heading_vector(pose.heading - 30.0),
            front - INDICATOR_SIZE * heading_vector(pose.heading + 30.0),
        ]
    }

    /// Whether the vehicle at the given pose overlaps any of the obstacles.
    pub fn collides(&self, pose: &Pose, obstacles: &[Rect]) -> bool {
        let corners = self.corners(pose);
        obstacles
            .iter()
            .any(|obstacle| polygons_collide(&corners, &obstacle.corners()))
    }
}
