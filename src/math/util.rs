use super::{Point2d, Vector2d};
use cgmath::prelude::*;
use cgmath::{Basis2, Deg};

/// Rotates a point about a centre by an angle in degrees.
///
/// With the y-axis pointing down (screen coordinates), a positive angle
/// rotates clockwise on screen.
pub fn rotate(point: Point2d, centre: Point2d, angle_deg: f64) -> Point2d {
    let rot: Basis2<f64> = Rotation2::from_angle(Deg(angle_deg));
    centre + rot.rotate_vector(point - centre)
}

/// The Euclidean distance between two points.
pub fn distance(p: Point2d, q: Point2d) -> f64 {
    p.distance(q)
}

/// The angle in degrees of the vector from `p` to `q`, in `(-180, 180]`.
pub fn angle_between(p: Point2d, q: Point2d) -> f64 {
    let v = q - p;
    v.y.atan2(v.x).to_degrees()
}

/// A unit vector pointing along the given heading in degrees.
pub fn heading_vector(heading_deg: f64) -> Vector2d {
    let rad = heading_deg.to_radians();
    Vector2d::new(rad.cos(), rad.sin())
}

/// Normalises an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let angle = angle.rem_euclid(360.0);
    // `rem_euclid` can round up to exactly 360 for tiny negative inputs
    if angle >= 360.0 {
        0.0
    } else {
        angle
    }
}

/// Wraps an angular difference in degrees into `(-180, 180]`.
pub fn wrap_degrees(angle: f64) -> f64 {
    let angle = normalize_degrees(angle);
    if angle > 180.0 {
        angle - 360.0
    } else {
        angle
    }
}
