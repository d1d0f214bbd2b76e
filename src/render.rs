//! A read-only snapshot of the simulation for presentation layers.

use crate::math::{Point2d, Rect};
use crate::parking::ParkingSpot;
use crate::vehicle::MotionState;
use crate::Outcome;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB colour.
pub type Colour = [u8; 3];

const SPOT_COLOUR: Colour = [0, 200, 0];
const ACTIVE_SPOT_COLOUR: Colour = [0, 255, 0];
const OBSTACLE_COLOUR: Colour = [200, 0, 0];
const VEHICLE_COLOUR: Colour = [0, 0, 255];
const INDICATOR_COLOUR: Colour = [255, 255, 0];
const WAYPOINT_COLOUR: Colour = [255, 0, 0];
const TEXT_COLOUR: Colour = [0, 0, 0];

/// A drawing surface owned by the presentation layer.
pub trait Canvas {
    /// Outlines a rectangle with a line of the given width.
    fn stroke_rect(&mut self, rect: &Rect, colour: Colour, width: f64);
    fn fill_rect(&mut self, rect: &Rect, colour: Colour);
    fn fill_polygon(&mut self, points: &[Point2d], colour: Colour);
    fn line(&mut self, from: Point2d, to: Point2d, colour: Colour, width: f64);
    fn circle(&mut self, centre: Point2d, radius: f64, colour: Colour);
    /// Writes a line of text with its top-left corner at `at`.
    fn text(&mut self, at: Point2d, text: &str, colour: Colour);
}

/// A vacant spot as it should be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpotView {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub spot: ParkingSpot,
    /// Whether this is the spot currently being attempted.
    pub active: bool,
}

/// Everything needed to draw one tick of the simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    pub tick: usize,
    pub running: bool,
    pub state: MotionState,
    pub outcome: Option<Outcome>,
    pub status: String,
    /// Attempts made so far.
    pub attempts: usize,
    pub max_attempts: usize,
    pub vehicle: [Point2d; 4],
    /// The front-of-vehicle triangle, tip first.
    pub heading_indicator: [Point2d; 3],
    pub path: Vec<Point2d>,
    /// The index in `path` of the waypoint being chased.
    pub cursor: usize,
    pub path_colour: Colour,
    pub spots: Vec<SpotView>,
    pub obstacles: Vec<Rect>,
}

impl Frame {
    /// Issues the draw calls for this frame, back to front.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for view in &self.spots {
            canvas.stroke_rect(&view.spot.rect, SPOT_COLOUR, 2.0);
        }
        for obstacle in &self.obstacles {
            canvas.fill_rect(obstacle, OBSTACLE_COLOUR);
        }
        for view in self.spots.iter().filter(|view| view.active) {
            canvas.stroke_rect(&view.spot.rect, ACTIVE_SPOT_COLOUR, 3.0);
        }

        canvas.fill_polygon(&self.vehicle, VEHICLE_COLOUR);
        canvas.fill_polygon(&self.heading_indicator, INDICATOR_COLOUR);

        if self.path.len() > 1 {
            for pair in self.path.windows(2) {
                canvas.line(pair[0], pair[1], self.path_colour, 2.0);
            }
            if let Some(waypoint) = self.path.get(self.cursor) {
                canvas.circle(*waypoint, 5.0, WAYPOINT_COLOUR);
            }
        }

        canvas.text(Point2d::new(10.0, 10.0), &self.status, TEXT_COLOUR);
        canvas.text(
            Point2d::new(10.0, 40.0),
            &format!("Attempts: {}/{}", self.attempts, self.max_attempts),
            TEXT_COLOUR,
        );
    }
}
