//! Parking spots and target selection.

use crate::math::{distance, Point2d, Rect};
use crate::planner::GridPlanner;
use crate::vehicle::Pose;
use arrayvec::ArrayVec;
use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Distance of a parallel spot's entry point from the spot, in world units.
const PARALLEL_ENTRY_OFFSET: f64 = 50.0;

/// Distance of a perpendicular spot's entry point from the spot, in world units.
const PERPENDICULAR_ENTRY_OFFSET: f64 = 70.0;

/// How far into the spot the first in-spot waypoint lies, in world units.
const MANEUVER_DEPTH: f64 = 30.0;

/// Identifies a spot by its index in the world's spot list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpotId(pub usize);

/// The kind of parking maneuver a spot requires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpotKind {
    Parallel,
    Perpendicular,
}

/// The axis along which a spot is laid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpotOrientation {
    Horizontal,
    Vertical,
}

/// A vacant parking spot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParkingSpot {
    pub rect: Rect,
    pub kind: SpotKind,
    pub orientation: SpotOrientation,
}

/// A planned parking attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct ParkingPlan {
    /// The targeted spot.
    pub spot: SpotId,
    /// The route to the entry point followed by the in-spot maneuver.
    pub path: Vec<Point2d>,
    /// The index in `path` at which the in-spot maneuver begins.
    pub maneuver_start: usize,
}

impl ParkingSpot {
    pub fn new(rect: Rect, kind: SpotKind, orientation: SpotOrientation) -> Self {
        Self {
            rect,
            kind,
            orientation,
        }
    }

    /// The point from which the vehicle begins its in-spot maneuver.
    pub fn entry_point(&self) -> Point2d {
        use SpotKind::*;
        use SpotOrientation::*;
        let rect = &self.rect;
        let centre = rect.centre();
        match (self.kind, self.orientation) {
            (Parallel, Horizontal) => Point2d::new(rect.left() - PARALLEL_ENTRY_OFFSET, centre.y),
            (Parallel, Vertical) => Point2d::new(centre.x, rect.top() - PARALLEL_ENTRY_OFFSET),
            (Perpendicular, Horizontal) => {
                Point2d::new(centre.x, rect.top() - PERPENDICULAR_ENTRY_OFFSET)
            }
            (Perpendicular, Vertical) => {
                Point2d::new(rect.left() - PERPENDICULAR_ENTRY_OFFSET, centre.y)
            }
        }
    }

    /// The two waypoints that take the vehicle from the entry point into the spot.
    pub fn maneuver(&self) -> ArrayVec<Point2d, 2> {
        use SpotKind::*;
        use SpotOrientation::*;
        let rect = &self.rect;
        let centre = rect.centre();
        let first = match (self.kind, self.orientation) {
            (Parallel, Horizontal) | (Perpendicular, Vertical) => {
                Point2d::new(rect.left() + MANEUVER_DEPTH, centre.y)
            }
            (Parallel, Vertical) | (Perpendicular, Horizontal) => {
                Point2d::new(centre.x, rect.top() + MANEUVER_DEPTH)
            }
        };
        ArrayVec::from([first, centre])
    }
}

/// Picks the spot to attempt next.
///
/// Spots that are occupied or have already failed are skipped. The rest are
/// ordered by distance from the vehicle, and the `attempt`-th nearest is
/// chosen, clamped to the farthest candidate.
pub fn select_target(
    pose: &Pose,
    spots: &[ParkingSpot],
    occupied: &[Rect],
    failed: &BTreeSet<SpotId>,
    attempt: usize,
) -> Option<SpotId> {
    let candidates = spots
        .iter()
        .enumerate()
        .map(|(idx, spot)| (SpotId(idx), spot))
        .filter(|(id, spot)| !failed.contains(id) && !occupied.contains(&spot.rect))
        .map(|(id, spot)| (id, distance(pose.position, spot.rect.centre())))
        .sorted_by(|a, b| a.1.total_cmp(&b.1))
        .collect::<Vec<_>>();

    let last = candidates.len().checked_sub(1)?;
    Some(candidates[usize::min(attempt, last)].0)
}

/// Plans a full parking path from `start` into the given spot.
///
/// Every other spot is treated as an obstacle, so the route does not cut
/// through spots it isn't parking in. Returns `None` if the entry point
/// cannot be reached.
pub fn plan_parking(
    planner: &GridPlanner,
    start: Point2d,
    spots: &[ParkingSpot],
    target: SpotId,
    obstacles: &[Rect],
) -> Option<ParkingPlan> {
    let spot = spots.get(target.0)?;
    let blocked = obstacles
        .iter()
        .copied()
        .chain(
            spots
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != target.0)
                .map(|(_, other)| other.rect),
        )
        .collect::<Vec<_>>();

    let route = planner.find_path(start, spot.entry_point(), &blocked);
    if route.is_empty() {
        return None;
    }

    let maneuver_start = route.len();
    let mut path = route;
    path.extend(spot.maneuver());
    Some(ParkingPlan {
        spot: target,
        path,
        maneuver_start,
    })
}
