//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use cgmath::num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A closed interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value, including its end points.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns true if the interval contains no values.
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl<T: Ord + Copy> Interval<T> {
    /// Restricts both ends of the interval to lie within `bounds`.
    /// The result is empty if the two intervals do not overlap.
    pub fn clamp_to(&self, bounds: Self) -> Self {
        Self {
            min: Ord::max(self.min, bounds.min),
            max: Ord::min(self.max, bounds.max),
        }
    }
}

impl Interval<i64> {
    /// Widens the interval by `margin` on both ends.
    pub fn inflate(&self, margin: i64) -> Self {
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Iterates over every integer in the interval.
    pub fn iter(&self) -> impl Iterator<Item = i64> {
        self.min..=self.max
    }
}

impl<T: Float> Interval<T> {
    /// Creates an interval from a start point and a (non-negative) extent.
    pub fn span(start: T, extent: T) -> Self {
        Self {
            min: start,
            max: start + extent,
        }
    }

    /// Returns the centre/mid-point of the interval.
    pub fn midpoint(&self) -> T {
        T::from(0.5).unwrap() * (self.min + self.max)
    }

    /// Maps the interval onto integer cells of the given size, using floor division
    /// on both ends.
    pub fn cells(&self, cell_size: T) -> Interval<i64> {
        let to_cell = |v: T| (v / cell_size).floor().to_i64().unwrap_or(i64::MIN);
        Interval {
            min: to_cell(self.min),
            max: to_cell(self.max),
        }
    }
}

impl<T: Float> std::ops::Add<T> for Interval<T> {
    type Output = Interval<T>;

    fn add(self, rhs: T) -> Self::Output {
        Self {
            min: self.min + rhs,
            max: self.max + rhs,
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}
