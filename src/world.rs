//! The parking lot: its bounds, vacant spots and obstacles.

use crate::config::WorldConfig;
use crate::math::Rect;
use crate::parking::{ParkingSpot, SpotId, SpotKind, SpotOrientation};
use rand::Rng;
use rand_distr::{Bernoulli, Distribution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The size of a parallel slot.
const PARALLEL_SLOT: (f64, f64) = (100.0, 50.0);

/// The size of a perpendicular slot.
const PERPENDICULAR_SLOT: (f64, f64) = (60.0, 90.0);

/// How much smaller than its slot a parked car is, in each dimension.
const PARKED_CAR_MARGIN: f64 = 10.0;

/// A static parking lot. Spots and obstacles do not change during an attempt.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct World {
    bounds: Rect,
    spots: Vec<ParkingSpot>,
    obstacles: Vec<Rect>,
}

impl World {
    /// Creates a world with explicit contents.
    pub fn new(bounds: Rect, spots: Vec<ParkingSpot>, obstacles: Vec<Rect>) -> Self {
        Self {
            bounds,
            spots,
            obstacles,
        }
    }

    /// Lays out a parking lot, filling each slot with a parked car with
    /// probability `config.occupancy`.
    ///
    /// There are two rows of parallel slots along the top and bottom of the
    /// lot, and two columns of perpendicular slots down the left and right.
    pub fn generate<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Self {
        // An out of range occupancy leaves every slot vacant
        let occupied = Bernoulli::new(config.occupancy).ok();
        let (width, height) = (config.width, config.height);

        let parallel = [150.0, height - 200.0].into_iter().flat_map(|y| {
            (0..6).map(move |i| {
                let rect = Rect::new(300.0 + i as f64 * 120.0, y, PARALLEL_SLOT.0, PARALLEL_SLOT.1);
                (rect, SpotKind::Parallel, SpotOrientation::Horizontal)
            })
        });
        let perpendicular = [300.0, width - 200.0].into_iter().flat_map(|x| {
            (0..4).map(move |i| {
                let rect = Rect::new(
                    x,
                    250.0 + i as f64 * 110.0,
                    PERPENDICULAR_SLOT.0,
                    PERPENDICULAR_SLOT.1,
                );
                (rect, SpotKind::Perpendicular, SpotOrientation::Vertical)
            })
        });

        let mut world = Self {
            bounds: config.bounds(),
            ..Default::default()
        };
        for (rect, kind, orientation) in parallel.chain(perpendicular) {
            if occupied.map_or(false, |distr| distr.sample(rng)) {
                world.obstacles.push(Rect::new(
                    rect.left(),
                    rect.top(),
                    rect.width() - PARKED_CAR_MARGIN,
                    rect.height() - PARKED_CAR_MARGIN,
                ));
            } else {
                world.spots.push(ParkingSpot::new(rect, kind, orientation));
            }
        }
        log::info!(
            "generated world with {} vacant spots and {} parked cars",
            world.spots.len(),
            world.obstacles.len()
        );
        world
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The vacant spots, indexed by [SpotId].
    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    pub fn spot(&self, id: SpotId) -> Option<&ParkingSpot> {
        self.spots.get(id.0)
    }

    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }
}
