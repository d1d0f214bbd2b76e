//! Grid-based route planning.
//!
//! Continuous space is discretised into square cells, obstacles are
//! rasterised onto the grid with a safety margin, and A* searches the
//! 8-connected cells. The vehicle is treated as a point by the search;
//! the margin is what keeps its footprint clear of the obstacles.

pub use grid::{GridCell, OccupancyGrid};

use crate::debug::debug_polyline;
use crate::math::{Point2d, Rect};
use pathfinding::directed::astar::astar;

mod grid;

/// The number of cells by which every obstacle is grown before searching.
pub const SAFETY_MARGIN: i64 = 1;

/// Step costs are kept as integers scaled by this factor.
const COST_SCALE: u32 = 1000;

/// The cost of an orthogonal step.
const ORTHOGONAL_COST: u32 = COST_SCALE;

/// The cost of a diagonal step, approximating sqrt(2).
const DIAGONAL_COST: u32 = 1414;

/// The extra heuristic cost per diagonal step, approximating sqrt(2) - 1.
const DIAGONAL_SHORTCUT: u32 = 414;

/// A route found by the planner.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// The cells visited, from the start cell to the goal cell.
    pub cells: Vec<GridCell>,
    /// The centre of each visited cell in world coordinates.
    pub waypoints: Vec<Point2d>,
    /// The total step cost in cell units.
    pub cost: f64,
}

/// Plans routes over a fixed rectangular world.
#[derive(Clone, Copy, Debug)]
pub struct GridPlanner {
    /// The world space position of the grid's top-left corner.
    origin: Point2d,
    /// Number of columns.
    cols: i64,
    /// Number of rows.
    rows: i64,
    /// The side length of a cell in world units.
    cell_size: f64,
}

impl GridPlanner {
    /// Creates a planner covering a world of the given size, anchored at the origin.
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        Self::covering(&Rect::new(0.0, 0.0, width, height), cell_size)
    }

    /// Creates a planner covering the given area, with cells counted from its top-left corner.
    pub fn covering(bounds: &Rect, cell_size: f64) -> Self {
        Self {
            origin: Point2d::new(bounds.left(), bounds.top()),
            cols: (bounds.width() / cell_size).floor() as i64,
            rows: (bounds.height() / cell_size).floor() as i64,
            cell_size,
        }
    }

    /// The side length of a cell in world units.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The grid dimensions as (columns, rows).
    pub fn dims(&self) -> (i64, i64) {
        (self.cols, self.rows)
    }

    /// The cell containing a world space point.
    pub fn cell_of(&self, point: Point2d) -> GridCell {
        GridCell::new(
            ((point.x - self.origin.x) / self.cell_size).floor() as i64,
            ((point.y - self.origin.y) / self.cell_size).floor() as i64,
        )
    }

    /// The centre of a cell in world coordinates.
    pub fn cell_centre(&self, cell: GridCell) -> Point2d {
        Point2d::new(
            self.origin.x + (cell.x as f64 + 0.5) * self.cell_size,
            self.origin.y + (cell.y as f64 + 0.5) * self.cell_size,
        )
    }

    /// The area covered by a cell in world coordinates.
    pub fn cell_rect(&self, cell: GridCell) -> Rect {
        Rect::new(
            self.origin.x + cell.x as f64 * self.cell_size,
            self.origin.y + cell.y as f64 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }

    /// Builds the inflated occupancy grid for a set of obstacles.
    pub fn build_grid(&self, obstacles: &[Rect]) -> OccupancyGrid {
        let mut grid = OccupancyGrid::new(self.cols, self.rows, self.cell_size);
        for rect in obstacles {
            let local = rect.translate(-self.origin.x, -self.origin.y);
            grid.block_rect(&local, SAFETY_MARGIN);
        }
        grid
    }

    /// Finds the cheapest route between two points, or `None` if there isn't one.
    ///
    /// There is no route if either end point lies outside the grid or inside
    /// an (inflated) obstacle, or if the goal is walled off.
    pub fn plan(&self, start: Point2d, goal: Point2d, obstacles: &[Rect]) -> Option<Route> {
        let grid = self.build_grid(obstacles);
        let start = self.cell_of(start);
        let goal = self.cell_of(goal);

        #[cfg(feature = "debug")]
        for cell in grid.blocked_cells() {
            crate::debug::debug_rect("blocked cell", &self.cell_rect(cell));
        }

        if !grid.is_free(start) || !grid.is_free(goal) {
            log::debug!("no route: start {:?} or goal {:?} is unusable", start, goal);
            return None;
        }

        let (cells, cost) = astar(
            &start,
            |cell| grid.successors(*cell, ORTHOGONAL_COST, DIAGONAL_COST),
            |cell| octile_heuristic(*cell, goal),
            |cell| *cell == goal,
        )?;

        let waypoints: Vec<_> = cells.iter().map(|c| self.cell_centre(*c)).collect();
        debug_polyline("route", &waypoints);

        Some(Route {
            cells,
            waypoints,
            cost: cost as f64 / COST_SCALE as f64,
        })
    }

    /// Finds a sequence of waypoints from `start` to `goal` avoiding the obstacles.
    /// Returns an empty vector if no route exists.
    pub fn find_path(&self, start: Point2d, goal: Point2d, obstacles: &[Rect]) -> Vec<Point2d> {
        self.plan(start, goal, obstacles)
            .map(|route| route.waypoints)
            .unwrap_or_default()
    }
}

/// The octile distance between two cells, scaled like the step costs.
fn octile_heuristic(a: GridCell, b: GridCell) -> u32 {
    let dx = (a.x - b.x).unsigned_abs() as u32;
    let dy = (a.y - b.y).unsigned_abs() as u32;
    COST_SCALE * dx.max(dy) + DIAGONAL_SHORTCUT * dx.min(dy)
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    fn p(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    /// Exhaustive single-source shortest path by repeated relaxation.
    fn brute_force_cost(grid: &OccupancyGrid, start: GridCell, goal: GridCell) -> Option<u32> {
        let (w, h) = (grid.width(), grid.height());
        let idx = |c: GridCell| (c.y * w + c.x) as usize;
        let mut dist = vec![u32::MAX; (w * h) as usize];
        dist[idx(start)] = 0;
        loop {
            let mut changed = false;
            for y in 0..h {
                for x in 0..w {
                    let cell = GridCell::new(x, y);
                    let d = dist[idx(cell)];
                    if d == u32::MAX {
                        continue;
                    }
                    for (next, cost) in grid.successors(cell, ORTHOGONAL_COST, DIAGONAL_COST) {
                        if d + cost < dist[idx(next)] {
                            dist[idx(next)] = d + cost;
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        Some(dist[idx(goal)]).filter(|d| *d != u32::MAX)
    }

    #[test]
    fn straight_and_diagonal_routes() {
        let planner = GridPlanner::new(200.0, 200.0, 20.0);

        let route = planner.plan(p(10.0, 10.0), p(90.0, 10.0), &[]).unwrap();
        assert_eq!(route.cells.len(), 5);
        assert_approx_eq!(route.cost, 4.0);
        assert_eq!(route.waypoints[0], p(10.0, 10.0));
        assert_eq!(*route.waypoints.last().unwrap(), p(90.0, 10.0));

        let route = planner.plan(p(5.0, 5.0), p(65.0, 65.0), &[]).unwrap();
        assert_eq!(route.cells.len(), 4);
        assert_approx_eq!(route.cost, 3.0 * 1.414);
        assert_eq!(*route.waypoints.last().unwrap(), p(70.0, 70.0));
    }

    #[test]
    fn heuristic_is_octile() {
        assert_eq!(octile_heuristic(GridCell::new(0, 0), GridCell::new(3, 1)), 3414);
        assert_eq!(octile_heuristic(GridCell::new(2, 2), GridCell::new(2, 2)), 0);
    }

    #[test]
    fn no_route_cases() {
        let planner = GridPlanner::new(200.0, 200.0, 20.0);
        let wall = [Rect::new(80.0, 80.0, 20.0, 20.0)];

        // Start inside the inflated obstacle
        assert!(planner.find_path(p(65.0, 90.0), p(10.0, 10.0), &wall).is_empty());
        // Goal inside the inflated obstacle
        assert!(planner.find_path(p(10.0, 10.0), p(90.0, 90.0), &wall).is_empty());
        // Outside the grid
        assert!(planner.find_path(p(-1.0, 10.0), p(10.0, 10.0), &[]).is_empty());
        assert!(planner.find_path(p(10.0, 10.0), p(200.0, 10.0), &[]).is_empty());

        // Goal walled off on all sides
        let enclosure = [
            Rect::new(100.0, 100.0, 200.0, 5.0),
            Rect::new(100.0, 295.0, 200.0, 5.0),
            Rect::new(100.0, 100.0, 5.0, 200.0),
            Rect::new(295.0, 100.0, 5.0, 200.0),
        ];
        let planner = GridPlanner::new(400.0, 400.0, 20.0);
        assert!(planner.build_grid(&enclosure).is_free(planner.cell_of(p(200.0, 200.0))));
        assert!(planner.plan(p(10.0, 10.0), p(200.0, 200.0), &enclosure).is_none());
        assert!(planner.plan(p(10.0, 10.0), p(390.0, 390.0), &enclosure).is_some());
    }

    #[test]
    fn negative_coordinates_round_down() {
        let planner = GridPlanner::new(200.0, 200.0, 20.0);
        assert_eq!(planner.cell_of(p(-5.0, -5.0)), GridCell::new(-1, -1));
        assert_eq!(planner.cell_of(p(-19.9, 5.0)), GridCell::new(-1, 0));
        assert_eq!(planner.cell_of(p(19.9, 0.0)), GridCell::new(0, 0));
        assert!(planner.plan(p(-5.0, 10.0), p(90.0, 10.0), &[]).is_none());
    }

    #[test]
    fn grid_follows_world_origin() {
        let planner = GridPlanner::covering(&Rect::new(-200.0, -100.0, 400.0, 400.0), 20.0);
        assert_eq!(planner.dims(), (20, 20));
        assert_eq!(planner.cell_of(p(-200.0, -100.0)), GridCell::new(0, 0));
        assert_eq!(planner.cell_centre(GridCell::new(0, 0)), p(-190.0, -90.0));
        assert_eq!(planner.cell_rect(GridCell::new(1, 2)), Rect::new(-180.0, -60.0, 20.0, 20.0));

        let obstacles = [Rect::new(-100.0, -100.0, 20.0, 20.0)];
        let grid = planner.build_grid(&obstacles);
        assert!(grid.is_blocked(GridCell::new(5, 0)));
        assert!(grid.is_blocked(GridCell::new(4, 1)));
        assert!(grid.is_free(GridCell::new(5, 3)));

        let route = planner.plan(p(-190.0, -90.0), p(-10.0, -90.0), &obstacles).unwrap();
        assert_eq!(route.waypoints[0], p(-190.0, -90.0));
        assert_eq!(*route.waypoints.last().unwrap(), p(-10.0, -90.0));
        assert!(route.cells.iter().all(|cell| grid.is_free(*cell)));
    }

    #[test]
    fn route_avoids_inflated_cells() {
        let planner = GridPlanner::new(400.0, 400.0, 20.0);
        let obstacles = [
            Rect::new(100.0, 0.0, 20.0, 300.0),
            Rect::new(220.0, 100.0, 20.0, 300.0),
        ];
        let route = planner.plan(p(30.0, 30.0), p(370.0, 370.0), &obstacles).unwrap();
        let grid = planner.build_grid(&obstacles);
        for (cell, waypoint) in route.cells.iter().zip(&route.waypoints) {
            assert!(grid.is_free(*cell));
            assert!(!obstacles.iter().any(|o| o.contains(*waypoint)));
        }
        for pair in route.cells.windows(2) {
            assert!((pair[0].x - pair[1].x).abs() <= 1);
            assert!((pair[0].y - pair[1].y).abs() <= 1);
        }
    }

    #[test]
    fn route_cost_is_optimal() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let planner = GridPlanner::new(240.0, 240.0, 20.0);
        let mut compared = 0;

        for _ in 0..200 {
            let obstacles: Vec<_> = (0..rng.gen_range(1..5))
                .map(|_| {
                    Rect::new(
                        rng.gen_range(0.0..240.0),
                        rng.gen_range(0.0..240.0),
                        rng.gen_range(0.0..60.0),
                        rng.gen_range(0.0..60.0),
                    )
                })
                .collect();
            let start = p(rng.gen_range(0.0..240.0), rng.gen_range(0.0..240.0));
            let goal = p(rng.gen_range(0.0..240.0), rng.gen_range(0.0..240.0));

            let grid = planner.build_grid(&obstacles);
            let (start_cell, goal_cell) = (planner.cell_of(start), planner.cell_of(goal));
            let route = planner.plan(start, goal, &obstacles);

            if !grid.is_free(start_cell) || !grid.is_free(goal_cell) {
                assert!(route.is_none());
                continue;
            }

            let expected = brute_force_cost(&grid, start_cell, goal_cell);
            match (route, expected) {
                (Some(route), Some(cost)) => {
                    assert_approx_eq!(route.cost, cost as f64 / 1000.0, 1e-9);
                    // The reported cost matches the steps actually taken
                    let walked: f64 = route
                        .cells
                        .windows(2)
                        .map(|w| if w[0].is_diagonal_to(&w[1]) { 1.414 } else { 1.0 })
                        .sum();
                    assert_approx_eq!(walked, route.cost, 1e-9);
                    compared += 1;
                }
                (None, None) => {}
                (route, expected) => panic!("planner {:?} vs brute force {:?}", route, expected),
            }
        }
        assert!(compared > 20);
    }
}
