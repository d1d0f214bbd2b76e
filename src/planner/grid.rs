use crate::math::Rect;
use crate::util::Interval;
use smallvec::SmallVec;

/// The 8-connected neighbourhood, orthogonal moves first.
const NEIGHBOURS: [(i64, i64); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
];

/// The index of a cell in an [OccupancyGrid].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Whether moving from `self` to `other` is a diagonal step.
    pub fn is_diagonal_to(&self, other: &GridCell) -> bool {
        self.x != other.x && self.y != other.y
    }
}

/// A boolean occupancy grid over uniformly sized square cells.
#[derive(Clone, Debug)]
pub struct OccupancyGrid {
    width: i64,
    height: i64,
    cell_size: f64,
    blocked: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates an empty grid with the given dimensions in cells.
    pub fn new(width: i64, height: i64, cell_size: f64) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cell_size,
            blocked: vec![false; (width * height) as usize],
        }
    }

    /// The number of columns.
    pub fn width(&self) -> i64 {
        self.width
    }

    /// The number of rows.
    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Whether the cell is marked as blocked. Cells outside the grid are not blocked.
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.index(cell).map_or(false, |idx| self.blocked[idx])
    }

    /// Whether the cell is inside the grid and not blocked.
    pub fn is_free(&self, cell: GridCell) -> bool {
        self.index(cell).map_or(false, |idx| !self.blocked[idx])
    }

    /// Marks every cell covered by `rect`, grown by `margin` cells on each side, as blocked.
    pub fn block_rect(&mut self, rect: &Rect, margin: i64) {
        let cols = rect
            .x
            .cells(self.cell_size)
            .clamp_to(Interval::new(0, self.width - 1))
            .inflate(margin)
            .clamp_to(Interval::new(0, self.width - 1));
        let rows = rect
            .y
            .cells(self.cell_size)
            .clamp_to(Interval::new(0, self.height - 1))
            .inflate(margin)
            .clamp_to(Interval::new(0, self.height - 1));

        for y in rows.iter() {
            for x in cols.iter() {
                let idx = (y * self.width + x) as usize;
                self.blocked[idx] = true;
            }
        }
    }

    /// The free neighbours of a cell along with the scaled cost of moving to them.
    pub fn successors(
        &self,
        cell: GridCell,
        orthogonal_cost: u32,
        diagonal_cost: u32,
    ) -> SmallVec<[(GridCell, u32); 8]> {
        NEIGHBOURS
            .iter()
            .map(|(dx, dy)| GridCell::new(cell.x + dx, cell.y + dy))
            .filter(|next| self.is_free(*next))
            .map(|next| {
                let cost = if cell.is_diagonal_to(&next) {
                    diagonal_cost
                } else {
                    orthogonal_cost
                };
                (next, cost)
            })
            .collect()
    }

    /// Iterates over all blocked cells, row by row.
    pub fn blocked_cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        let width = self.width;
        self.blocked
            .iter()
            .enumerate()
            .filter(|(_, blocked)| **blocked)
            .map(move |(idx, _)| GridCell::new(idx as i64 % width, idx as i64 / width))
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }
}
