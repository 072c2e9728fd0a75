use std::collections::HashMap;

use waygrid_core::{Point, Range};

use crate::error::GridError;
use crate::traits::NavGrid;

/// Effective cost of a cell that has no overlay entry.
pub const DEFAULT_COST: f64 = 1.0;

/// Static walkability matrix with a sparse cost overlay on top.
///
/// Walkability is fixed at construction: the collision topology of a level
/// never changes at runtime. What changes is traversal *preference*, which
/// lives in the overlay. A cell can be walkable and expensive at the same
/// time, e.g. next to a building, which biases searches away from it
/// without forbidding it.
#[derive(Clone, Debug)]
pub struct CostGrid {
    rng: Range,
    width: usize,
    walkable: Vec<bool>,
    overlay: HashMap<Point, f64>,
}

impl CostGrid {
    /// Create a fully walkable grid of the given size.
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_fn(width, height, |_| true)
    }

    /// Create a grid whose walkability is given by `walkable(p)`.
    pub fn from_fn(width: i32, height: i32, walkable: impl FnMut(Point) -> bool) -> Self {
        let rng = Range::with_size(width, height);
        Self {
            rng,
            width: rng.width().max(0) as usize,
            walkable: rng.iter().map(walkable).collect(),
            overlay: HashMap::new(),
        }
    }

    /// Create a grid from rows of walkability flags (`true` = walkable).
    ///
    /// Every row must have the width of the first one.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let mut walkable = Vec::with_capacity(expected * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
            walkable.extend(cells);
        }
        let rng = Range::with_size(expected as i32, height as i32);
        Ok(Self {
            rng,
            width: expected,
            walkable,
            overlay: HashMap::new(),
        })
    }

    /// Create a grid from a collision matrix where `0` is walkable and any
    /// other value is blocked.
    pub fn from_matrix(matrix: &[Vec<u8>]) -> Result<Self, GridError> {
        Self::from_rows(
            matrix
                .iter()
                .map(|row| row.iter().map(|&c| c == 0).collect())
                .collect(),
        )
    }

    /// Parse a textual map: `.` is walkable, `#` is blocked. Empty lines are
    /// ignored.
    pub fn parse(map: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (y, line) in map.lines().filter(|l| !l.is_empty()).enumerate() {
            let mut row = Vec::with_capacity(line.len());
            for (x, ch) in line.chars().enumerate() {
                match ch {
                    '.' => row.push(true),
                    '#' => row.push(false),
                    _ => {
                        return Err(GridError::InvalidCell {
                            ch,
                            pos: Point::new(x as i32, y as i32),
                        });
                    }
                }
            }
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    /// The grid bounds.
    #[inline]
    pub fn range(&self) -> Range {
        self.rng
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.rng.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.rng.height()
    }

    /// Whether `p` is inside the grid.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.rng.contains(p)
    }

    /// Whether an agent may stand on `p`. Out-of-bounds points are blocked,
    /// so expansion stops naturally at the grid edges.
    #[inline]
    pub fn is_walkable(&self, p: Point) -> bool {
        self.idx(p).is_some_and(|i| self.walkable[i])
    }

    /// Effective cost of entering `p`: the overlay value if present,
    /// [`DEFAULT_COST`] otherwise (including out-of-bounds points).
    #[inline]
    pub fn cost_of(&self, p: Point) -> f64 {
        self.overlay.get(&p).copied().unwrap_or(DEFAULT_COST)
    }

    /// Install or overwrite the overlay cost of `p`.
    ///
    /// Returns `false` without touching the overlay when `cost` equals the
    /// current effective cost, when `p` is outside the grid, or when `cost`
    /// is not a finite positive number.
    pub fn set_cost(&mut self, p: Point, cost: f64) -> bool {
        if !(cost.is_finite() && cost > 0.0) {
            log::warn!("rejected cost {cost} for {p}: costs must be finite and positive");
            return false;
        }
        if !self.contains(p) {
            log::trace!("ignored cost update for {p}: outside {}", self.rng);
            return false;
        }
        if self.cost_of(p) == cost {
            return false;
        }
        self.overlay.insert(p, cost);
        true
    }

    /// Remove the overlay entry of `p`, reverting it to [`DEFAULT_COST`].
    /// Returns whether an entry was present.
    pub fn reset_cost(&mut self, p: Point) -> bool {
        self.overlay.remove(&p).is_some()
    }

    /// Drop every overlay entry.
    pub fn reset_all(&mut self) {
        self.overlay.clear();
    }

    /// Number of cells carrying an overlay cost.
    #[inline]
    pub fn overlay_len(&self) -> usize {
        self.overlay.len()
    }

    /// Iterate over the overlay entries in unspecified order.
    pub fn overlay(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
        self.overlay.iter().map(|(&p, &c)| (p, c))
    }

    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if !self.rng.contains(p) {
            return None;
        }
        let x = (p.x - self.rng.min.x) as usize;
        let y = (p.y - self.rng.min.y) as usize;
        Some(y * self.width + x)
    }
}

impl NavGrid for CostGrid {
    #[inline]
    fn is_walkable(&self, p: Point) -> bool {
        CostGrid::is_walkable(self, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: &str = "\
.#..
.#..
....";

    #[test]
    fn parse_walkability() {
        let g = CostGrid::parse(ROOM).unwrap();
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 3);
        assert!(g.is_walkable(Point::new(0, 0)));
        assert!(!g.is_walkable(Point::new(1, 0)));
        assert!(!g.is_walkable(Point::new(1, 1)));
        assert!(g.is_walkable(Point::new(1, 2)));
    }

    #[test]
    fn out_of_bounds_is_blocked_but_default_cost() {
        let g = CostGrid::new(3, 3);
        for p in [Point::new(-1, 0), Point::new(0, -1), Point::new(3, 0), Point::new(0, 3)] {
            assert!(!g.is_walkable(p));
            assert_eq!(g.cost_of(p), DEFAULT_COST);
        }
    }

    #[test]
    fn parse_rejects_unknown_cells() {
        let err = CostGrid::parse("..\n.x").unwrap_err();
        assert_eq!(
            err,
            GridError::InvalidCell {
                ch: 'x',
                pos: Point::new(1, 1)
            }
        );
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = CostGrid::from_rows(vec![vec![true; 3], vec![true; 2]]).unwrap_err();
        assert_eq!(
            err,
            GridError::Ragged {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn collision_matrix_zero_is_walkable() {
        let g = CostGrid::from_matrix(&[vec![0, 1], vec![0, 0]]).unwrap();
        assert!(g.is_walkable(Point::new(0, 0)));
        assert!(!g.is_walkable(Point::new(1, 0)));
        assert!(g.is_walkable(Point::new(1, 1)));
    }

    #[test]
    fn set_and_reset_cost() {
        let mut g = CostGrid::new(4, 4);
        let p = Point::new(2, 1);
        assert!(g.set_cost(p, 5.0));
        assert_eq!(g.cost_of(p), 5.0);
        // Same value again is a no-op.
        assert!(!g.set_cost(p, 5.0));
        assert!(g.set_cost(p, 3.0));
        assert_eq!(g.overlay_len(), 1);

        assert!(g.reset_cost(p));
        assert_eq!(g.cost_of(p), DEFAULT_COST);
        assert!(!g.reset_cost(p));
    }

    #[test]
    fn setting_default_cost_on_plain_cell_is_noop() {
        let mut g = CostGrid::new(2, 2);
        assert!(!g.set_cost(Point::new(1, 1), DEFAULT_COST));
        assert_eq!(g.overlay_len(), 0);
    }

    #[test]
    fn invalid_costs_rejected() {
        let mut g = CostGrid::new(2, 2);
        let p = Point::new(0, 0);
        assert!(!g.set_cost(p, 0.0));
        assert!(!g.set_cost(p, -2.0));
        assert!(!g.set_cost(p, f64::NAN));
        assert!(!g.set_cost(p, f64::INFINITY));
        assert!(!g.set_cost(Point::new(5, 5), 2.0));
        assert_eq!(g.overlay_len(), 0);
    }

    #[test]
    fn overlay_does_not_change_walkability() {
        let mut g = CostGrid::parse("..\n.#").unwrap();
        g.set_cost(Point::new(0, 0), 100.0);
        assert!(g.is_walkable(Point::new(0, 0)));
        g.set_cost(Point::new(1, 1), 0.5);
        assert!(!g.is_walkable(Point::new(1, 1)));
    }

    #[test]
    fn reset_all_clears_overlay() {
        let mut g = CostGrid::new(3, 3);
        g.set_cost(Point::new(0, 0), 2.0);
        g.set_cost(Point::new(1, 0), 4.0);
        let mut entries: Vec<_> = g.overlay().collect();
        entries.sort_by_key(|&(p, _)| p);
        assert_eq!(entries, vec![(Point::new(0, 0), 2.0), (Point::new(1, 0), 4.0)]);
        g.reset_all();
        assert_eq!(g.overlay_len(), 0);
        assert_eq!(g.cost_of(Point::new(1, 0)), DEFAULT_COST);
    }
}
