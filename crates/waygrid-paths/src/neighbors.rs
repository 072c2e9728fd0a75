use std::f64::consts::SQRT_2;

use waygrid_core::Point;

use crate::traits::NavGrid;

// Right, left, down, up.
const STRAIGHT: [Point; 4] = [
    Point::new(1, 0),
    Point::new(-1, 0),
    Point::new(0, 1),
    Point::new(0, -1),
];

// Each diagonal with the indices of the two STRAIGHT directions it passes
// between.
const DIAGONAL: [(Point, usize, usize); 4] = [
    (Point::new(1, 1), 0, 2),
    (Point::new(1, -1), 0, 3),
    (Point::new(-1, -1), 1, 3),
    (Point::new(-1, 1), 1, 2),
];

/// A single allowed move out of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub to: Point,
    pub diagonal: bool,
}

impl Step {
    /// Base length of the move before the destination cell's cost is
    /// applied: 1 for straight moves, √2 for diagonal ones.
    #[inline]
    pub fn length(self) -> f64 {
        if self.diagonal { SQRT_2 } else { 1.0 }
    }
}

/// Cached neighbour computation helper.
///
/// Straight neighbours are listed first, then diagonals. A diagonal is only
/// allowed when both straight neighbours sharing an edge with it are
/// walkable: agents never squeeze between two blocked cells.
pub struct Neighbors {
    buf: Vec<Step>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return the walkable moves out of `p`.
    pub fn steps(&mut self, grid: &impl NavGrid, p: Point) -> &[Step] {
        self.buf.clear();
        let mut open = [false; 4];
        for (i, d) in STRAIGHT.iter().enumerate() {
            let n = p + *d;
            if grid.is_walkable(n) {
                open[i] = true;
                self.buf.push(Step {
                    to: n,
                    diagonal: false,
                });
            }
        }
        for (d, a, b) in DIAGONAL {
            if !(open[a] && open[b]) {
                continue;
            }
            let n = p + d;
            if grid.is_walkable(n) {
                self.buf.push(Step {
                    to: n,
                    diagonal: true,
                });
            }
        }
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CostGrid;

    fn targets(steps: &[Step]) -> Vec<Point> {
        steps.iter().map(|s| s.to).collect()
    }

    #[test]
    fn open_cell_has_eight_moves_straight_first() {
        let g = CostGrid::new(3, 3);
        let mut nb = Neighbors::new();
        let steps = nb.steps(&g, Point::new(1, 1));
        assert_eq!(steps.len(), 8);
        assert!(steps[..4].iter().all(|s| !s.diagonal));
        assert!(steps[4..].iter().all(|s| s.diagonal));
    }

    #[test]
    fn corner_of_grid() {
        let g = CostGrid::new(3, 3);
        let mut nb = Neighbors::new();
        let mut got = targets(nb.steps(&g, Point::new(0, 0)));
        got.sort();
        assert_eq!(got, vec![Point::new(1, 0), Point::new(0, 1), Point::new(1, 1)]);
    }

    #[test]
    fn no_corner_cutting() {
        // The diagonal (1,1) is open but both cells beside the move are walls.
        let g = CostGrid::parse(
            "\
.#
#.",
        )
        .unwrap();
        let mut nb = Neighbors::new();
        assert!(nb.steps(&g, Point::new(0, 0)).is_empty());
    }

    #[test]
    fn single_wall_blocks_diagonal() {
        let g = CostGrid::parse(
            "\
.#
..",
        )
        .unwrap();
        let mut nb = Neighbors::new();
        let got = targets(nb.steps(&g, Point::new(0, 0)));
        assert_eq!(got, vec![Point::new(0, 1)]);
    }

    #[test]
    fn step_lengths() {
        let s = Step {
            to: Point::ZERO,
            diagonal: false,
        };
        assert_eq!(s.length(), 1.0);
        let d = Step {
            to: Point::ZERO,
            diagonal: true,
        };
        assert_eq!(d.length(), SQRT_2);
    }
}
