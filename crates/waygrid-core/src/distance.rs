use std::f64::consts::SQRT_2;

use crate::Point;

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Straight-line (L2) distance between two points.
#[inline]
pub fn euclidean(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    dx.hypot(dy)
}

/// Length of the shortest 8-way route on an open unit-cost grid:
/// diagonal steps cost √2, straight steps cost 1.
#[inline]
pub fn octile(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let diag = dx.min(dy);
    let straight = dx.max(dy) - diag;
    f64::from(diag) * SQRT_2 + f64::from(straight)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_distance() {
        let a = Point::new(1, 1);
        let b = Point::new(4, 3);
        assert_eq!(chebyshev(a, b), 3);
        assert_eq!(chebyshev(b, a), 3);
    }

    #[test]
    fn euclidean_distance() {
        assert_eq!(euclidean(Point::ZERO, Point::new(3, 4)), 5.0);
        assert_eq!(euclidean(Point::new(2, 2), Point::new(2, 2)), 0.0);
    }

    #[test]
    fn octile_never_below_euclidean() {
        let a = Point::ZERO;
        for b in [Point::new(9, 9), Point::new(5, 2), Point::new(0, 7)] {
            assert!(octile(a, b) + 1e-9 >= euclidean(a, b));
        }
        assert!((octile(a, Point::new(9, 9)) - 9.0 * SQRT_2).abs() < 1e-9);
        assert!((octile(a, Point::new(5, 2)) - (2.0 * SQRT_2 + 3.0)).abs() < 1e-9);
    }
}
