//! **waygrid-core**: geometry shared by the waygrid crates.
//!
//! Provides the integer grid coordinate [`Point`], the half-open rectangle
//! [`Range`] used to describe grid bounds, and the distance metrics the
//! search uses for its heuristic and its tests.

pub mod distance;
pub mod geom;

pub use distance::{chebyshev, euclidean, octile};
pub use geom::{Point, Range, RangeIter};
