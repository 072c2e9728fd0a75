use std::fmt;

use waygrid_core::Point;

/// Errors that can occur when building a [`CostGrid`](crate::CostGrid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A row does not have the same width as the first row.
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A character other than `.` or `#` was found in a textual map.
    InvalidCell { ch: char, pos: Point },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "grid: row {row} has {found} cells, expected {expected}"
            ),
            Self::InvalidCell { ch, pos } => {
                write!(f, "grid contains invalid cell \u{201c}{ch}\u{201d} at {pos}")
            }
        }
    }
}

impl std::error::Error for GridError {}
