//! Queued A* pathfinding over a dynamically weighted grid.
//!
//! The crate is built from four layers:
//!
//! - [`CostGrid`]: an immutable walkability matrix plus a sparse, mutable
//!   cost overlay used to bias routes without forbidding them.
//! - [`PathNode`]: one search-tree node, stored in an arena owned by its task.
//! - [`PathTask`]: a single point-to-point request with its own frontier,
//!   lifecycle state and completion callback.
//! - [`Navigator`]: the solver that owns a FIFO queue of tasks and resolves
//!   them one after the other when the host calls [`Navigator::process`].
//!
//! Movement is 8-way. A diagonal step is allowed only when both orthogonal
//! cells it passes between are walkable, so agents never cut corners.
//!
//! # Trait seams
//!
//! | Trait | Required for |
//! |---|---|
//! | [`NavGrid`] | neighbour expansion ([`Neighbors::steps`]) |

mod cost_grid;
mod error;
mod navigator;
mod neighbors;
mod node;
mod task;
mod traits;

pub use cost_grid::{CostGrid, DEFAULT_COST};
pub use error::GridError;
pub use navigator::Navigator;
pub use neighbors::{Neighbors, Step};
pub use node::{Membership, NodeId, PathNode};
pub use task::{PathTask, TaskCallback, TaskId, TaskState, callback};
pub use traits::NavGrid;
