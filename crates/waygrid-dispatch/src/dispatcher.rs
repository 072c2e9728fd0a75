//! The [`Dispatcher`] trait: what the rest of the game sees.

use waygrid_core::{Point, Range};
use waygrid_paths::{TaskCallback, TaskId};

use crate::config::NavigatorConfig;
use crate::error::DispatchError;

// Straight neighbours, used by the wall bias.
const SIDES: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Task and cost interface shared by every navigator deployment.
///
/// Callbacks run from inside the pass that resolves them
/// ([`LocalNavigator::update`](crate::LocalNavigator::update) and `flush`,
/// [`WorkerNavigator::poll`](crate::WorkerNavigator::poll) and `wait`),
/// while the navigator is mutably borrowed. A callback must not reach back
/// into the same navigator: a host holding it in `Rc<RefCell<_>>` would
/// panic on the second borrow. Queue follow-up requests from the callback
/// and submit them once the pass has returned.
pub trait Dispatcher {
    /// Queue a path request and return its id immediately. The callback
    /// runs once the solver resolves the task, never from inside this call.
    fn create_task(&mut self, from: Point, to: Point, callback: TaskCallback) -> TaskId;

    /// Like [`create_task`](Self::create_task) with a caller-chosen id.
    ///
    /// Fails with [`DispatchError::DuplicateTask`] if the id belongs to a
    /// task that has not resolved yet.
    fn create_task_with_id(
        &mut self,
        id: TaskId,
        from: Point,
        to: Point,
        callback: TaskCallback,
    ) -> Result<TaskId, DispatchError>;

    /// Abandon a task; its callback will not run. Unknown or already
    /// resolved ids are ignored.
    fn cancel_task(&mut self, id: TaskId);

    /// Set the overlay cost of a cell. Repeating the current value does
    /// nothing.
    fn set_point_cost(&mut self, position: Point, cost: f64);

    /// Revert a cell to the default cost.
    fn reset_point_cost(&mut self, position: Point);

    /// Revert every cell to the default cost.
    fn reset_points_cost(&mut self);

    /// Current effective cost of a cell.
    fn point_cost(&self, position: Point) -> f64;

    fn is_walkable(&self, position: Point) -> bool;

    /// Bounds of the walkability grid.
    fn range(&self) -> Range;

    fn config(&self) -> &NavigatorConfig;

    /// Bias routes away from a building at `position`: the cell gets
    /// `building_cost` and the walkable cells around it get `corner_cost`.
    /// A neighbour that already costs more keeps its cost, so adjacent
    /// buildings do not cheapen each other.
    fn mark_obstacle(&mut self, position: Point) {
        let building = self.config().building_cost;
        let corner = self.config().corner_cost;
        self.set_point_cost(position, building);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let p = position.shift(dx, dy);
                if p != position && self.is_walkable(p) && self.point_cost(p) < corner {
                    self.set_point_cost(p, corner);
                }
            }
        }
    }

    /// Give every walkable cell that shares an edge with a blocked cell
    /// `corner_cost`, so agents keep off wall edges when they can.
    fn bias_walls(&mut self) {
        let corner = self.config().corner_cost;
        for p in self.range() {
            if self.is_walkable(p) {
                continue;
            }
            for (dx, dy) in SIDES {
                let n = p.shift(dx, dy);
                if self.is_walkable(n) && self.point_cost(n) < corner {
                    self.set_point_cost(n, corner);
                }
            }
        }
    }
}

/// Generator of task ids that skips ids still in use.
#[derive(Debug)]
pub(crate) struct IdSource {
    next: u64,
}

impl IdSource {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn next(&mut self, taken: impl Fn(TaskId) -> bool) -> TaskId {
        loop {
            let id = TaskId(self.next);
            self.next = self.next.wrapping_add(1);
            if !taken(id) {
                return id;
            }
        }
    }
}
