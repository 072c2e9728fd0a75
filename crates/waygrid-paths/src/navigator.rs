use std::collections::VecDeque;

use waygrid_core::Point;

use crate::cost_grid::CostGrid;
use crate::neighbors::Neighbors;
use crate::node::NodeId;
use crate::task::{PathTask, TaskCallback, TaskId, TaskState};

/// The solver: a FIFO queue of [`PathTask`]s over one [`CostGrid`].
///
/// Tasks are resolved strictly one at a time. [`process`](Self::process)
/// runs the task at the head of the queue until it completes or fails
/// before it touches the next one, and keeps going until the queue is
/// empty. The host is expected to call it at a bounded cadence rather than
/// every tick.
///
/// Cost updates are read at expansion time, so a change made between two
/// `process` calls is seen by every node expanded afterwards. Nodes that
/// are already closed are never revisited.
pub struct Navigator {
    grid: CostGrid,
    queue: VecDeque<PathTask>,
    neighbors: Neighbors,
}

impl Navigator {
    /// Create a solver with an empty queue.
    pub fn new(grid: CostGrid) -> Self {
        Self {
            grid,
            queue: VecDeque::new(),
            neighbors: Neighbors::new(),
        }
    }

    #[inline]
    pub fn grid(&self) -> &CostGrid {
        &self.grid
    }

    /// Mutable access to the grid, for overlay updates.
    #[inline]
    pub fn grid_mut(&mut self) -> &mut CostGrid {
        &mut self.grid
    }

    /// Queue a new task for `from → to` and return its id.
    pub fn create_task(
        &mut self,
        id: TaskId,
        from: Point,
        to: Point,
        callback: TaskCallback,
    ) -> TaskId {
        self.enqueue(PathTask::new(id, from, to, callback));
        id
    }

    /// Append an already built task to the queue.
    pub fn enqueue(&mut self, task: PathTask) {
        self.queue.push_back(task);
    }

    /// Cancel a queued task. Its callback will never run. Returns `false`
    /// if no live task has this id.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.queue
            .iter_mut()
            .find(|t| t.id() == id && !t.state().is_terminal())
            .is_some_and(PathTask::cancel)
    }

    /// Whether a live (not canceled) task with this id is queued.
    pub fn has_task(&self, id: TaskId) -> bool {
        self.queue
            .iter()
            .any(|t| t.id() == id && !t.state().is_terminal())
    }

    /// Number of queued tasks, canceled ones included until the next pass
    /// drops them.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Resolve every queued task in FIFO order and return how many reached
    /// `Complete` or `Failed`. Canceled tasks are dropped silently.
    pub fn process(&mut self) -> usize {
        let mut resolved = 0;
        while let Some(mut task) = self.queue.pop_front() {
            if task.state() == TaskState::Canceled {
                log::trace!("dropped canceled task {}", task.id());
                continue;
            }
            self.resolve(&mut task);
            resolved += 1;
        }
        resolved
    }

    /// Run a single task to a terminal state.
    fn resolve(&mut self, task: &mut PathTask) {
        task.begin();

        if !self.grid.contains(task.origin()) || !self.grid.contains(task.destination()) {
            log::debug!(
                "task {} failed: {} -> {} leaves {}",
                task.id(),
                task.origin(),
                task.destination(),
                self.grid.range()
            );
            task.fail();
            return;
        }

        loop {
            let Some(current) = task.take_next() else {
                log::debug!(
                    "task {} failed: no route {} -> {} ({} nodes expanded)",
                    task.id(),
                    task.origin(),
                    task.destination(),
                    task.expanded()
                );
                task.fail();
                return;
            };

            let node = task.node(current);
            if node.pos() == task.destination() {
                log::debug!(
                    "task {} complete: cost {:.3}, {} nodes expanded",
                    task.id(),
                    node.cost(),
                    task.expanded()
                );
                task.complete(current);
                return;
            }

            task.close(current);
            self.expand(task, current);
        }
    }

    fn expand(&mut self, task: &mut PathTask, current: NodeId) {
        let node = task.node(current);
        let (pos, g) = (node.pos(), node.cost());

        for step in self.neighbors.steps(&self.grid, pos) {
            let cost = g + step.length() * self.grid.cost_of(step.to);
            match task.pick_node(step.to) {
                Some(existing) => {
                    task.improve(existing, current, cost);
                }
                None => {
                    task.add_node(Some(current), step.to, cost);
                }
            }
        }
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("range", &self.grid.range())
            .field("overlay", &self.grid.overlay_len())
            .field("pending", &self.queue.len())
            .finish()
    }
}
