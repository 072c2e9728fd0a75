//! In-process deployment.

use std::time::Instant;

use waygrid_core::{Point, Range};
use waygrid_paths::{CostGrid, Navigator, TaskCallback, TaskId};

use crate::config::NavigatorConfig;
use crate::dispatcher::{Dispatcher, IdSource};
use crate::error::DispatchError;

/// Navigator that solves on the caller's thread.
///
/// The host calls [`update`](Self::update) from its own loop every tick;
/// the queue is only drained once per `solve_interval`, so the cost of
/// pathfinding is paid at a bounded cadence instead of every frame. A task
/// runs to completion once selected; there is no preemption.
pub struct LocalNavigator {
    navigator: Navigator,
    config: NavigatorConfig,
    ids: IdSource,
    last_pass: Option<Instant>,
}

impl LocalNavigator {
    pub fn new(grid: CostGrid, config: NavigatorConfig) -> Self {
        Self {
            navigator: Navigator::new(grid),
            config,
            ids: IdSource::new(),
            last_pass: None,
        }
    }

    /// The underlying solver.
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Number of tasks waiting for the next pass.
    pub fn pending(&self) -> usize {
        self.navigator.pending()
    }

    /// Run a solver pass if at least `solve_interval` has elapsed since the
    /// previous one. Returns the number of tasks resolved.
    pub fn update(&mut self, now: Instant) -> usize {
        if let Some(last) = self.last_pass {
            if now.saturating_duration_since(last) < self.config.solve_interval {
                return 0;
            }
        }
        self.last_pass = Some(now);
        self.flush()
    }

    /// Run a solver pass now, ignoring the interval.
    pub fn flush(&mut self) -> usize {
        let resolved = self.navigator.process();
        if resolved > 0 {
            log::trace!("solver pass resolved {resolved} tasks");
        }
        resolved
    }
}

impl Dispatcher for LocalNavigator {
    fn create_task(&mut self, from: Point, to: Point, callback: TaskCallback) -> TaskId {
        let navigator = &self.navigator;
        let id = self.ids.next(|id| navigator.has_task(id));
        self.navigator.create_task(id, from, to, callback)
    }

    fn create_task_with_id(
        &mut self,
        id: TaskId,
        from: Point,
        to: Point,
        callback: TaskCallback,
    ) -> Result<TaskId, DispatchError> {
        if self.navigator.has_task(id) {
            return Err(DispatchError::DuplicateTask(id));
        }
        Ok(self.navigator.create_task(id, from, to, callback))
    }

    fn cancel_task(&mut self, id: TaskId) {
        if !self.navigator.cancel(id) {
            log::trace!("cancel ignored: no pending task {id}");
        }
    }

    fn set_point_cost(&mut self, position: Point, cost: f64) {
        self.navigator.grid_mut().set_cost(position, cost);
    }

    fn reset_point_cost(&mut self, position: Point) {
        self.navigator.grid_mut().reset_cost(position);
    }

    fn reset_points_cost(&mut self) {
        self.navigator.grid_mut().reset_all();
    }

    fn point_cost(&self, position: Point) -> f64 {
        self.navigator.grid().cost_of(position)
    }

    fn is_walkable(&self, position: Point) -> bool {
        self.navigator.grid().is_walkable(position)
    }

    fn range(&self) -> Range {
        self.navigator.grid().range()
    }

    fn config(&self) -> &NavigatorConfig {
        &self.config
    }
}
