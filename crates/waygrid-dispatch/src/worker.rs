//! Worker-thread deployment.
//!
//! The solver lives on its own thread and owns its own copy of the grid.
//! The facade and the worker exchange [`Request`] and [`Response`] values
//! over two channels; both sides keep their own state and nothing mutable
//! is shared.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use waygrid_core::{Point, Range};
use waygrid_paths::{CostGrid, Navigator, TaskCallback, TaskId, callback};

use crate::config::NavigatorConfig;
use crate::dispatcher::{Dispatcher, IdSource};
use crate::error::DispatchError;
use crate::protocol::{Request, Response, TaskResult};

/// Navigator whose solver runs on a dedicated thread.
///
/// Callbacks stay on the caller's side, keyed by task id, and run from
/// [`poll`](Self::poll) or [`wait`](Self::wait). A completion that arrives
/// for a task canceled in the meantime is dropped: the id is no longer in
/// the table.
///
/// The facade mirrors the cost overlay so that repeated cost updates with
/// the same value never reach the worker.
pub struct WorkerNavigator {
    tx: Option<Sender<Request>>,
    rx: Receiver<Response>,
    handle: Option<JoinHandle<()>>,
    grid: CostGrid,
    tasks: HashMap<TaskId, TaskCallback>,
    ids: IdSource,
    config: NavigatorConfig,
}

impl WorkerNavigator {
    /// Start the worker thread with a copy of `grid`.
    pub fn spawn(grid: CostGrid, config: NavigatorConfig) -> Result<Self, DispatchError> {
        let (req_tx, req_rx) = mpsc::channel();
        let (res_tx, res_rx) = mpsc::channel();
        let worker_grid = grid.clone();
        let interval = config.solve_interval;
        let handle = thread::Builder::new()
            .name(config.worker_name.clone())
            .spawn(move || run(worker_grid, &req_rx, &res_tx, interval))?;
        Ok(Self {
            tx: Some(req_tx),
            rx: res_rx,
            handle: Some(handle),
            grid,
            tasks: HashMap::new(),
            ids: IdSource::new(),
            config,
        })
    }

    /// Number of tasks whose result has not been delivered yet.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Deliver every result already received. Returns the number of
    /// callbacks invoked.
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;
        while let Ok(res) = self.rx.try_recv() {
            delivered += usize::from(self.deliver(res));
        }
        delivered
    }

    /// Block up to `timeout` for a result, then deliver it along with any
    /// others already received.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(res) => usize::from(self.deliver(res)) + self.poll(),
            Err(_) => 0,
        }
    }

    /// Stop the worker and wait for it to exit. Undelivered results are
    /// discarded.
    pub fn shutdown(mut self) -> Result<(), DispatchError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), DispatchError> {
        self.tx = None;
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| DispatchError::WorkerGone),
            None => Ok(()),
        }
    }

    fn deliver(&mut self, res: Response) -> bool {
        match res {
            Response::CompleteTask { id, result } => match self.tasks.remove(&id) {
                Some(cb) => {
                    cb(result.path, result.cost);
                    true
                }
                None => {
                    log::trace!("dropped completion for canceled task {id}");
                    false
                }
            },
        }
    }

    fn send(&self, req: Request) -> Result<(), DispatchError> {
        let tx = self.tx.as_ref().ok_or(DispatchError::WorkerGone)?;
        tx.send(req).map_err(|_| DispatchError::WorkerGone)
    }

    fn submit(
        &mut self,
        id: TaskId,
        from: Point,
        to: Point,
        callback: TaskCallback,
    ) -> Result<TaskId, DispatchError> {
        self.send(Request::CreateTask { id, from, to })?;
        self.tasks.insert(id, callback);
        Ok(id)
    }
}

impl Dispatcher for WorkerNavigator {
    fn create_task(&mut self, from: Point, to: Point, callback: TaskCallback) -> TaskId {
        let tasks = &self.tasks;
        let id = self.ids.next(|id| tasks.contains_key(&id));
        if let Err(e) = self.submit(id, from, to, callback) {
            log::warn!("task {id} not submitted: {e}");
        }
        id
    }

    fn create_task_with_id(
        &mut self,
        id: TaskId,
        from: Point,
        to: Point,
        callback: TaskCallback,
    ) -> Result<TaskId, DispatchError> {
        if self.tasks.contains_key(&id) {
            return Err(DispatchError::DuplicateTask(id));
        }
        self.submit(id, from, to, callback)
    }

    fn cancel_task(&mut self, id: TaskId) {
        if self.tasks.remove(&id).is_none() {
            log::trace!("cancel ignored: no pending task {id}");
            return;
        }
        if let Err(e) = self.send(Request::CancelTask { id }) {
            log::warn!("cancel of task {id} not sent: {e}");
        }
    }

    fn set_point_cost(&mut self, position: Point, cost: f64) {
        if !self.grid.set_cost(position, cost) {
            return;
        }
        let req = Request::UpdatePointCost {
            position,
            cost: Some(cost),
        };
        if let Err(e) = self.send(req) {
            log::warn!("cost update for {position} not sent: {e}");
        }
    }

    fn reset_point_cost(&mut self, position: Point) {
        if !self.grid.reset_cost(position) {
            return;
        }
        let req = Request::UpdatePointCost {
            position,
            cost: None,
        };
        if let Err(e) = self.send(req) {
            log::warn!("cost reset for {position} not sent: {e}");
        }
    }

    fn reset_points_cost(&mut self) {
        let cells: Vec<Point> = self.grid.overlay().map(|(p, _)| p).collect();
        for p in cells {
            self.reset_point_cost(p);
        }
    }

    fn point_cost(&self, position: Point) -> f64 {
        self.grid.cost_of(position)
    }

    fn is_walkable(&self, position: Point) -> bool {
        self.grid.is_walkable(position)
    }

    fn range(&self) -> Range {
        self.grid.range()
    }

    fn config(&self) -> &NavigatorConfig {
        &self.config
    }
}

impl Drop for WorkerNavigator {
    fn drop(&mut self) {
        if self.stop().is_err() {
            log::warn!("navigator worker panicked");
        }
    }
}

// ---------------------------------------------------------------------------
// Worker side
// ---------------------------------------------------------------------------

/// Worker loop: wait for a request, keep collecting requests until
/// `interval` has passed since the previous solver pass, then resolve the
/// whole queue. Exits when the facade hangs up.
fn run(grid: CostGrid, rx: &Receiver<Request>, tx: &Sender<Response>, interval: Duration) {
    log::debug!("navigator worker started on {}", grid.range());
    let mut nav = Navigator::new(grid);
    let mut last_pass: Option<Instant> = None;

    'serve: while let Ok(first) = rx.recv() {
        apply(&mut nav, tx, first);

        if let Some(last) = last_pass {
            let deadline = last + interval;
            loop {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                match rx.recv_timeout(deadline - now) {
                    Ok(req) => apply(&mut nav, tx, req),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => break 'serve,
                }
            }
        }

        loop {
            match rx.try_recv() {
                Ok(req) => apply(&mut nav, tx, req),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'serve,
            }
        }

        let resolved = nav.process();
        last_pass = Some(Instant::now());
        log::trace!("worker pass resolved {resolved} tasks");
    }

    log::debug!("navigator worker stopped");
}

fn apply(nav: &mut Navigator, tx: &Sender<Response>, req: Request) {
    match req {
        Request::CreateTask { id, from, to } => {
            let tx = tx.clone();
            nav.create_task(
                id,
                from,
                to,
                callback(move |path, cost| {
                    let res = Response::CompleteTask {
                        id,
                        result: TaskResult { path, cost },
                    };
                    if tx.send(res).is_err() {
                        log::trace!("result of task {id} dropped: facade gone");
                    }
                }),
            );
        }
        Request::CancelTask { id } => {
            nav.cancel(id);
        }
        Request::UpdatePointCost { position, cost } => match cost {
            Some(c) => {
                nav.grid_mut().set_cost(position, c);
            }
            None => {
                nav.grid_mut().reset_cost(position);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn spawn(grid: CostGrid) -> WorkerNavigator {
        WorkerNavigator::spawn(grid, NavigatorConfig::default().with_solve_interval(Duration::ZERO))
            .unwrap()
    }

    fn drain(nav: &mut WorkerNavigator) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while nav.pending() > 0 && Instant::now() < deadline {
            nav.wait(Duration::from_millis(20));
        }
        assert_eq!(nav.pending(), 0, "worker did not answer in time");
    }

    #[test]
    fn apply_translates_requests() {
        let (tx, rx) = mpsc::channel();
        let mut nav = Navigator::new(CostGrid::new(4, 4));
        apply(
            &mut nav,
            &tx,
            Request::UpdatePointCost {
                position: Point::new(1, 1),
                cost: Some(4.0),
            },
        );
        assert_eq!(nav.grid().cost_of(Point::new(1, 1)), 4.0);
        apply(
            &mut nav,
            &tx,
            Request::UpdatePointCost {
                position: Point::new(1, 1),
                cost: None,
            },
        );
        assert_eq!(nav.grid().overlay_len(), 0);

        apply(
            &mut nav,
            &tx,
            Request::CreateTask {
                id: TaskId(5),
                from: Point::ZERO,
                to: Point::new(0, 3),
            },
        );
        apply(
            &mut nav,
            &tx,
            Request::CreateTask {
                id: TaskId(6),
                from: Point::ZERO,
                to: Point::new(3, 0),
            },
        );
        apply(&mut nav, &tx, Request::CancelTask { id: TaskId(6) });
        assert_eq!(nav.process(), 1);

        let Ok(Response::CompleteTask { id, result }) = rx.try_recv() else {
            panic!("no completion sent");
        };
        assert_eq!(id, TaskId(5));
        assert_eq!(result.path.map(|p| p.len()), Some(4));
        assert_eq!(result.cost, 3.0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn round_trip_through_worker() {
        let mut nav = spawn(CostGrid::new(10, 10));
        let out = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&out);
        nav.create_task(
            Point::ZERO,
            Point::new(9, 9),
            callback(move |path, cost| *sink.borrow_mut() = Some((path, cost))),
        );
        drain(&mut nav);
        let (path, cost) = out.borrow_mut().take().unwrap();
        assert_eq!(path.unwrap().len(), 10);
        assert!((cost - 9.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
        nav.shutdown().unwrap();
    }

    #[test]
    fn stale_completion_is_filtered() {
        let mut nav = spawn(CostGrid::new(3, 3));
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);
        let id = nav.create_task(
            Point::ZERO,
            Point::new(2, 2),
            callback(move |_, _| *flag.borrow_mut() = true),
        );
        // Simulate the race: the worker finished before the cancel was seen.
        nav.tasks.remove(&id);
        let stale = Response::CompleteTask {
            id,
            result: TaskResult {
                path: Some(vec![Point::ZERO]),
                cost: 0.0,
            },
        };
        assert!(!nav.deliver(stale));
        assert!(!*called.borrow());
    }

    #[test]
    fn cancel_after_worker_answered_drops_result() {
        let mut nav = spawn(CostGrid::new(3, 3));
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let canceled = nav.create_task(
            Point::ZERO,
            Point::new(2, 2),
            callback(move |_, _| sink.borrow_mut().push("canceled")),
        );
        let sink = Rc::clone(&calls);
        nav.create_task(
            Point::ZERO,
            Point::new(2, 0),
            callback(move |_, _| sink.borrow_mut().push("kept")),
        );

        // Give the worker time to resolve both before the host cancels.
        thread::sleep(Duration::from_millis(200));
        nav.cancel_task(canceled);
        assert_eq!(nav.pending(), 1);

        // Completions arrive in creation order, so once the kept task is
        // delivered the canceled one has been through `poll` as well.
        let mut delivered = 0;
        let deadline = Instant::now() + Duration::from_secs(5);
        while nav.pending() > 0 && Instant::now() < deadline {
            delivered += nav.poll();
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(delivered, 1);
        assert_eq!(nav.poll(), 0);
        assert_eq!(*calls.borrow(), vec!["kept"]);
    }

    #[test]
    fn cancel_of_answered_task_alone_delivers_nothing() {
        let mut nav = spawn(CostGrid::new(3, 3));
        let called = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&called);
        let id = nav.create_task(
            Point::ZERO,
            Point::new(2, 2),
            callback(move |_, _| *flag.borrow_mut() = true),
        );
        thread::sleep(Duration::from_millis(200));
        nav.cancel_task(id);
        assert_eq!(nav.poll(), 0);
        assert_eq!(nav.wait(Duration::from_millis(50)), 0);
        assert!(!*called.borrow());
    }

    #[test]
    fn duplicate_cost_updates_are_not_resent() {
        let (tx, rx) = mpsc::channel();
        let (_res_tx, res_rx) = mpsc::channel();
        let mut nav = WorkerNavigator {
            tx: Some(tx),
            rx: res_rx,
            handle: None,
            grid: CostGrid::new(4, 4),
            tasks: HashMap::new(),
            ids: IdSource::new(),
            config: NavigatorConfig::default(),
        };
        let p = Point::new(2, 2);
        nav.set_point_cost(p, 3.0);
        nav.set_point_cost(p, 3.0);
        nav.reset_point_cost(p);
        nav.reset_point_cost(p);
        nav.set_point_cost(Point::new(0, 0), 1.0);

        let sent: Vec<Request> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![
                Request::UpdatePointCost {
                    position: p,
                    cost: Some(3.0)
                },
                Request::UpdatePointCost {
                    position: p,
                    cost: None
                },
            ]
        );
    }

    #[test]
    fn dead_worker_reports_gone() {
        let (tx, rx) = mpsc::channel::<Request>();
        drop(rx);
        let (_res_tx, res_rx) = mpsc::channel();
        let mut nav = WorkerNavigator {
            tx: Some(tx),
            rx: res_rx,
            handle: None,
            grid: CostGrid::new(2, 2),
            tasks: HashMap::new(),
            ids: IdSource::new(),
            config: NavigatorConfig::default(),
        };
        let err = nav
            .create_task_with_id(TaskId(1), Point::ZERO, Point::ZERO, callback(|_, _| {}))
            .unwrap_err();
        assert!(matches!(err, DispatchError::WorkerGone));
        assert_eq!(nav.pending(), 0);
    }
}
