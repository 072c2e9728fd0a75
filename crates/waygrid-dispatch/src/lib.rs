//! **waygrid-dispatch**: the boundary the rest of a game talks to.
//!
//! A host creates path tasks, cancels them and updates cell costs through
//! the [`Dispatcher`] trait. Two deployments implement it:
//!
//! - [`LocalNavigator`] runs the solver on the caller's thread, at most once
//!   per [`NavigatorConfig::solve_interval`].
//! - [`WorkerNavigator`] runs the solver on a dedicated thread and talks to
//!   it only through [`Request`] / [`Response`] messages, so pathfinding never
//!   blocks frame production. Results are delivered by
//!   [`WorkerNavigator::poll`].
//!
//! In both cases a callback is invoked later, never from inside
//! `create_task`, and never for a task that was canceled.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod local;
pub mod protocol;
pub mod worker;

pub use config::NavigatorConfig;
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use local::LocalNavigator;
pub use protocol::{Request, Response, TaskResult};
pub use worker::WorkerNavigator;

pub use waygrid_core::{Point, Range};
pub use waygrid_paths::{CostGrid, TaskCallback, TaskId, callback};
