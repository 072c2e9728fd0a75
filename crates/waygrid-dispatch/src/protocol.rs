//! Messages exchanged with the navigator worker.
//!
//! Each message is a self-contained value; nothing mutable is shared across
//! the thread boundary. Encoded as JSON, every message is one envelope:
//!
//! ```json
//! { "event": "createTask", "payload": { "id": 1, "from": {"x":0,"y":0}, "to": {"x":9,"y":9} } }
//! ```

use serde::{Deserialize, Serialize};
use waygrid_core::Point;
use waygrid_paths::TaskId;

use crate::error::DispatchError;

/// Facade → worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum Request {
    CreateTask { id: TaskId, from: Point, to: Point },
    CancelTask { id: TaskId },
    /// `cost: None` resets the cell to the default cost.
    UpdatePointCost { position: Point, cost: Option<f64> },
}

/// Worker → facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum Response {
    CompleteTask { id: TaskId, result: TaskResult },
}

/// Outcome of one task; `path` is `None` (and `cost` zero) when the
/// destination cannot be reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub path: Option<Vec<Point>>,
    pub cost: f64,
}

impl Request {
    pub fn to_json(&self) -> Result<String, DispatchError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Response {
    pub fn to_json(&self) -> Result<String, DispatchError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self, DispatchError> {
        Ok(serde_json::from_str(s)?)
    }
}
