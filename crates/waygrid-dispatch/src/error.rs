use std::fmt;
use std::io;

use waygrid_paths::TaskId;

/// Errors surfaced by the dispatch layer.
///
/// Path outcomes are never errors: an unreachable destination is reported
/// through the task callback with a `None` path.
#[derive(Debug)]
pub enum DispatchError {
    /// A caller-supplied id is already in use by a pending task.
    DuplicateTask(TaskId),
    /// The worker thread could not be started.
    WorkerSpawn(io::Error),
    /// The worker thread has stopped; requests can no longer be delivered.
    WorkerGone,
    /// A message or configuration could not be encoded or decoded.
    Codec(serde_json::Error),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTask(id) => write!(f, "task {id} is already pending"),
            Self::WorkerSpawn(e) => write!(f, "failed to start navigator worker: {e}"),
            Self::WorkerGone => f.write_str("navigator worker is no longer running"),
            Self::Codec(e) => write!(f, "invalid navigator message: {e}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::WorkerSpawn(e) => Some(e),
            Self::Codec(e) => Some(e),
            Self::DuplicateTask(_) | Self::WorkerGone => None,
        }
    }
}

impl From<io::Error> for DispatchError {
    fn from(e: io::Error) -> Self {
        Self::WorkerSpawn(e)
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Codec(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_and_source() {
        let e = DispatchError::DuplicateTask(TaskId(5));
        assert_eq!(e.to_string(), "task #5 is already pending");
        assert!(e.source().is_none());

        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let e = DispatchError::from(json_err);
        assert!(matches!(e, DispatchError::Codec(_)));
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("invalid navigator message"));
    }
}
