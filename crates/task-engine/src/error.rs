//! Error types for script compilation and broker bookkeeping.

use thiserror::Error;

use crate::TaskId;

/// A task could not be compiled into an act.
///
/// The execution loop treats this exactly like an act that failed on its first step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("task target {0} no longer exists")]
    MissingTarget(String),

    #[error("no location available: {0}")]
    NoLocation(String),

    #[error("invalid task state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("task {task} is not assigned to agent {agent}")]
    NotAssigned { task: TaskId, agent: u64 },
}
