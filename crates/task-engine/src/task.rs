//! The task contract.

use std::fmt;

use act_core::{Act, TickContext, WorldMut};
use serde::{Deserialize, Serialize};

use crate::ScriptError;

/// Cost reported for work an agent cannot currently do.
///
/// Ranking treats "very expensive" and "infeasible" the same way, so no separate code path is
/// needed when a task cannot price itself.
pub const INFEASIBLE_COST: f32 = 10_000.0;

/// Broker-assigned identity of a pooled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Eventually,
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Why a task was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteKind {
    /// The target entity or voxel is gone or dead.
    TargetGone,
    /// The world-side designation backing the task was cleared.
    DesignationRemoved,
    /// The target moved out of range.
    OutOfRange,
    /// The stockpile no longer holds what the task needs.
    InsufficientResources,
    /// A required work location (bench, stove) is missing.
    MissingLocation,
    /// The task kept failing and exhausted its retry budget.
    RetriesExhausted,
}

impl DeleteKind {
    /// Resource and location problems are the only cancellations players are told about.
    pub fn is_user_visible(self) -> bool {
        matches!(
            self,
            DeleteKind::InsufficientResources | DeleteKind::MissingLocation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReason {
    pub kind: DeleteKind,
    announcement: Option<String>,
}

impl DeleteReason {
    pub fn new(kind: DeleteKind) -> Self {
        Self {
            kind,
            announcement: None,
        }
    }

    pub fn insufficient_resources(announcement: impl Into<String>) -> Self {
        Self {
            kind: DeleteKind::InsufficientResources,
            announcement: Some(announcement.into()),
        }
    }

    pub fn missing_location(announcement: impl Into<String>) -> Self {
        Self {
            kind: DeleteKind::MissingLocation,
            announcement: Some(announcement.into()),
        }
    }

    /// Announcement text, only for user-visible kinds.
    pub fn announcement(&self) -> Option<&str> {
        if self.kind.is_user_visible() {
            self.announcement.as_deref()
        } else {
            None
        }
    }
}

/// A declarative unit of work.
///
/// Implementations answer questions about who can do the work and at what cost, and compile
/// themselves into a fresh act tree on demand. They never execute logic themselves and hold no
/// cached feasibility verdict: every query is re-derived from the world.
pub trait Task<W>: 'static
where
    W: WorldMut + 'static,
{
    fn name(&self) -> &str;

    fn priority(&self) -> TaskPriority;

    /// Whether a failed run may be recompiled and retried at all.
    fn auto_retry(&self) -> bool {
        false
    }

    /// How many agents may work this task at once.
    fn max_assignees(&self) -> usize {
        1
    }

    /// Pure predicate; must not mutate anything.
    fn is_feasible(&self, agent: W::Agent, world: &W) -> bool;

    /// Non-negative effort estimate. Must return [`INFEASIBLE_COST`] whenever `is_feasible` would
    /// return false; `already_checked_feasible` lets callers skip the repeated check.
    fn compute_cost(&self, agent: W::Agent, world: &W, already_checked_feasible: bool) -> f32;

    /// Compile the intent into a single-use act tree.
    fn create_script(
        &self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
    ) -> Result<Box<dyn Act<W>>, ScriptError>;

    /// Consulted after a failed run (when `should_delete` said no).
    fn should_retry(&self, agent: W::Agent, world: &W) -> bool;

    /// `Some` abandons the task regardless of `auto_retry`.
    fn should_delete(&self, agent: W::Agent, world: &W) -> Option<DeleteReason>;

    /// Independent copy for re-queuing.
    fn clone_task(&self) -> Box<dyn Task<W>>;
}
