use crate::{Blackboard, TickContext, WorldMut};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of stepping an act once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActStatus {
    Running,
    Success,
    Failure,
}

/// Terminal subset of [`ActStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ActOutcome {
    Success,
    Failure,
}

impl From<ActOutcome> for ActStatus {
    fn from(value: ActOutcome) -> Self {
        match value {
            ActOutcome::Success => ActStatus::Success,
            ActOutcome::Failure => ActStatus::Failure,
        }
    }
}

impl ActStatus {
    pub fn outcome(self) -> Option<ActOutcome> {
        match self {
            ActStatus::Running => None,
            ActStatus::Success => Some(ActOutcome::Success),
            ActStatus::Failure => Some(ActOutcome::Failure),
        }
    }

    pub fn is_terminal(self) -> bool {
        self != ActStatus::Running
    }
}

/// A resumable unit of behavior.
///
/// `tick` is called at most once per simulation tick. Side effects that were already committed
/// on an earlier tick must not be repeated while the act keeps answering `Running`. Once `tick`
/// returns a terminal status the act is dead: drivers drop it and never step it again.
pub trait Act<W>: 'static
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> ActStatus;

    /// Called when the act is dropped before reaching a terminal status.
    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &mut W,
        _blackboard: &mut Blackboard,
    ) {
    }

    /// Short label used in logs.
    fn name(&self) -> &str {
        "act"
    }
}

/// Holds at most one live act for an agent and enforces the terminal-state invariant.
pub struct ActRunner<W>
where
    W: WorldMut + 'static,
{
    current: Option<Box<dyn Act<W>>>,
}

impl<W> ActRunner<W>
where
    W: WorldMut + 'static,
{
    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|a| a.name())
    }

    /// Install a freshly compiled act, cancelling whatever was running before.
    pub fn replace_current(
        &mut self,
        act: Box<dyn Act<W>>,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        self.cancel_current(ctx, agent, world, blackboard);
        self.current = Some(act);
    }

    pub fn cancel_current(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        if let Some(mut current) = self.current.take() {
            current.cancel(ctx, agent, world, blackboard);
        }
    }

    /// Step the current act once. Returns `None` when idle.
    ///
    /// A terminal status drops the act before returning, so it can never be stepped twice.
    pub fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> Option<ActStatus> {
        let status = self.current.as_mut()?.tick(ctx, agent, world, blackboard);
        if status.is_terminal() {
            self.current = None;
        }
        Some(status)
    }
}

impl<W> Default for ActRunner<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self { current: None }
    }
}
