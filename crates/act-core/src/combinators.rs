//! Composite and adapter acts.
//!
//! Every combinator owns its children exclusively, forwards at most one child step per parent
//! step and latches its own terminal status: stepping a finished combinator again returns the
//! latched status without touching any child.

use crate::{Act, ActOutcome, ActStatus, Blackboard, TickContext, WorldMut};

/// Run children in order.
///
/// A child's `Success` moves the cursor; the next child is first stepped on the following tick,
/// so two children never advance within one parent step. The sequence succeeds on the step its
/// last child succeeds and fails on the step any child fails.
pub struct Sequence<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Box<dyn Act<W>>>,
    index: usize,
    finished: Option<ActOutcome>,
}

impl<W> Sequence<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Box<dyn Act<W>>>) -> Self {
        Self {
            children,
            index: 0,
            finished: None,
        }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }
}

impl<W> Act<W> for Sequence<W>
where
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> ActStatus {
        if let Some(done) = self.finished {
            return done.into();
        }

        let Some(child) = self.children.get_mut(self.index) else {
            self.finished = Some(ActOutcome::Success);
            return ActStatus::Success;
        };

        match child.tick(ctx, agent, world, blackboard) {
            ActStatus::Running => ActStatus::Running,
            ActStatus::Failure => {
                self.finished = Some(ActOutcome::Failure);
                ActStatus::Failure
            }
            ActStatus::Success => {
                self.index += 1;
                if self.index >= self.children.len() {
                    self.finished = Some(ActOutcome::Success);
                    ActStatus::Success
                } else {
                    ActStatus::Running
                }
            }
        }
    }

    fn cancel(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) {
        if self.finished.is_some() {
            return;
        }
        if let Some(child) = self.children.get_mut(self.index) {
            child.cancel(ctx, agent, world, blackboard);
        }
    }

    fn name(&self) -> &str {
        match self.children.get(self.index) {
            Some(child) if self.finished.is_none() => child.name(),
            _ => "sequence",
        }
    }
}

/// Adapt a stateful step closure into an act.
///
/// The closure is called once per tick until it answers a terminal status. This is the way to
/// splice one-off side effects (re-queue an order, drop a marker) into a tree without writing a
/// dedicated leaf type.
pub struct Wrap<F> {
    name: &'static str,
    step: F,
    finished: Option<ActOutcome>,
}

impl<F> Wrap<F> {
    pub fn new(name: &'static str, step: F) -> Self {
        Self {
            name,
            step,
            finished: None,
        }
    }
}

impl<F, W> Act<W> for Wrap<F>
where
    F: FnMut(&TickContext, W::Agent, &mut W, &mut Blackboard) -> ActStatus + 'static,
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> ActStatus {
        if let Some(done) = self.finished {
            return done.into();
        }
        let status = (self.step)(ctx, agent, world, blackboard);
        self.finished = status.outcome();
        status
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Instant check: `Success` when the predicate holds, `Failure` otherwise.
pub struct Condition<F> {
    name: &'static str,
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(name: &'static str, cond: F) -> Self {
        Self { name, cond }
    }
}

impl<F, W> Act<W> for Condition<F>
where
    F: FnMut(&TickContext, W::Agent, &W, &Blackboard) -> bool + 'static,
    W: WorldMut + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &mut W,
        blackboard: &mut Blackboard,
    ) -> ActStatus {
        if (self.cond)(ctx, agent, &*world, &*blackboard) {
            ActStatus::Success
        } else {
            ActStatus::Failure
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}
