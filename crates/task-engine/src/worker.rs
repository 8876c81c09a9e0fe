//! Per-agent execution loop.

use act_core::{ActRunner, ActStatus, AgentId, Blackboard, TickContext, WorldMut};

use crate::{
    drain_spawned, Announcer, BindingState, DeleteKind, DeleteReason, EventSink, TaskBroker,
    TaskEvent, TaskEventKind, TaskId, TaskPriority,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerConfig {
    pub recheck_every_ticks: u32,
    pub recheck_offset_ticks: u32,
    pub priority_floor: TaskPriority,
    pub max_consecutive_retries: Option<u32>,
    pub announce_cancellations: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            recheck_every_ticks: 1,
            recheck_offset_ticks: 0,
            priority_floor: TaskPriority::Eventually,
            max_consecutive_retries: Some(8),
            announce_cancellations: true,
        }
    }
}

impl WorkerConfig {
    pub fn staggered(agent: impl AgentId, recheck_every_ticks: u32) -> Self {
        let every = recheck_every_ticks.max(1);
        let offset = (agent.stable_id() % (every as u64)) as u32;
        Self {
            recheck_every_ticks: every,
            recheck_offset_ticks: offset,
            ..Self::default()
        }
    }

    pub fn should_recheck(&self, tick: u64) -> bool {
        let every = self.recheck_every_ticks.max(1) as u64;
        ((tick + (self.recheck_offset_ticks as u64)) % every) == 0
    }
}

/// Where a worker reports what it did.
pub struct Sinks<'a> {
    pub announcer: &'a mut dyn Announcer,
    pub events: &'a mut dyn EventSink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    task: TaskId,
    retries: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    ActFailed,
    CompileFailed,
    Infeasible,
}

/// Drives one agent: holds at most one bound task and at most one compiled act for it.
///
/// Each tick the worker, in order:
/// 1. drops its task if the broker cancelled or removed it,
/// 2. re-checks feasibility of a running task (on the configured cadence) and treats a `false`
///    as an out-of-band failure,
/// 3. asks the broker for work when idle,
/// 4. compiles the task if no act is live,
/// 5. steps the act once and applies the success/retry/delete policy to a terminal result.
pub struct Worker<W>
where
    W: WorldMut + 'static,
{
    pub agent: W::Agent,
    pub config: WorkerConfig,
    pub blackboard: Blackboard,
    pub acts: ActRunner<W>,
    binding: Option<Binding>,
}

impl<W> Worker<W>
where
    W: WorldMut + 'static,
{
    pub fn new(agent: W::Agent) -> Self {
        Self {
            agent,
            config: WorkerConfig::default(),
            blackboard: Blackboard::new(),
            acts: ActRunner::default(),
            binding: None,
        }
    }

    pub fn with_config(mut self, config: WorkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn current_task(&self) -> Option<TaskId> {
        self.binding.map(|b| b.task)
    }

    pub fn is_idle(&self) -> bool {
        self.binding.is_none()
    }

    /// Consecutive failed runs of the current task.
    pub fn retries(&self) -> u32 {
        self.binding.map(|b| b.retries).unwrap_or(0)
    }

    pub fn tick(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
    ) {
        if !self.observe_binding(ctx, world, broker, sinks) {
            return;
        }

        if let Some(binding) = self.binding {
            if self.acts.is_running() && self.config.should_recheck(ctx.tick) {
                let feasible = broker
                    .task(binding.task)
                    .is_some_and(|t| t.is_feasible(self.agent, &*world));
                if !feasible {
                    self.acts
                        .cancel_current(ctx, self.agent, world, &mut self.blackboard);
                    self.emit(ctx, broker, sinks, binding.task, TaskEventKind::Infeasible);
                    self.handle_failure(ctx, world, broker, sinks, Failure::Infeasible);
                    return;
                }
            }
        }

        if self.binding.is_none() {
            let Some(assignment) =
                broker.assign_best(self.agent, &*world, self.config.priority_floor)
            else {
                return;
            };
            self.binding = Some(Binding {
                task: assignment.task,
                retries: 0,
            });
            self.emit(
                ctx,
                broker,
                sinks,
                assignment.task,
                TaskEventKind::Assigned {
                    cost: assignment.cost,
                },
            );
        }

        if !self.acts.is_running() && !self.compile(ctx, world, broker, sinks) {
            self.handle_failure(ctx, world, broker, sinks, Failure::CompileFailed);
            return;
        }

        let status = self.acts.tick(ctx, self.agent, world, &mut self.blackboard);
        self.flush_spawned(ctx, broker, sinks);

        match status {
            Some(ActStatus::Success) => self.handle_success(ctx, broker, sinks),
            Some(ActStatus::Failure) => {
                self.handle_failure(ctx, world, broker, sinks, Failure::ActFailed)
            }
            Some(ActStatus::Running) | None => {}
        }
    }

    /// Stop working on the current task without touching the broker.
    ///
    /// Returns the task the agent was bound to; the caller is responsible for releasing it.
    pub fn abandon(&mut self, ctx: &TickContext, world: &mut W) -> Option<TaskId> {
        self.acts
            .cancel_current(ctx, self.agent, world, &mut self.blackboard);
        self.blackboard.clear();
        self.binding.take().map(|b| b.task)
    }

    /// Returns `false` when the binding was dropped this tick.
    fn observe_binding(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
    ) -> bool {
        let Some(binding) = self.binding else {
            return true;
        };

        match broker.binding_state(binding.task, self.agent) {
            BindingState::Active => true,
            BindingState::Cancelled => {
                self.emit(ctx, broker, sinks, binding.task, TaskEventKind::Cancelled);
                self.abandon(ctx, world);
                if let Err(err) = broker.release(binding.task, self.agent) {
                    tracing::warn!(agent = self.agent.stable_id(), error = %err, "Failed to release cancelled task");
                }
                tracing::debug!(agent = self.agent.stable_id(), task = %binding.task, "Stopped cancelled task");
                false
            }
            BindingState::Missing => {
                sinks.events.emit(TaskEvent {
                    tick: ctx.tick,
                    agent: self.agent.stable_id(),
                    task: binding.task,
                    task_name: String::new(),
                    kind: TaskEventKind::Dropped,
                });
                self.abandon(ctx, world);
                tracing::debug!(agent = self.agent.stable_id(), task = %binding.task, "Task left the broker");
                false
            }
        }
    }

    /// Compile the bound task into a fresh act. Returns `false` on a compile error.
    fn compile(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
    ) -> bool {
        let Some(binding) = self.binding else {
            return false;
        };
        let Some(task) = broker.task(binding.task) else {
            return false;
        };

        self.blackboard.clear();
        match task.create_script(ctx, self.agent, &*world) {
            Ok(act) => {
                let kind = TaskEventKind::Compiled {
                    act: act.name().to_string(),
                };
                self.acts
                    .replace_current(act, ctx, self.agent, world, &mut self.blackboard);
                self.emit(ctx, broker, sinks, binding.task, kind);
                true
            }
            Err(err) => {
                tracing::debug!(
                    agent = self.agent.stable_id(),
                    task = %binding.task,
                    error = %err,
                    "Task failed to compile"
                );
                self.emit(
                    ctx,
                    broker,
                    sinks,
                    binding.task,
                    TaskEventKind::CompileFailed {
                        error: err.to_string(),
                    },
                );
                false
            }
        }
    }

    fn handle_success(
        &mut self,
        ctx: &TickContext,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
    ) {
        let Some(binding) = self.binding.take() else {
            return;
        };
        self.emit(ctx, broker, sinks, binding.task, TaskEventKind::Completed);
        self.blackboard.clear();
        match broker.complete(binding.task, self.agent) {
            Ok(task) => tracing::debug!(
                agent = self.agent.stable_id(),
                task = %binding.task,
                name = task.name(),
                "Task completed"
            ),
            Err(err) => tracing::warn!(agent = self.agent.stable_id(), error = %err, "Completed task was not held"),
        }
    }

    /// Apply the delete/retry policy after a failed, uncompilable, or infeasible run.
    fn handle_failure(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
        failure: Failure,
    ) {
        let Some(mut binding) = self.binding else {
            return;
        };
        let Some(task) = broker.task(binding.task) else {
            self.abandon(ctx, world);
            return;
        };

        if failure == Failure::ActFailed {
            self.emit(ctx, broker, sinks, binding.task, TaskEventKind::Failed);
        }

        let world_view: &W = &*world;
        let delete = task.should_delete(self.agent, world_view);
        let retry = delete.is_none() && task.auto_retry() && task.should_retry(self.agent, world_view);
        let multi_agent = task.max_assignees() > 1;

        if let Some(reason) = delete {
            self.delete(ctx, world, broker, sinks, binding.task, reason);
            return;
        }

        if !retry {
            self.emit(ctx, broker, sinks, binding.task, TaskEventKind::Discarded);
            self.abandon(ctx, world);
            if let Err(err) = broker.discard(binding.task, self.agent) {
                tracing::warn!(agent = self.agent.stable_id(), error = %err, "Failed to discard task");
            }
            return;
        }

        // Crew tasks go back to the pool between attempts, so their count lives in the broker.
        let attempts = if multi_agent {
            broker.failures(binding.task)
        } else {
            binding.retries
        };
        if self
            .config
            .max_consecutive_retries
            .is_some_and(|max| attempts >= max)
        {
            tracing::warn!(
                agent = self.agent.stable_id(),
                task = %binding.task,
                retries = attempts,
                "Retry budget exhausted"
            );
            self.delete(
                ctx,
                world,
                broker,
                sinks,
                binding.task,
                DeleteReason::new(DeleteKind::RetriesExhausted),
            );
            return;
        }

        if multi_agent {
            self.emit(ctx, broker, sinks, binding.task, TaskEventKind::Returned);
            self.abandon(ctx, world);
            if let Err(err) = broker.release_failed(binding.task, self.agent) {
                tracing::warn!(agent = self.agent.stable_id(), error = %err, "Failed to return task to pool");
            }
            return;
        }

        binding.retries += 1;
        self.binding = Some(binding);
        self.emit(
            ctx,
            broker,
            sinks,
            binding.task,
            TaskEventKind::Retried {
                attempt: binding.retries,
            },
        );
        // A compile error would fail again immediately; leave it for the next tick.
        if failure != Failure::CompileFailed && !self.compile(ctx, world, broker, sinks) {
            tracing::debug!(
                agent = self.agent.stable_id(),
                task = %binding.task,
                "Recompile failed, retrying next tick"
            );
        }
    }

    fn delete(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
        task: TaskId,
        reason: DeleteReason,
    ) {
        self.emit(
            ctx,
            broker,
            sinks,
            task,
            TaskEventKind::Deleted { reason: reason.kind },
        );
        if self.config.announce_cancellations {
            if let Some(message) = reason.announcement() {
                sinks.announcer.announce(message);
            }
        }
        tracing::info!(
            agent = self.agent.stable_id(),
            task = %task,
            reason = ?reason.kind,
            "Task deleted"
        );
        self.abandon(ctx, world);
        if let Err(err) = broker.discard(task, self.agent) {
            tracing::warn!(agent = self.agent.stable_id(), error = %err, "Failed to delete task");
        }
    }

    fn flush_spawned(
        &mut self,
        ctx: &TickContext,
        broker: &mut TaskBroker<W>,
        sinks: &mut Sinks<'_>,
    ) {
        let spawned = drain_spawned::<W>(&mut self.blackboard);
        if spawned.is_empty() {
            return;
        }
        let parent = self.binding.map(|b| b.task);
        for task in spawned {
            let child = broker.enqueue(task);
            if let Some(parent) = parent {
                self.emit(ctx, broker, sinks, parent, TaskEventKind::Spawned { child });
            }
        }
    }

    fn emit(
        &self,
        ctx: &TickContext,
        broker: &TaskBroker<W>,
        sinks: &mut Sinks<'_>,
        task: TaskId,
        kind: TaskEventKind,
    ) {
        let task_name = broker
            .task(task)
            .map(|t| t.name().to_string())
            .unwrap_or_default();
        sinks.events.emit(TaskEvent {
            tick: ctx.tick,
            agent: self.agent.stable_id(),
            task,
            task_name,
            kind,
        });
    }
}
