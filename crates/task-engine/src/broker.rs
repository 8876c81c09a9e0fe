//! Broker - owns the task pool and hands out the best task to agents asking for work.

use std::collections::BTreeMap;

use act_core::{AgentId, WorldMut};

use crate::{BrokerError, Task, TaskId, TaskPriority, INFEASIBLE_COST};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordState {
    Active,
    Cancelled,
}

struct TaskRecord<W>
where
    W: WorldMut + 'static,
{
    task: Box<dyn Task<W>>,
    assignees: Vec<W::Agent>,
    state: RecordState,
    /// Failed runs since the task was enqueued, across every agent that held it.
    failures: u32,
}

impl<W> TaskRecord<W>
where
    W: WorldMut + 'static,
{
    fn is_pooled(&self) -> bool {
        self.state == RecordState::Active && self.assignees.len() < self.task.max_assignees().max(1)
    }
}

/// A task handed to an agent by [`TaskBroker::assign_best`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub task: TaskId,
    pub cost: f32,
}

/// What a bound agent should do with its task this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Keep working.
    Active,
    /// Someone cancelled the task; stop and release it.
    Cancelled,
    /// The task left the broker (finished by a co-worker, or discarded).
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The task was waiting in the pool and is gone.
    Removed,
    /// Agents are working on it; they stop on their next step.
    Flagged,
}

/// The world-wide pool of outstanding tasks.
///
/// Records are keyed by a monotonically increasing [`TaskId`], which doubles as the FIFO
/// tie-breaker when two candidates have the same priority and cost.
pub struct TaskBroker<W>
where
    W: WorldMut + 'static,
{
    records: BTreeMap<TaskId, TaskRecord<W>>,
    next_id: u64,
}

impl<W> Default for TaskBroker<W>
where
    W: WorldMut + 'static,
{
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<W> TaskBroker<W>
where
    W: WorldMut + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, task: Box<dyn Task<W>>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        tracing::debug!(task = %id, name = task.name(), priority = ?task.priority(), "Task enqueued");
        self.records.insert(
            id,
            TaskRecord {
                task,
                assignees: Vec::new(),
                state: RecordState::Active,
                failures: 0,
            },
        );
        id
    }

    /// Number of tracked tasks, pooled or assigned.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn task(&self, id: TaskId) -> Option<&dyn Task<W>> {
        self.records.get(&id).map(|r| r.task.as_ref())
    }

    pub fn is_pooled(&self, id: TaskId) -> bool {
        self.records.get(&id).is_some_and(|r| r.is_pooled())
    }

    /// Tasks that can still take an agent, in id order.
    pub fn pooled(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.records
            .iter()
            .filter(|(_, r)| r.is_pooled())
            .map(|(id, _)| *id)
    }

    pub fn assignees(&self, id: TaskId) -> &[W::Agent] {
        self.records
            .get(&id)
            .map(|r| r.assignees.as_slice())
            .unwrap_or(&[])
    }

    /// Failed runs recorded through [`TaskBroker::release_failed`].
    pub fn failures(&self, id: TaskId) -> u32 {
        self.records.get(&id).map_or(0, |r| r.failures)
    }

    pub fn binding_state(&self, id: TaskId, agent: W::Agent) -> BindingState {
        match self.records.get(&id) {
            Some(r) if !r.assignees.contains(&agent) => BindingState::Missing,
            Some(r) if r.state == RecordState::Cancelled => BindingState::Cancelled,
            Some(_) => BindingState::Active,
            None => BindingState::Missing,
        }
    }

    /// Pick the best pooled task for `agent` and bind it.
    ///
    /// Candidates below `floor` or infeasible for this agent are skipped. The highest priority
    /// tier wins; within a tier the lowest cost wins; remaining ties go to the oldest task.
    pub fn assign_best(
        &mut self,
        agent: W::Agent,
        world: &W,
        floor: TaskPriority,
    ) -> Option<Assignment> {
        let mut best: Option<(TaskPriority, f32, TaskId)> = None;

        for (id, record) in &self.records {
            if !record.is_pooled() || record.assignees.contains(&agent) {
                continue;
            }
            let priority = record.task.priority();
            if priority < floor {
                continue;
            }
            if !record.task.is_feasible(agent, world) {
                continue;
            }

            let cost = record.task.compute_cost(agent, world, true);
            let cost = if cost.is_nan() {
                INFEASIBLE_COST
            } else {
                cost.max(0.0)
            };

            let better = match best {
                None => true,
                Some((best_priority, best_cost, _)) => {
                    priority > best_priority || (priority == best_priority && cost < best_cost)
                }
            };
            if better {
                best = Some((priority, cost, *id));
            }
        }

        let (_, cost, id) = best?;
        let record = self.records.get_mut(&id)?;
        record.assignees.push(agent);
        tracing::debug!(
            task = %id,
            agent = agent.stable_id(),
            cost,
            "Task assigned"
        );
        Some(Assignment { task: id, cost })
    }

    /// Cancel a task. Pooled tasks disappear at once; assigned ones are flagged and removed once
    /// every assignee has released them.
    pub fn cancel(&mut self, id: TaskId) -> Result<CancelOutcome, BrokerError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(BrokerError::UnknownTask(id))?;

        if record.assignees.is_empty() {
            self.records.remove(&id);
            tracing::debug!(task = %id, "Pooled task cancelled");
            return Ok(CancelOutcome::Removed);
        }

        record.state = RecordState::Cancelled;
        tracing::debug!(task = %id, assignees = record.assignees.len(), "Assigned task flagged for cancellation");
        Ok(CancelOutcome::Flagged)
    }

    /// The agent finished the task; it leaves the broker for good.
    pub fn complete(&mut self, id: TaskId, agent: W::Agent) -> Result<Box<dyn Task<W>>, BrokerError> {
        self.take_assigned(id, agent)
    }

    /// The task was abandoned; it leaves the broker for good.
    pub fn discard(&mut self, id: TaskId, agent: W::Agent) -> Result<Box<dyn Task<W>>, BrokerError> {
        self.take_assigned(id, agent)
    }

    /// Drop `agent` from the task's assignees.
    ///
    /// An active task becomes available again; a cancelled one is removed once nobody holds it.
    pub fn release(&mut self, id: TaskId, agent: W::Agent) -> Result<(), BrokerError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(BrokerError::UnknownTask(id))?;
        let Some(pos) = record.assignees.iter().position(|a| *a == agent) else {
            return Err(BrokerError::NotAssigned {
                task: id,
                agent: agent.stable_id(),
            });
        };
        record.assignees.remove(pos);

        if record.state == RecordState::Cancelled && record.assignees.is_empty() {
            self.records.remove(&id);
        }
        Ok(())
    }

    /// Like [`TaskBroker::release`], counting a failed run against the task. Returns the new
    /// failure count.
    pub fn release_failed(&mut self, id: TaskId, agent: W::Agent) -> Result<u32, BrokerError> {
        let failures = {
            let record = self
                .records
                .get_mut(&id)
                .ok_or(BrokerError::UnknownTask(id))?;
            if !record.assignees.contains(&agent) {
                return Err(BrokerError::NotAssigned {
                    task: id,
                    agent: agent.stable_id(),
                });
            }
            record.failures += 1;
            record.failures
        };
        self.release(id, agent)?;
        Ok(failures)
    }

    fn take_assigned(&mut self, id: TaskId, agent: W::Agent) -> Result<Box<dyn Task<W>>, BrokerError> {
        let record = self.records.get(&id).ok_or(BrokerError::UnknownTask(id))?;
        if !record.assignees.contains(&agent) {
            return Err(BrokerError::NotAssigned {
                task: id,
                agent: agent.stable_id(),
            });
        }
        self.records
            .remove(&id)
            .map(|r| r.task)
            .ok_or(BrokerError::UnknownTask(id))
    }
}
