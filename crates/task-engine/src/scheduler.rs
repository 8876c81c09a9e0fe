//! Scheduler - owns the broker and every agent's execution loop and ticks them together.

use act_core::{AgentId, TickContext, WorldMut};

use crate::{
    Announcer, BrokerError, CancelOutcome, EngineConfig, EventSink, LogAnnouncer, NullEventSink,
    Sinks, Task, TaskBroker, TaskId, Worker,
};

pub struct TaskScheduler<W>
where
    W: WorldMut + 'static,
{
    config: EngineConfig,
    broker: TaskBroker<W>,
    workers: Vec<Worker<W>>,
    announcer: Box<dyn Announcer>,
    events: Box<dyn EventSink>,
}

impl<W> TaskScheduler<W>
where
    W: WorldMut + 'static,
{
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            broker: TaskBroker::new(),
            workers: Vec::new(),
            announcer: Box::new(LogAnnouncer),
            events: Box::new(NullEventSink),
        }
    }

    pub fn with_announcer(mut self, announcer: Box<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    pub fn with_event_sink(mut self, events: Box<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn broker(&self) -> &TaskBroker<W> {
        &self.broker
    }

    pub fn broker_mut(&mut self) -> &mut TaskBroker<W> {
        &mut self.broker
    }

    /// Register an agent. Registering the same agent twice is a no-op.
    pub fn add_agent(&mut self, agent: W::Agent) -> &mut Worker<W> {
        let index = match self.workers.binary_search_by(|w| w.agent.cmp(&agent)) {
            Ok(index) => index,
            Err(index) => {
                let worker = Worker::new(agent).with_config(self.config.worker_config(agent));
                self.workers.insert(index, worker);
                index
            }
        };
        &mut self.workers[index]
    }

    /// Unregister an agent, cancelling its act and handing its task back to the pool.
    pub fn remove_agent(&mut self, ctx: &TickContext, world: &mut W, agent: W::Agent) -> bool {
        let Ok(index) = self.workers.binary_search_by(|w| w.agent.cmp(&agent)) else {
            return false;
        };
        let mut worker = self.workers.remove(index);
        if let Some(task) = worker.abandon(ctx, world) {
            if let Err(err) = self.broker.release(task, agent) {
                tracing::warn!(agent = agent.stable_id(), error = %err, "Failed to release task of removed agent");
            }
        }
        true
    }

    pub fn worker(&self, agent: W::Agent) -> Option<&Worker<W>> {
        self.workers
            .binary_search_by(|w| w.agent.cmp(&agent))
            .ok()
            .map(|i| &self.workers[i])
    }

    pub fn workers(&self) -> &[Worker<W>] {
        &self.workers
    }

    pub fn enqueue(&mut self, task: Box<dyn Task<W>>) -> TaskId {
        self.broker.enqueue(task)
    }

    pub fn cancel(&mut self, id: TaskId) -> Result<CancelOutcome, BrokerError> {
        self.broker.cancel(id)
    }

    /// Step every agent once, in agent order, reporting to the scheduler's own sinks.
    pub fn tick(&mut self, ctx: &TickContext, world: &mut W) {
        let mut sinks = Sinks {
            announcer: self.announcer.as_mut(),
            events: self.events.as_mut(),
        };
        for worker in self.workers.iter_mut() {
            worker.tick(ctx, world, &mut self.broker, &mut sinks);
        }
    }

    /// Like [`TaskScheduler::tick`], reporting to caller-owned sinks instead.
    pub fn tick_with(&mut self, ctx: &TickContext, world: &mut W, sinks: &mut Sinks<'_>) {
        for worker in self.workers.iter_mut() {
            worker.tick(ctx, world, &mut self.broker, sinks);
        }
    }

    /// Agents currently bound to a task.
    pub fn busy_agents(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_idle()).count()
    }
}
