//! Headless simulation loop.

use act_core::TickContext;
use anyhow::Result;
use colony_tasks::{Colony, ResourceAmount};
use task_engine::{
    Announcer, EngineConfig, EventSink, JsonlEventSink, Sinks, TaskEvent, TaskEventKind,
    TaskScheduler,
};

use crate::Scenario;

/// Simulated seconds per tick.
const TICK_SECONDS: f32 = 0.1;

/// Keeps announcements for the report and forwards them to the log.
#[derive(Debug, Default)]
struct RecordingAnnouncer {
    messages: Vec<String>,
}

impl Announcer for RecordingAnnouncer {
    fn announce(&mut self, message: &str) {
        tracing::info!(target: "announcements", "{message}");
        self.messages.push(message.to_string());
    }
}

/// Counts outcomes and streams every event to the log file, if one is configured.
#[derive(Default)]
struct TallySink {
    completed: usize,
    deleted: usize,
    written: usize,
    log: Option<JsonlEventSink>,
}

impl EventSink for TallySink {
    fn emit(&mut self, event: TaskEvent) {
        match event.kind {
            TaskEventKind::Completed => self.completed += 1,
            TaskEventKind::Deleted { .. } => self.deleted += 1,
            _ => {}
        }
        if let Some(log) = self.log.as_mut() {
            log.emit(event);
            self.written += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub ticks: u64,
    pub completed: usize,
    pub deleted: usize,
    /// Tasks still in the pool (or held) when the run stopped.
    pub outstanding: usize,
    pub announcements: Vec<String>,
    pub stock: Vec<ResourceAmount>,
    pub built: usize,
}

/// Run a scenario until the pool drains or the tick budget runs out.
pub fn run(scenario: &Scenario, config: &EngineConfig, max_ticks: Option<u64>) -> Result<RunReport> {
    let built = scenario.build()?;
    let mut colony: Colony = built.colony;

    let mut scheduler = TaskScheduler::new(config.clone());
    for agent in &built.agents {
        scheduler.add_agent(*agent);
    }
    for task in built.tasks {
        scheduler.enqueue(task);
    }

    let max_ticks = max_ticks.unwrap_or(scenario.ticks);
    tracing::info!(
        agents = built.agents.len(),
        tasks = scheduler.broker().len(),
        max_ticks,
        "Starting simulation"
    );

    let mut announcer = RecordingAnnouncer::default();
    let mut events = TallySink::default();
    if let Some(path) = &config.event_log {
        events.log = Some(JsonlEventSink::create(path)?);
    }

    let mut tick = 0;
    while tick < max_ticks && !scheduler.broker().is_empty() {
        let ctx = TickContext::new(tick, TICK_SECONDS);
        let mut sinks = Sinks {
            announcer: &mut announcer,
            events: &mut events,
        };
        scheduler.tick_with(&ctx, &mut colony, &mut sinks);
        tick += 1;
    }

    if let Some(log) = events.log.as_mut() {
        log.flush()?;
        tracing::info!(path = %log.path().display(), events = events.written, "Wrote event log");
    }

    let report = RunReport {
        ticks: tick,
        completed: events.completed,
        deleted: events.deleted,
        outstanding: scheduler.broker().len(),
        announcements: announcer.messages,
        stock: colony.stock_levels(),
        built: colony.built().len(),
    };
    tracing::info!(
        ticks = report.ticks,
        completed = report.completed,
        outstanding = report.outstanding,
        "Simulation finished"
    );
    Ok(report)
}
