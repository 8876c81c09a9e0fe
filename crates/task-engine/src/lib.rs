//! Task engine - matches pooled work to agents and drives it tick by tick.
//!
//! This crate provides the task contract (feasibility, cost, retry/delete policy, script
//! compilation), the broker that owns the task pool, and the per-agent execution loop that steps
//! compiled acts and applies the retry/delete policy when they fail.

pub mod announce;
pub mod broker;
pub mod config;
pub mod error;
pub mod events;
pub mod outbox;
pub mod scheduler;
pub mod task;
pub mod worker;

pub use announce::{Announcer, LogAnnouncer, VecAnnouncer};
pub use broker::{Assignment, BindingState, CancelOutcome, TaskBroker};
pub use config::EngineConfig;
pub use error::{BrokerError, ScriptError};
pub use events::{EventSink, JsonlEventSink, NullEventSink, TaskEvent, TaskEventKind, VecEventSink};
pub use outbox::{drain_spawned, spawn_task};
pub use scheduler::TaskScheduler;
pub use task::{DeleteKind, DeleteReason, Task, TaskId, TaskPriority, INFEASIBLE_COST};
pub use worker::{Sinks, Worker, WorkerConfig};
