//! Task lifecycle events for observability and replay tooling.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{DeleteKind, TaskId};

/// One transition in a task's life, as seen by the agent working it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub tick: u64,
    pub agent: u64,
    pub task: TaskId,
    pub task_name: String,
    #[serde(flatten)]
    pub kind: TaskEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEventKind {
    Assigned { cost: f32 },
    Compiled { act: String },
    CompileFailed { error: String },
    Completed,
    Failed,
    /// The periodic re-check found the task infeasible while it was running.
    Infeasible,
    Retried { attempt: u32 },
    /// Multi-agent task handed back to the pool after a failure.
    Returned,
    Deleted { reason: DeleteKind },
    Discarded,
    Cancelled,
    /// The task left the broker while this agent still held it.
    Dropped,
    Spawned { child: TaskId },
}

pub trait EventSink {
    fn emit(&mut self, event: TaskEvent);
}

#[derive(Debug, Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&mut self, _event: TaskEvent) {}
}

#[derive(Debug, Default)]
pub struct VecEventSink {
    pub events: Vec<TaskEvent>,
}

impl VecEventSink {
    /// Events of one task, in emission order.
    pub fn for_task(&self, task: TaskId) -> impl Iterator<Item = &TaskEvent> {
        self.events.iter().filter(move |e| e.task == task)
    }
}

impl EventSink for VecEventSink {
    fn emit(&mut self, event: TaskEvent) {
        self.events.push(event);
    }
}

/// Appends events as JSON lines.
pub struct JsonlEventSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlEventSink {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open event log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Read back the last `limit` events of a log file.
    pub fn read_recent(path: &Path, limit: usize) -> Vec<TaskEvent> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let mut events: Vec<TaskEvent> = BufReader::new(file)
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if events.len() > limit {
            events.drain(0..events.len() - limit);
        }
        events
    }
}

impl EventSink for JsonlEventSink {
    fn emit(&mut self, event: TaskEvent) {
        let written = serde_json::to_string(&event)
            .map_err(anyhow::Error::from)
            .and_then(|line| writeln!(self.writer, "{line}").map_err(anyhow::Error::from));
        if let Err(err) = written {
            tracing::warn!(path = %self.path.display(), error = %err, "Failed to write task event");
        }
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
