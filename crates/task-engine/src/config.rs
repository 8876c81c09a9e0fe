//! Engine configuration loading and management.

use std::path::{Path, PathBuf};

use act_core::AgentId;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{TaskPriority, WorkerConfig};

/// Engine configuration, loaded from `.colony/engine.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How often (in ticks) a running task's feasibility is re-checked. `1` checks every tick;
    /// larger values only trade reaction time for less work.
    #[serde(default = "default_recheck_every_ticks")]
    pub recheck_every_ticks: u32,

    /// Consecutive failed runs after which a retrying task is discarded. `None` retries forever.
    #[serde(default = "default_max_consecutive_retries")]
    pub max_consecutive_retries: Option<u32>,

    /// Agents never pick up tasks below this tier.
    pub priority_floor: TaskPriority,

    /// Whether resource/location cancellations are announced to the player.
    #[serde(default = "default_true")]
    pub announce_cancellations: bool,

    /// Optional JSONL task event log (relative to the project root).
    pub event_log: Option<PathBuf>,
}

fn default_recheck_every_ticks() -> u32 {
    1
}
fn default_max_consecutive_retries() -> Option<u32> {
    Some(8)
}
fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recheck_every_ticks: default_recheck_every_ticks(),
            max_consecutive_retries: default_max_consecutive_retries(),
            priority_floor: TaskPriority::Eventually,
            announce_cancellations: default_true(),
            event_log: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from a project root (looks for `.colony/engine.yaml`), falling back to defaults.
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".colony/engine.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn resolve_paths(&mut self, project_root: &Path) {
        if let Some(log) = self.event_log.as_mut() {
            *log = project_root.join(&*log);
        }
    }

    /// Per-agent loop settings. The re-check phase is staggered by agent id so sparse cadences
    /// spread the work over ticks.
    pub fn worker_config(&self, agent: impl AgentId) -> WorkerConfig {
        let mut config = WorkerConfig::staggered(agent, self.recheck_every_ticks);
        config.priority_floor = self.priority_floor;
        config.max_consecutive_retries = self.max_consecutive_retries;
        config.announce_cancellations = self.announce_cancellations;
        config
    }
}
