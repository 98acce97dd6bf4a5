//! Per-run bookkeeping and the run state machine.
//!
//! ```text
//! pending -> running -> completed
//!               \-----> failed
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::simulation::reaction::Reaction;

/// Identifier of one simulation run. Also namespaces its synthetic personas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    pub fn new() -> Self {
        let raw = Uuid::new_v4().simple().to_string();
        Self(raw[..12].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last five characters, used in synthetic handles.
    pub fn short(&self) -> &str {
        let start = self.0.len().saturating_sub(5);
        &self.0[start..]
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Everything one scheduler invocation knows about its run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRun {
    pub run_id: RunId,
    pub post_id: String,
    /// Tier name as requested, recognised or not.
    pub tier: String,
    pub planned: usize,
    pub participant_ids: Vec<String>,
    pub status: RunStatus,
    pub reactions: Vec<Reaction>,
    /// Size of each batch, in execution order.
    pub batch_sizes: Vec<usize>,
    /// Pauses taken between batches.
    #[serde(default)]
    pub pauses: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Events the sink refused. Counted, never retried.
    pub undelivered_events: usize,
    pub error: Option<String>,
}

impl SimulationRun {
    pub fn new(
        run_id: RunId,
        post_id: impl Into<String>,
        tier: impl Into<String>,
        participant_ids: Vec<String>,
    ) -> Self {
        Self {
            run_id,
            post_id: post_id.into(),
            tier: tier.into(),
            planned: participant_ids.len(),
            participant_ids,
            status: RunStatus::Pending,
            reactions: Vec::new(),
            batch_sizes: Vec::new(),
            pauses: 0,
            started_at: None,
            finished_at: None,
            undelivered_events: 0,
            error: None,
        }
    }

    /// `pending -> running`.
    pub fn start(&mut self) {
        if self.transition(RunStatus::Pending, RunStatus::Running) {
            self.started_at = Some(Utc::now());
        }
    }

    /// `running -> completed`.
    pub fn complete(&mut self) {
        if self.transition(RunStatus::Running, RunStatus::Completed) {
            self.finished_at = Some(Utc::now());
        }
    }

    /// `running -> failed`.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.transition(RunStatus::Running, RunStatus::Failed) {
            self.error = Some(message.into());
            self.finished_at = Some(Utc::now());
        }
    }

    pub fn push_reaction(&mut self, reaction: Reaction) {
        self.reactions.push(reaction);
    }

    pub fn record_batch(&mut self, size: usize) {
        self.batch_sizes.push(size);
    }

    fn transition(&mut self, from: RunStatus, to: RunStatus) -> bool {
        if self.status != from {
            tracing::warn!(
                run_id = %self.run_id,
                current = ?self.status,
                requested = ?to,
                "ignoring invalid run status transition"
            );
            return false;
        }
        self.status = to;
        true
    }
}
