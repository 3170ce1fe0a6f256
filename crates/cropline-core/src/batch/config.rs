//! Orchestrator configuration, loadable from JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Pause between tasks, giving the host room and cancellation a checkpoint.
    pub inter_task_delay_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            inter_task_delay_ms: 100,
        }
    }
}

impl OrchestratorConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn inter_task_delay(&self) -> Duration {
        Duration::from_millis(self.inter_task_delay_ms)
    }

    pub fn with_inter_task_delay(mut self, delay: Duration) -> Self {
        self.inter_task_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
