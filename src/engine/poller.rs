//! Run status polling
//!
//! Fixed-interval, attempt-bounded observation of a run until it settles.
//! Each iteration sleeps first, then fetches, yielding to the scheduler
//! during the wait. No backoff: remote run duration is externally bounded
//! and short. The attempt ceiling is the only early-exit mechanism.

use super::error::EngineError;
use crate::assistant::{AssistantApi, Run};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 120,
        }
    }
}

/// Poll until the run reaches a settled status (terminal or blocked on tool
/// outputs). Fails with [`EngineError::PollTimeout`] once `max_attempts`
/// status checks have been spent.
pub async fn poll_until_settled(
    api: &dyn AssistantApi,
    thread_id: &str,
    run_id: &str,
    config: PollConfig,
) -> Result<Run, EngineError> {
    for attempt in 1..=config.max_attempts {
        tokio::time::sleep(config.interval).await;

        let run = api.run_status(thread_id, run_id).await?;
        if run.status.is_settled() {
            tracing::debug!(run_id, status = %run.status, attempt, "run settled");
            return Ok(run);
        }

        if attempt % 10 == 0 {
            tracing::info!(
                run_id,
                status = %run.status,
                attempt,
                max_attempts = config.max_attempts,
                "still waiting on run"
            );
        }
    }

    Err(EngineError::PollTimeout {
        attempts: config.max_attempts,
    })
}
