//! Mockup generation tasks
//!
//! When static template data carries no preview images, Printful can render a
//! blank mockup on demand. The task is created once and then polled on a fixed
//! interval until it reaches a terminal state or the time budget runs out.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::domain::{TaskMockup, TaskStatus};
use crate::providers::printful::models::CreateMockupTaskPayload;
use crate::providers::printful::PrintfulMapper;
use crate::providers::{PrintfulApi, ProviderError};

use super::error::{PipelineError, PipelineResult};

/// Polling budget for a mockup task
#[derive(Debug, Clone, Copy)]
pub struct TaskPolling {
    pub timeout: Duration,
    pub interval: Duration,
}

impl Default for TaskPolling {
    fn default() -> Self {
        TaskPolling {
            timeout: Duration::from_secs(120),
            interval: Duration::from_secs(5),
        }
    }
}

/// Create a blank mockup task for one variant and wait for its mockups
pub async fn generate_blank_mockups(
    api: &dyn PrintfulApi,
    product_id: &str,
    variant_id: &str,
    polling: TaskPolling,
) -> PipelineResult<Vec<TaskMockup>> {
    let payload = serde_json::to_value(CreateMockupTaskPayload::blank(variant_id))
        .map_err(|e| ProviderError::ParseError(format!("Mockup task payload: {}", e)))?;

    let created = api.create_mockup_task(product_id, &payload).await?;
    let task_key = PrintfulMapper::map_task_key(&created)?;
    info!(task_key = %task_key, product_id = %product_id, variant_id = %variant_id, "Started Printful mockup task");

    poll_task(api, &task_key, polling).await
}

/// Poll a task until it completes, fails, or the budget runs out
pub async fn poll_task(api: &dyn PrintfulApi, task_key: &str, polling: TaskPolling) -> PipelineResult<Vec<TaskMockup>> {
    let started = Instant::now();
    let mut attempt = 0u32;

    while started.elapsed() < polling.timeout {
        attempt += 1;
        let response = api.get_mockup_task(task_key).await?;
        let task = PrintfulMapper::map_mockup_task(&response, task_key);
        info!(task_key = %task_key, attempt, status = %task.status, "Polled Printful mockup task");

        if !task.status.is_terminal() {
            tokio::time::sleep(polling.interval).await;
            continue;
        }
        if task.status == TaskStatus::Failed {
            return Err(PipelineError::TaskFailed { task_key: task_key.to_string() });
        }
        return Ok(task.mockups);
    }

    warn!(task_key = %task_key, attempts = attempt, "Printful mockup task did not finish in time");
    Err(PipelineError::TaskTimeout {
        task_key: task_key.to_string(),
        waited_secs: started.elapsed().as_secs(),
    })
}
