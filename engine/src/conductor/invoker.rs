//! Tool Invoker
//!
//! Turns invocations into outcomes. Nothing raised by a backend escapes:
//! unknown operations, bad arguments, backend errors, timeouts and panics all
//! come back as failed outcomes.

use crate::tools::ToolBackend;
use futures::future::join_all;
use sdk::errors::EngineError;
use sdk::schema::Operation;
use sdk::types::{ToolInvocation, ToolOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ToolInvoker {
    backend: Arc<dyn ToolBackend>,
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(backend: Arc<dyn ToolBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }

    /// Run one invocation
    pub async fn invoke(&self, invocation: &ToolInvocation) -> ToolOutcome {
        let start = Instant::now();

        let operation = match invocation.operation.parse::<Operation>() {
            Ok(op) => op,
            Err(e) => {
                warn!("Rejected invocation: {}", e);
                return ToolOutcome::failure(&invocation.operation, e.to_string(), start.elapsed());
            }
        };

        match tokio::time::timeout(self.timeout, self.backend.call(operation, invocation)).await {
            Ok(Ok(payload)) => {
                debug!("{} succeeded in {:?}", operation, start.elapsed());
                ToolOutcome::success(operation.name(), payload, start.elapsed())
            }
            Ok(Err(e)) => {
                warn!("{} failed: {}", operation, e);
                ToolOutcome::failure(operation.name(), e.to_string(), start.elapsed())
            }
            Err(_) => {
                let err = EngineError::ToolTimeout {
                    operation: operation.name().to_string(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                };
                warn!("{}", err);
                ToolOutcome::failure(operation.name(), err.to_string(), start.elapsed())
            }
        }
    }

    /// Run every invocation on its own task and wait for all of them.
    ///
    /// Outcome `i` always answers invocation `i`.
    pub async fn invoke_many(&self, invocations: &[ToolInvocation]) -> Vec<ToolOutcome> {
        let batch_start = Instant::now();

        let handles: Vec<_> = invocations
            .iter()
            .cloned()
            .map(|invocation| {
                let invoker = self.clone();
                tokio::spawn(async move { invoker.invoke(&invocation).await })
            })
            .collect();

        let outcomes: Vec<ToolOutcome> = join_all(handles)
            .await
            .into_iter()
            .zip(invocations)
            .map(|(joined, invocation)| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    let err = EngineError::ToolAborted {
                        operation: invocation.operation.clone(),
                        reason: e.to_string(),
                    };
                    warn!("{}", err);
                    ToolOutcome::failure(
                        &invocation.operation,
                        err.to_string(),
                        batch_start.elapsed(),
                    )
                }
            })
            .collect();

        debug!(
            "Invoked {} tools in {:?} ({} failed)",
            outcomes.len(),
            batch_start.elapsed(),
            outcomes.iter().filter(|o| !o.success).count()
        );
        outcomes
    }
}
