//! Best-effort enrichment steps

use std::future::Future;

use crate::error::{AppResult, DegradedNotification};

/// Collects the enrichment steps that failed during one workflow
#[derive(Debug, Default)]
pub struct BestEffort {
    degraded: Vec<DegradedNotification>,
}

impl BestEffort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Await `step`; on failure log it, record it under `name` and return `None`
    pub async fn run<T, F>(&mut self, name: &str, step: F) -> Option<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match step.await {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Notification enrichment step {} failed: {}", name, e);
                self.degraded.push(DegradedNotification {
                    step: name.to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Record a step that completed but produced nothing usable
    pub fn missing(&mut self, name: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("Notification enrichment step {} returned nothing: {}", name, reason);
        self.degraded.push(DegradedNotification {
            step: name.to_string(),
            reason,
        });
    }

    pub fn into_degraded(self) -> Vec<DegradedNotification> {
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_run_keeps_value_or_records_failure() {
        let mut best_effort = BestEffort::new();

        let ok = best_effort.run("first", async { Ok::<_, AppError>(7) }).await;
        let failed: Option<i32> = best_effort
            .run("second", async { Err(AppError::Directory("timed out".into())) })
            .await;
        best_effort.missing("third", "empty body");

        assert_eq!(ok, Some(7));
        assert_eq!(failed, None);
        let degraded = best_effort.into_degraded();
        assert_eq!(degraded.len(), 2);
        assert_eq!(degraded[0].step, "second");
        assert!(degraded[0].reason.contains("timed out"));
        assert_eq!(degraded[1].step, "third");
    }
}
