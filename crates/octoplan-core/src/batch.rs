//! Best-effort batch orchestration.
//!
//! Applies one operation across a list of inputs strictly in order,
//! recording a per-input outcome and never aborting the batch. Sequential
//! on purpose: the remote rate limiter sees a predictable, low-burst load
//! and error attribution stays trivial.

use std::future::Future;

use serde::Serialize;
use tracing::warn;

use crate::error::Error;

/// Outcome of one batch input. Exactly one is produced per input, in
/// input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome<V> {
    pub key: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_error: Option<String>,
}

/// Aggregate result of a batch run. A batch with zero successes is still
/// a result, not an error: partial failure is data, not control flow.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<V> {
    pub outcomes: Vec<BatchOutcome<V>>,
    pub success_count: usize,
}

impl<V> BatchReport<V> {
    pub fn summary(&self) -> String {
        format!("{} of {} succeeded", self.success_count, self.outcomes.len())
    }
}

/// Successful per-item payload, with room for an independent secondary
/// failure (the primary action is never rolled back by one).
#[derive(Debug, Clone)]
pub struct BatchItem<V> {
    pub value: V,
    pub secondary_error: Option<String>,
}

impl<V> From<V> for BatchItem<V> {
    fn from(value: V) -> Self {
        Self {
            value,
            secondary_error: None,
        }
    }
}

/// Run `op` over every input in order, one at a time. A failure on one
/// input is recorded and the batch continues with the next.
pub async fn run_batch<T, V, K, F, Fut>(inputs: Vec<T>, key_of: K, op: F) -> BatchReport<V>
where
    K: Fn(&T) -> String,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<BatchItem<V>, Error>>,
{
    let mut outcomes = Vec::with_capacity(inputs.len());
    let mut success_count = 0;

    for input in inputs {
        let key = key_of(&input);
        match op(input).await {
            Ok(item) => {
                success_count += 1;
                outcomes.push(BatchOutcome {
                    key,
                    success: true,
                    value: Some(item.value),
                    error: None,
                    secondary_error: item.secondary_error,
                });
            }
            Err(err) => {
                warn!(key = %key, error = %err, "batch item failed");
                outcomes.push(BatchOutcome {
                    key,
                    success: false,
                    value: None,
                    error: Some(err.to_string()),
                    secondary_error: None,
                });
            }
        }
    }

    BatchReport {
        outcomes,
        success_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(message: &str) -> Error {
        Error::RemoteNotFound(message.to_string())
    }

    #[tokio::test]
    async fn test_all_succeed() {
        let report = run_batch(vec![1, 2, 3], |n| format!("#{n}"), |n| async move {
            Ok(BatchItem::from(n * 10))
        })
        .await;

        assert_eq!(report.success_count, 3);
        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.outcomes[1].key, "#2");
        assert_eq!(report.outcomes[1].value, Some(20));
        assert_eq!(report.summary(), "3 of 3 succeeded");
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_the_batch() {
        let report = run_batch(vec![1, 2, 3], |n| format!("#{n}"), |n| async move {
            if n == 2 {
                Err(fail("issue #2 missing"))
            } else {
                Ok(BatchItem::from(n))
            }
        })
        .await;

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.success_count, 2);
        assert!(report.outcomes[0].success);
        assert!(!report.outcomes[1].success);
        assert!(report.outcomes[2].success);
        assert!(report.outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("issue #2 missing"));
    }

    #[tokio::test]
    async fn test_all_fail_is_still_a_report() {
        let report = run_batch(vec!["a", "b"], |s| s.to_string(), |_s| async move {
            Err::<BatchItem<()>, _>(fail("nope"))
        })
        .await;

        assert_eq!(report.success_count, 0);
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.summary(), "0 of 2 succeeded");
    }

    #[tokio::test]
    async fn test_outcomes_preserve_input_order() {
        let inputs: Vec<i64> = (0..10).collect();
        let report = run_batch(inputs, |n| n.to_string(), |n| async move {
            if n % 2 == 0 {
                Ok(BatchItem::from(n))
            } else {
                Err(fail("odd"))
            }
        })
        .await;

        let keys: Vec<&str> = report.outcomes.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"]);
        assert_eq!(report.success_count, 5);
        assert_eq!(
            report.success_count,
            report.outcomes.iter().filter(|o| o.success).count()
        );
    }

    #[tokio::test]
    async fn test_secondary_failure_keeps_the_item_successful() {
        let report = run_batch(vec![7], |n| format!("#{n}"), |n| async move {
            Ok(BatchItem {
                value: n,
                secondary_error: Some("comment failed".to_string()),
            })
        })
        .await;

        assert_eq!(report.success_count, 1);
        let outcome = &report.outcomes[0];
        assert!(outcome.success);
        assert_eq!(outcome.secondary_error.as_deref(), Some("comment failed"));
    }
}
