use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of forwarding one change to the webhook.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    pub event_id: String,
    pub success: bool,
    /// Body returned by the webhook, when it answered with JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(event_id: String, response: Option<Value>) -> Self {
        Self {
            event_id,
            success: true,
            response,
            error: None,
        }
    }

    pub fn failed(event_id: String, error: String) -> Self {
        Self {
            event_id,
            success: false,
            response: None,
            error: Some(error),
        }
    }
}

/// Aggregate of one invocation. Outcomes keep the order records arrived in.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub processed_count: usize,
    pub failed_count: usize,
    pub results: Vec<DeliveryOutcome>,
}

impl BatchResult {
    pub fn record(&mut self, outcome: DeliveryOutcome) {
        if outcome.success {
            self.processed_count += 1;
        } else {
            self.failed_count += 1;
        }
        self.results.push(outcome);
    }

    /// True when at least one record was attempted and none of them made it.
    pub fn all_failed(&self) -> bool {
        self.failed_count > 0 && self.processed_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchResult, DeliveryOutcome};
    use serde_json::json;

    #[test]
    fn counts_follow_recorded_outcomes() {
        let mut result = BatchResult::default();
        result.record(DeliveryOutcome::delivered("a".to_owned(), None));
        result.record(DeliveryOutcome::failed("b".to_owned(), "boom".to_owned()));
        result.record(DeliveryOutcome::delivered("c".to_owned(), Some(json!({ "ok": true }))));

        assert_eq!(2, result.processed_count);
        assert_eq!(1, result.failed_count);
        assert_eq!(
            vec!["a", "b", "c"],
            result
                .results
                .iter()
                .map(|o| o.event_id.as_str())
                .collect::<Vec<_>>()
        );
        assert!(!result.all_failed());
    }

    #[test]
    fn empty_batch_is_not_a_total_failure() {
        assert!(!BatchResult::default().all_failed());
    }

    #[test]
    fn only_failures_is_a_total_failure() {
        let mut result = BatchResult::default();
        result.record(DeliveryOutcome::failed("a".to_owned(), "boom".to_owned()));

        assert!(result.all_failed());
    }

    #[test]
    fn serializes_with_camel_case_counts() {
        let mut result = BatchResult::default();
        result.record(DeliveryOutcome::failed("a".to_owned(), "boom".to_owned()));

        assert_eq!(
            json!({
                "processedCount": 0,
                "failedCount": 1,
                "results": [{ "eventId": "a", "success": false, "error": "boom" }]
            }),
            serde_json::to_value(result).unwrap()
        );
    }
}
