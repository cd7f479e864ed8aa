//! Batch dispatcher: the entry point the stream runtime calls once per batch of change records.

use crate::config::RelayConfig;
use crate::credentials::{CredentialCache, SecretLocation};
use crate::result::error::{RelayError, Result};
use crate::table_mapping::map_table_name;
use crate::webhook::WebhookClient;
use common::aws_clients::secrets_manager::SecretsProvider;
use model::change_record::ChangeRecord;
use model::delivery::{BatchResult, DeliveryOutcome};
use model::payload::NormalizedPayload;
use std::sync::Arc;

pub struct BatchDispatcher {
    credentials: CredentialCache,
    webhook: WebhookClient,
}

impl BatchDispatcher {
    pub fn new(credentials: CredentialCache, webhook: WebhookClient) -> Self {
        Self {
            credentials,
            webhook,
        }
    }

    pub fn from_config(
        config: &RelayConfig,
        secrets_provider: Arc<dyn SecretsProvider>,
    ) -> Result<Self> {
        let location = SecretLocation {
            secret_name: config.webhook_secret_name.clone(),
            webhook_url_field: config.webhook_url_field.clone(),
            auth_token_field: config.auth_token_field.clone(),
        };

        Ok(Self::new(
            CredentialCache::new(secrets_provider, location),
            WebhookClient::new(config.source_marker.clone(), config.retry_policy())?,
        ))
    }

    /// Forwards `records` to the webhook one at a time, in the order given.
    ///
    /// A record is only sent once the previous one has been delivered or has exhausted its
    /// retries. Failed records are reported in the result and do not stop the batch. The
    /// batch itself fails when credentials cannot be resolved (nothing is sent) or when every
    /// attempted record failed, which makes the runtime redeliver it.
    pub async fn dispatch(&self, records: Vec<ChangeRecord>) -> Result<BatchResult> {
        tracing::info!(records = records.len(), "batch received");

        let credentials = self.credentials.get_credentials().await.map_err(|e| {
            tracing::error!(error = %e, "unable to resolve webhook credentials");
            RelayError::from(e)
        })?;

        let mut result = BatchResult::default();
        let mut skipped = 0;

        for record in records {
            let payload = match NormalizedPayload::build(record, map_table_name) {
                Ok(payload) => payload,
                Err(reason) => {
                    skipped += 1;
                    tracing::info!("record skipped: {reason}");
                    continue;
                }
            };

            let event_id = payload.metadata.event_id.clone();
            let sequence_number = &payload.metadata.sequence_number;

            let outcome = match self.webhook.deliver(&payload, credentials).await {
                Ok(delivery) => {
                    tracing::info!(
                        event_id = %event_id,
                        sequence_number = %sequence_number,
                        table = %payload.table,
                        action = %payload.action,
                        attempts = delivery.attempts,
                        "record delivered"
                    );
                    DeliveryOutcome::delivered(event_id, delivery.response)
                }
                Err(e) => {
                    tracing::error!(
                        event_id = %event_id,
                        sequence_number = %sequence_number,
                        table = %payload.table,
                        action = %payload.action,
                        error = %e,
                        "record delivery failed"
                    );
                    DeliveryOutcome::failed(event_id, e.to_string())
                }
            };

            result.record(outcome);
        }

        tracing::info!(
            processed = result.processed_count,
            failed = result.failed_count,
            skipped,
            "batch finished"
        );

        if result.all_failed() {
            return Err(RelayError::BatchFatal {
                failed: result.failed_count,
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::BatchDispatcher;
    use crate::credentials::{CredentialCache, SecretLocation};
    use crate::result::error::RelayError;
    use crate::webhook::{RetryPolicy, WebhookClient};
    use anyhow::anyhow;
    use common::aws_clients::secrets_manager::{MockSecretsProvider, SecretsProviderError};
    use model::change_record::ChangeRecord;
    use reqwest::StatusCode;
    use rstest::*;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestFixture {
        pub mock_server: MockServer,
        pub dispatcher: BatchDispatcher,
    }

    fn secrets_for(server: &MockServer) -> MockSecretsProvider {
        let secret = json!({ "webhookUrl": server.uri(), "authToken": "t0k3n" }).to_string();
        let mut secrets_provider = MockSecretsProvider::new();
        secrets_provider
            .expect_find()
            .returning(move |_| Ok(Some(secret.clone())));
        secrets_provider
    }

    fn dispatcher_with(secrets_provider: MockSecretsProvider) -> BatchDispatcher {
        BatchDispatcher::new(
            CredentialCache::new(
                Arc::new(secrets_provider),
                SecretLocation {
                    secret_name: "relay/webhook".to_owned(),
                    webhook_url_field: "webhookUrl".to_owned(),
                    auth_token_field: "authToken".to_owned(),
                },
            ),
            WebhookClient::new(
                "dynamodb-stream-relay",
                RetryPolicy::new(3, Duration::from_millis(1)),
            )
            .unwrap(),
        )
    }

    #[fixture]
    async fn fixture() -> TestFixture {
        let mock_server = MockServer::start().await;
        let dispatcher = dispatcher_with(secrets_for(&mock_server));

        TestFixture {
            mock_server,
            dispatcher,
        }
    }

    fn record(event_id: &str, event_kind: &str) -> ChangeRecord {
        ChangeRecord {
            event_id: event_id.to_owned(),
            sequence_number: format!("seq-{event_id}"),
            source_table: "firespring-backdoor-visitors-dev".to_owned(),
            event_kind: event_kind.to_owned(),
            new_image: Some(
                serde_json::from_value(json!({ "id": { "S": event_id } })).unwrap(),
            ),
            old_image: None,
        }
    }

    async fn mock_event_response(event_id: &str, status_code: StatusCode, fixture: &TestFixture) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "metadata": { "eventId": event_id } })))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&fixture.mock_server)
            .await;
    }

    #[rstest]
    #[case::none_fail(5, 0)]
    #[case::some_fail(5, 2)]
    #[case::all_but_one_fail(4, 3)]
    #[tokio::test]
    async fn partial_failures_are_aggregated(
        #[future] fixture: TestFixture,
        #[case] total: usize,
        #[case] failing: usize,
    ) {
        let fixture = fixture.await;
        let mut records = Vec::new();
        for i in 0..total {
            let event_id = format!("evt-{i}");
            let status = if i < failing {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::OK
            };
            mock_event_response(&event_id, status, &fixture).await;
            records.push(record(&event_id, "INSERT"));
        }

        let result = fixture.dispatcher.dispatch(records).await.unwrap();

        assert_eq!(total - failing, result.processed_count);
        assert_eq!(failing, result.failed_count);
        assert_eq!(total, result.results.len());
        assert!(result.results[..failing].iter().all(|o| !o.success));
        assert!(result.results[failing..].iter().all(|o| o.success));
    }

    #[rstest]
    #[tokio::test]
    async fn all_failed_batch_is_fatal(#[future] fixture: TestFixture) {
        let fixture = fixture.await;
        mock_event_response("a", StatusCode::INTERNAL_SERVER_ERROR, &fixture).await;
        mock_event_response("b", StatusCode::UNAUTHORIZED, &fixture).await;

        let result = fixture
            .dispatcher
            .dispatch(vec![record("a", "INSERT"), record("b", "MODIFY")])
            .await;

        assert!(matches!(result, Err(RelayError::BatchFatal { failed: 2 })));
    }

    #[rstest]
    #[tokio::test]
    async fn unsupported_kinds_count_nowhere(#[future] fixture: TestFixture) {
        let fixture = fixture.await;
        mock_event_response("a", StatusCode::OK, &fixture).await;

        let mut no_image = record("c", "REMOVE");
        no_image.new_image = None;

        let result = fixture
            .dispatcher
            .dispatch(vec![record("a", "INSERT"), record("b", "TTL_EXPIRE"), no_image])
            .await
            .unwrap();

        assert_eq!(1, result.processed_count);
        assert_eq!(0, result.failed_count);
        assert_eq!(1, result.results.len());
        assert_eq!(1, fixture.mock_server.received_requests().await.unwrap().len());
    }

    #[rstest]
    #[tokio::test]
    async fn batch_of_only_skipped_records_is_not_fatal(#[future] fixture: TestFixture) {
        let fixture = fixture.await;

        let result = fixture
            .dispatcher
            .dispatch(vec![record("a", "UNKNOWN")])
            .await
            .unwrap();

        assert_eq!(0, result.processed_count);
        assert_eq!(0, result.failed_count);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_batch_succeeds(#[future] fixture: TestFixture) {
        let fixture = fixture.await;

        let result = fixture.dispatcher.dispatch(vec![]).await.unwrap();

        assert_eq!(0, result.processed_count);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn credential_failure_aborts_the_batch() {
        let mut secrets_provider = MockSecretsProvider::new();
        secrets_provider
            .expect_find()
            .times(1)
            .returning(|_| Err(SecretsProviderError::Unknown(anyhow!("access denied"))));
        let dispatcher = dispatcher_with(secrets_provider);

        let result = dispatcher.dispatch(vec![record("a", "INSERT")]).await;

        assert!(matches!(result, Err(RelayError::CredentialUnavailable(_))));
    }
}
