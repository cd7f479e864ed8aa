mod dtos;

use anyhow::anyhow;
use async_trait::async_trait;
use cdc_webhook_relay::config::RelayConfig;
use cdc_webhook_relay::relay::BatchDispatcher;
use cdc_webhook_relay::result::error::RelayError;
use cdc_webhook_relay::{lambda_main, lambda_structure::lambda_trait::Lambda};
use common::aws_clients::secrets_manager::get_secrets_provider;
use common::config::ConfigLoader;
use dtos::DynamoDbStreamEvent;
use model::change_record::ChangeRecord;
use model::delivery::BatchResult;
use std::sync::Arc;

pub struct Persisted {
    pub dispatcher: BatchDispatcher,
}

pub struct CdcWebhookRelay;

#[async_trait]
impl Lambda for CdcWebhookRelay {
    type PersistedMemory = Persisted;
    type InputBody = DynamoDbStreamEvent;
    type Output = BatchResult;
    type Error = RelayError;

    async fn bootstrap() -> Result<Self::PersistedMemory, Self::Error> {
        let config = ConfigLoader::load_default::<RelayConfig>()
            .map_err(|e| anyhow!(e).context("unable to load relay configuration"))?;
        let secrets_provider = get_secrets_provider(&config.aws_client_config())?;

        let dispatcher = BatchDispatcher::from_config(&config, Arc::new(secrets_provider))?;
        let worst_case_delay = config.retry_policy().worst_case_delay();

        tracing::info!(
            secret_name = %config.webhook_secret_name,
            max_attempts = config.max_delivery_attempts,
            retry_base_delay_ms = config.retry_base_delay_ms,
            worst_case_retry_delay_ms = worst_case_delay.as_millis() as u64,
            "relay bootstrapped"
        );

        Ok(Persisted { dispatcher })
    }

    async fn run(
        request: Self::InputBody,
        state: &Self::PersistedMemory,
    ) -> Result<Self::Output, Self::Error> {
        let records = request
            .records
            .into_iter()
            .map(ChangeRecord::from)
            .collect();

        state.dispatcher.dispatch(records).await
    }
}

lambda_main!(CdcWebhookRelay);
