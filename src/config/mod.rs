use crate::webhook::RetryPolicy;
use common::config::aws_client_config::AwsClientConfig;
use serde::{self, Deserialize};
use std::time::Duration;

#[derive(Deserialize, Clone, Debug)]
pub struct RelayConfig {
    /// Current AWS region.
    pub aws_region: String,

    /// Only used for development. LocalStack endpoint
    #[serde(default)]
    pub localstack_test_mode_endpoint: Option<String>,

    /// Secrets Manager id of the JSON secret holding the webhook URL and token.
    pub webhook_secret_name: String,

    /// Field of the secret holding the webhook URL.
    #[serde(default = "default_webhook_url_field")]
    pub webhook_url_field: String,

    /// Field of the secret holding the bearer token.
    #[serde(default = "default_auth_token_field")]
    pub auth_token_field: String,

    /// Value of the `X-Source` header sent with every delivery.
    #[serde(default = "default_source_marker")]
    pub source_marker: String,

    /// Attempts per record, first one included.
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,

    /// Backoff unit. The n-th retry waits `n * retry_base_delay_ms`.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl RelayConfig {
    pub fn aws_client_config(&self) -> AwsClientConfig {
        AwsClientConfig {
            aws_region: self.aws_region.clone(),
            localstack_test_mode_endpoint: self.localstack_test_mode_endpoint.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_delivery_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error` or `off`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_webhook_url_field() -> String {
    "webhookUrl".to_owned()
}

fn default_auth_token_field() -> String {
    "authToken".to_owned()
}

fn default_source_marker() -> String {
    "dynamodb-stream-relay".to_owned()
}

fn default_max_delivery_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_log_level() -> String {
    "info".to_owned()
}
