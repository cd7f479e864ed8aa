mod retry;

pub use retry::RetryPolicy;

use crate::credentials::WebhookCredentials;
use anyhow::Context;
use model::payload::NormalizedPayload;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect;
use serde_json::Value;

const SOURCE_HEADER: &str = "X-Source";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("webhook responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("webhook request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unable to serialize payload: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// A successful delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// JSON body of the 2xx response, if it had one.
    pub response: Option<Value>,
    pub attempts: u32,
}

/// Posts normalized payloads to the mirror webhook.
pub struct WebhookClient {
    http_client: reqwest::Client,
    source_marker: String,
    retry_policy: RetryPolicy,
}

impl WebhookClient {
    /// Redirects are not followed: a 3xx answer is a failed attempt like any other non-2xx.
    pub fn new(
        source_marker: impl Into<String>,
        retry_policy: RetryPolicy,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .context("unable to build webhook http client")?;

        Ok(Self {
            http_client,
            source_marker: source_marker.into(),
            retry_policy,
        })
    }

    /// Delivers `payload`, retrying any non-2xx answer or transport error until the retry
    /// policy runs out. Only the error of the last attempt is returned.
    pub async fn deliver(
        &self,
        payload: &NormalizedPayload,
        credentials: &WebhookCredentials,
    ) -> Result<Delivery, DeliveryError> {
        let body = serde_json::to_vec(payload).map_err(DeliveryError::Serialization)?;
        let event_id = &payload.metadata.event_id;
        let mut attempt = 1;

        loop {
            let error = match self.attempt(&body, credentials).await {
                Ok(response) => return Ok(Delivery { response, attempts: attempt }),
                Err(e) => e,
            };

            let Some(delay) = self.retry_policy.delay_after(attempt) else {
                return Err(error);
            };

            tracing::warn!(
                event_id = %event_id,
                attempt,
                max_attempts = self.retry_policy.max_attempts(),
                delay_ms = delay.as_millis() as u64,
                "delivery attempt failed, retrying: {error}"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        body: &[u8],
        credentials: &WebhookCredentials,
    ) -> Result<Option<Value>, DeliveryError> {
        let response = self
            .http_client
            .post(&credentials.webhook_url)
            .bearer_auth(&credentials.auth_token)
            .header(CONTENT_TYPE, "application/json")
            .header(SOURCE_HEADER, &self.source_marker)
            .body(body.to_vec())
            .send()
            .await
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        let text = response.text().await.map_err(DeliveryError::Transport)?;

        if !status.is_success() {
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body: text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        Ok(serde_json::from_str(&text).ok())
    }
}
