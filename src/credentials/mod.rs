use common::aws_clients::secrets_manager::{SecretsProvider, SecretsProviderError};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Where to POST and how to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookCredentials {
    pub webhook_url: String,
    pub auth_token: String,
}

impl fmt::Debug for WebhookCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookCredentials")
            .field("webhook_url", &self.webhook_url)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("unable to fetch secret {secret_name}: {source}")]
    Fetch {
        secret_name: String,
        #[source]
        source: SecretsProviderError,
    },
    #[error("secret {0} not found")]
    NotFound(String),
    #[error("secret {secret_name} is not a JSON object: {source}")]
    Malformed {
        secret_name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("secret {secret_name} has no usable \"{field}\" field")]
    MissingField { secret_name: String, field: String },
}

/// Names the secret and the two fields read out of it.
#[derive(Clone, Debug)]
pub struct SecretLocation {
    pub secret_name: String,
    pub webhook_url_field: String,
    pub auth_token_field: String,
}

/// Lazily fetched webhook credentials, kept for the lifetime of the process.
///
/// The secret is read on the first call to [`CredentialCache::get_credentials`] only. A failed
/// fetch leaves the cache empty so the next invocation tries again. A rotated secret is picked
/// up after a cold start.
pub struct CredentialCache {
    secrets_provider: Arc<dyn SecretsProvider>,
    location: SecretLocation,
    credentials: OnceCell<WebhookCredentials>,
}

impl CredentialCache {
    pub fn new(secrets_provider: Arc<dyn SecretsProvider>, location: SecretLocation) -> Self {
        Self {
            secrets_provider,
            location,
            credentials: OnceCell::new(),
        }
    }

    pub async fn get_credentials(&self) -> Result<&WebhookCredentials, CredentialError> {
        self.credentials.get_or_try_init(|| self.fetch()).await
    }

    async fn fetch(&self) -> Result<WebhookCredentials, CredentialError> {
        let secret_name = &self.location.secret_name;
        tracing::info!(secret_name = %secret_name, "fetching webhook credentials");

        let secret = self
            .secrets_provider
            .find(secret_name)
            .await
            .map_err(|source| CredentialError::Fetch {
                secret_name: secret_name.clone(),
                source,
            })?
            .ok_or_else(|| CredentialError::NotFound(secret_name.clone()))?;

        let fields: Map<String, Value> =
            serde_json::from_str(&secret).map_err(|source| CredentialError::Malformed {
                secret_name: secret_name.clone(),
                source,
            })?;

        Ok(WebhookCredentials {
            webhook_url: self.required_field(&fields, &self.location.webhook_url_field)?,
            auth_token: self.required_field(&fields, &self.location.auth_token_field)?,
        })
    }

    fn required_field(
        &self,
        fields: &Map<String, Value>,
        field: &str,
    ) -> Result<String, CredentialError> {
        fields
            .get(field)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .ok_or_else(|| CredentialError::MissingField {
                secret_name: self.location.secret_name.clone(),
                field: field.to_owned(),
            })
    }
}
