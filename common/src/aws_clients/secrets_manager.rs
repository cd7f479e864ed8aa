use crate::config::aws_client_config::AwsClientConfig;
use anyhow::anyhow;
use async_trait::async_trait;
use rusoto_core::credential::EnvironmentProvider;
use rusoto_core::RusotoError;
use rusoto_secretsmanager::{
    GetSecretValueError, GetSecretValueRequest, SecretsManager, SecretsManagerClient,
};

#[derive(Debug, thiserror::Error)]
pub enum SecretsProviderError {
    #[error("{0:#}")]
    Unknown(anyhow::Error),
}

/// Read access to named secrets.
#[cfg_attr(feature = "test_mocks", mockall::automock)]
#[async_trait]
pub trait SecretsProvider: Sync + Send {
    /// Returns the plain-text value of the secret, or `None` if it does not exist.
    async fn find(&self, name: &str) -> Result<Option<String>, SecretsProviderError>;
}

pub struct AwsSecretsProvider {
    client: SecretsManagerClient,
}

impl AwsSecretsProvider {
    pub fn new(client: SecretsManagerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretsProvider for AwsSecretsProvider {
    async fn find(&self, name: &str) -> Result<Option<String>, SecretsProviderError> {
        let response = self
            .client
            .get_secret_value(GetSecretValueRequest {
                secret_id: name.to_owned(),
                ..Default::default()
            })
            .await;

        match response {
            Ok(output) => Ok(output.secret_string),
            Err(RusotoError::Service(GetSecretValueError::ResourceNotFound(_))) => {
                tracing::warn!(secret_name = name, "secret {name} not found");
                Ok(None)
            }
            Err(e) => Err(SecretsProviderError::Unknown(
                anyhow!(e).context(format!("unable to read secret {name}")),
            )),
        }
    }
}

/// Initializes a secrets provider with the AWS client
pub fn get_secrets_provider(config: &AwsClientConfig) -> anyhow::Result<AwsSecretsProvider> {
    let region = config
        .region()
        .map_err(|e| {
            anyhow!(e).context(format!("unable to parse AWS region {}", config.aws_region))
        })?;
    let request_dispatcher = rusoto_core::request::HttpClient::new()
        .map_err(|e| anyhow!(e).context("unable to build Rusoto HTTP client"))?;

    Ok(AwsSecretsProvider::new(SecretsManagerClient::new_with(
        request_dispatcher,
        EnvironmentProvider::default(),
        region,
    )))
}
