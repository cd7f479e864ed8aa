//! RelayError is the error a relay invocation can fail with. Returning it makes the stream
//! runtime redeliver the whole batch, so only invocation-level failures end up here; a single
//! record that cannot be delivered is reported in the batch result instead.

use crate::credentials::CredentialError;
use lambda_runtime::Error as LambdaRuntimeError;

pub type Result<T> = std::result::Result<T, RelayError>;
pub type LambdaRuntimeResult = std::result::Result<(), LambdaRuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("webhook credentials unavailable: {0}")]
    CredentialUnavailable(#[from] CredentialError),
    #[error("all {failed} deliveries in the batch failed")]
    BatchFatal { failed: usize },
    #[error("{0:#}")]
    Unknown(#[source] anyhow::Error),
}

impl From<anyhow::Error> for RelayError {
    fn from(e: anyhow::Error) -> Self {
        Self::Unknown(e)
    }
}
