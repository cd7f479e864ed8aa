use rusoto_core::region::{ParseRegionError, Region};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Deserialize, Debug, Clone)]
pub struct AwsClientConfig {
    /// Current AWS region.
    pub aws_region: String,

    /// Only used for development. LocalStack endpoint
    #[serde(default)]
    pub localstack_test_mode_endpoint: Option<String>,
}

impl AwsClientConfig {
    pub fn region(&self) -> Result<Region, ParseRegionError> {
        if let Some(endpoint) = self.localstack_test_mode_endpoint.clone() {
            Ok(Region::Custom {
                name: self.aws_region.clone(),
                endpoint,
            })
        } else {
            Region::from_str(&self.aws_region)
        }
    }
}
