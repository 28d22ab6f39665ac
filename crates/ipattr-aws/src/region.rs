//! AWS region enumeration
//!
//! DescribeRegions against a home region. Failure here is never fatal:
//! the engine substitutes its fallback set and continues.

use crate::ec2_client;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::error::DisplayErrorContext;
use ipattr_core::traits::RegionSource;
use ipattr_core::{Error, Result};
use tracing::debug;

/// Region the DescribeRegions call itself is sent to
const HOME_REGION: &str = "us-east-1";

/// Region source backed by EC2 DescribeRegions
pub struct AwsRegionSource {
    sdk_config: SdkConfig,
}

impl AwsRegionSource {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }
}

#[async_trait]
impl RegionSource for AwsRegionSource {
    async fn list_regions(&self) -> Result<Vec<String>> {
        let client = ec2_client(&self.sdk_config, HOME_REGION);
        let response = client
            .describe_regions()
            .send()
            .await
            .map_err(|e| Error::region_source(DisplayErrorContext(e).to_string()))?;

        let regions: Vec<String> = response
            .regions()
            .iter()
            .filter_map(|r| r.region_name().map(str::to_string))
            .collect();
        debug!(count = regions.len(), "enumerated AWS regions");
        Ok(regions)
    }

    fn name(&self) -> &'static str {
        "aws-regions"
    }
}
