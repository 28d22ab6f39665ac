//! Elastic IP classifier
//!
//! One DescribeAddresses call per invocation, filtered on `public-ip`
//! with the whole batch as values.

use crate::ec2_client;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::Filter;
use ipattr_core::traits::{Classification, Classifier};
use ipattr_core::{Attribution, Error, Result};
use std::net::IpAddr;
use tracing::debug;

/// Classifier matching batch addresses to Elastic IP allocations
pub struct ElasticIpClassifier {
    sdk_config: SdkConfig,
}

impl ElasticIpClassifier {
    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }
}

#[async_trait]
impl Classifier for ElasticIpClassifier {
    async fn classify(&self, region: &str, batch: &[IpAddr]) -> Result<Classification> {
        let client = ec2_client(&self.sdk_config, region);
        let values: Vec<String> = batch.iter().map(ToString::to_string).collect();

        let response = client
            .describe_addresses()
            .filters(
                Filter::builder()
                    .name("public-ip")
                    .set_values(Some(values))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::source(self.name(), DisplayErrorContext(e).to_string()))?;

        let mut matches = Classification::new();
        for allocation in response.addresses() {
            let Some(id) = allocation.allocation_id() else {
                continue;
            };
            let Some(address) = allocation.public_ip().and_then(|s| s.parse::<IpAddr>().ok())
            else {
                continue;
            };
            if batch.contains(&address) {
                matches.insert(address, Attribution::elastic_ip(region, id));
            }
        }
        debug!(region, matched = matches.len(), "elastic IP query finished");
        Ok(matches)
    }

    fn name(&self) -> &'static str {
        "elastic-ip"
    }
}
