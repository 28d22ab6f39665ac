//! EC2 instance classifiers
//!
//! One DescribeInstances call per invocation, with the whole batch as
//! filter values. The public and private scopes are the same query shape
//! against different address fields, so they share one implementation.

use crate::ec2_client;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::{Filter, Instance};
use ipattr_core::traits::{Classification, Classifier};
use ipattr_core::{Attribution, Error, Result};
use std::net::IpAddr;
use tracing::debug;

/// Which address field of an instance to match the batch against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressScope {
    Public,
    Private,
}

impl AddressScope {
    /// EC2 filter name for this scope
    fn filter_name(&self) -> &'static str {
        match self {
            AddressScope::Public => "ip-address",
            AddressScope::Private => "private-ip-address",
        }
    }

    /// Extract the scoped address from an instance record
    fn address_of(&self, instance: &Instance) -> Option<IpAddr> {
        let raw = match self {
            AddressScope::Public => instance.public_ip_address(),
            AddressScope::Private => instance.private_ip_address(),
        };
        raw.and_then(|s| s.parse().ok())
    }
}

/// Classifier matching batch addresses to EC2 instances
pub struct InstanceClassifier {
    sdk_config: SdkConfig,
    scope: AddressScope,
}

impl InstanceClassifier {
    /// Match against instances' public addresses
    pub fn public(sdk_config: SdkConfig) -> Self {
        Self {
            sdk_config,
            scope: AddressScope::Public,
        }
    }

    /// Match against instances' private addresses
    pub fn private(sdk_config: SdkConfig) -> Self {
        Self {
            sdk_config,
            scope: AddressScope::Private,
        }
    }
}

#[async_trait]
impl Classifier for InstanceClassifier {
    async fn classify(&self, region: &str, batch: &[IpAddr]) -> Result<Classification> {
        let client = ec2_client(&self.sdk_config, region);
        let values: Vec<String> = batch.iter().map(ToString::to_string).collect();

        let response = client
            .describe_instances()
            .filters(
                Filter::builder()
                    .name(self.scope.filter_name())
                    .set_values(Some(values))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::source(self.name(), DisplayErrorContext(e).to_string()))?;

        let mut matches = Classification::new();
        for reservation in response.reservations() {
            for instance in reservation.instances() {
                let Some(id) = instance.instance_id() else {
                    continue;
                };
                let Some(address) = self.scope.address_of(instance) else {
                    continue;
                };
                if batch.contains(&address) {
                    matches.insert(address, Attribution::instance(region, id));
                }
            }
        }
        debug!(
            region,
            scope = self.scope.filter_name(),
            matched = matches.len(),
            "instance query finished"
        );
        Ok(matches)
    }

    fn name(&self) -> &'static str {
        match self.scope {
            AddressScope::Public => "public-instance",
            AddressScope::Private => "private-instance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scopes_use_the_ec2_filter_names() {
        assert_eq!(AddressScope::Public.filter_name(), "ip-address");
        assert_eq!(AddressScope::Private.filter_name(), "private-ip-address");
    }

    #[test]
    fn scope_extracts_the_matching_field() {
        let instance = Instance::builder()
            .instance_id("i-0abc")
            .public_ip_address("54.1.2.3")
            .private_ip_address("10.0.0.5")
            .build();

        assert_eq!(
            AddressScope::Public.address_of(&instance),
            Some("54.1.2.3".parse().unwrap())
        );
        assert_eq!(
            AddressScope::Private.address_of(&instance),
            Some("10.0.0.5".parse().unwrap())
        );
    }

    #[test]
    fn unparsable_address_is_skipped() {
        let instance = Instance::builder()
            .instance_id("i-0abc")
            .public_ip_address("not-an-address")
            .build();
        assert_eq!(AddressScope::Public.address_of(&instance), None);
        assert_eq!(AddressScope::Private.address_of(&instance), None);
    }
}
