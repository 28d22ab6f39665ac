// # AWS classifiers
//
// This crate implements the attribution boundaries over the AWS APIs:
//
// - `InstanceClassifier` (public / private scope): DescribeInstances
//   filtered on `ip-address` / `private-ip-address`
// - `ElasticIpClassifier`: DescribeAddresses filtered on `public-ip`
// - `LoadBalancerClassifier`: DescribeLoadBalancers (ELBv2), matching the
//   batch against each balancer's resolved DNS name
// - `AwsRegionSource`: DescribeRegions
//
// Every query is batch-shaped: one API call per (region, classifier)
// invocation carrying the whole address batch as filter values, never one
// call per address.
//
// Classifiers here are isolated, stateless and single-shot. Coordination
// — which regions to query, merging, de-duplication, retries (there are
// none), the reverse-DNS fallback — is owned by the engine in
// `ipattr-core`.
//
// ## Credentials
//
// The AWS SDK's default provider chain is used as-is (environment,
// profile, IMDS). This crate performs no credential logic of its own.

mod eip;
mod instance;
mod load_balancer;
mod region;

pub use eip::ElasticIpClassifier;
pub use instance::InstanceClassifier;
pub use load_balancer::LoadBalancerClassifier;
pub use region::AwsRegionSource;

use aws_config::timeout::TimeoutConfig;
use aws_config::BehaviorVersion;
use aws_config::SdkConfig;
use ipattr_core::traits::{Classifier, Resolver};
use std::sync::Arc;
use std::time::Duration;

/// Timeout applied to every AWS API operation
///
/// Classifiers must not block indefinitely; a timed-out query is an
/// ordinary unit failure.
const OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Load a shared SDK configuration via the default provider chain
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(OPERATION_TIMEOUT)
                .build(),
        )
        .load()
        .await
}

/// The full classifier set over one SDK configuration
///
/// `resolver` and `dns_workers` feed the load balancer classifier's
/// name-resolution fan-out.
pub fn default_classifiers(
    sdk_config: &SdkConfig,
    resolver: Arc<dyn Resolver>,
    dns_workers: usize,
) -> Vec<Arc<dyn Classifier>> {
    vec![
        Arc::new(InstanceClassifier::public(sdk_config.clone())),
        Arc::new(InstanceClassifier::private(sdk_config.clone())),
        Arc::new(ElasticIpClassifier::new(sdk_config.clone())),
        Arc::new(LoadBalancerClassifier::new(
            sdk_config.clone(),
            resolver,
            dns_workers,
        )),
    ]
}

/// Build an EC2 client scoped to one region
pub(crate) fn ec2_client(sdk_config: &SdkConfig, region: &str) -> aws_sdk_ec2::Client {
    let config = aws_sdk_ec2::config::Builder::from(sdk_config)
        .region(aws_sdk_ec2::config::Region::new(region.to_string()))
        .build();
    aws_sdk_ec2::Client::from_conf(config)
}

/// Build an ELBv2 client scoped to one region
pub(crate) fn elb_client(
    sdk_config: &SdkConfig,
    region: &str,
) -> aws_sdk_elasticloadbalancingv2::Client {
    let config = aws_sdk_elasticloadbalancingv2::config::Builder::from(sdk_config)
        .region(aws_sdk_elasticloadbalancingv2::config::Region::new(
            region.to_string(),
        ))
        .build();
    aws_sdk_elasticloadbalancingv2::Client::from_conf(config)
}
