//! Load balancer classifier
//!
//! Load balancer inventories expose DNS names, not addresses, so this
//! classifier lists every balancer in the region and forward-resolves
//! each name, matching the resolved addresses back against the batch.
//!
//! The number of balancers in a region is not bounded by input size, so
//! name resolution fans out concurrently behind a fixed-size semaphore.
//! One failed resolution skips that balancer only; the rest of the
//! classification continues.

use crate::elb_client;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_elasticloadbalancingv2::error::DisplayErrorContext;
use ipattr_core::traits::{Classification, Classifier, Resolver};
use ipattr_core::{Attribution, Error, Result};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One balancer worth resolving: (ARN, name, DNS name)
type BalancerTarget = (String, String, String);

/// Classifier matching batch addresses to load balancers via their DNS
/// names
pub struct LoadBalancerClassifier {
    sdk_config: SdkConfig,
    resolver: Arc<dyn Resolver>,
    dns_workers: usize,
}

impl LoadBalancerClassifier {
    /// # Parameters
    ///
    /// - `resolver`: forward resolver for balancer DNS names
    /// - `dns_workers`: cap on concurrent name resolutions
    pub fn new(sdk_config: SdkConfig, resolver: Arc<dyn Resolver>, dns_workers: usize) -> Self {
        Self {
            sdk_config,
            resolver,
            dns_workers: dns_workers.max(1),
        }
    }

    /// List every balancer in the region
    async fn list_balancers(&self, region: &str) -> Result<Vec<BalancerTarget>> {
        let client = elb_client(&self.sdk_config, region);
        let mut targets = Vec::new();

        let mut pages = client.describe_load_balancers().into_paginator().send();
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|e| Error::source(self.name(), DisplayErrorContext(e).to_string()))?;
            for balancer in page.load_balancers() {
                if let (Some(arn), Some(name), Some(dns_name)) = (
                    balancer.load_balancer_arn(),
                    balancer.load_balancer_name(),
                    balancer.dns_name(),
                ) {
                    targets.push((arn.to_string(), name.to_string(), dns_name.to_string()));
                }
            }
        }
        Ok(targets)
    }
}

#[async_trait]
impl Classifier for LoadBalancerClassifier {
    async fn classify(&self, region: &str, batch: &[IpAddr]) -> Result<Classification> {
        let targets = self.list_balancers(region).await?;
        debug!(region, balancers = targets.len(), "resolving balancer names");

        let semaphore = Arc::new(Semaphore::new(self.dns_workers));
        let mut lookups: JoinSet<(BalancerTarget, Result<Vec<IpAddr>>)> = JoinSet::new();
        for target in targets {
            let resolver = Arc::clone(&self.resolver);
            let semaphore = Arc::clone(&semaphore);
            lookups.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                let resolved = resolver.lookup(&target.2).await;
                (target, resolved)
            });
        }

        let batch_set: HashSet<IpAddr> = batch.iter().copied().collect();
        let mut matches = Classification::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(((arn, name, _dns_name), Ok(addresses))) => {
                    for address in addresses {
                        if batch_set.contains(&address) {
                            matches
                                .insert(address, Attribution::load_balancer(region, &arn, &name));
                        }
                    }
                }
                Ok(((_, name, dns_name), Err(e))) => {
                    // One unresolvable balancer must not abort the rest.
                    debug!(balancer = %name, %dns_name, "name resolution failed: {e}");
                }
                Err(e) => {
                    warn!("balancer resolution task panicked: {e}");
                }
            }
        }
        debug!(region, matched = matches.len(), "load balancer query finished");
        Ok(matches)
    }

    fn name(&self) -> &'static str {
        "load-balancer"
    }
}
