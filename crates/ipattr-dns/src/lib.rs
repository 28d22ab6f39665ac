// # DNS resolver
//
// hickory-resolver backed implementation of the `Resolver` boundary:
// reverse lookups for the engine's fallback pass and forward lookups for
// the load balancer classifier.
//
// Every lookup is one query with the resolver's own timeout; failures are
// returned to the caller, which isolates them per address or per name.

use async_trait::async_trait;
use hickory_resolver::config::ResolverConfig;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{Resolver as HickoryResolver, TokioResolver};
use ipattr_core::traits::Resolver;
use ipattr_core::{Error, Result};
use std::net::IpAddr;
use tracing::debug;

/// DNS resolver over hickory-resolver
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    /// Create a resolver from the system DNS configuration
    ///
    /// On Unix this reads `/etc/resolv.conf`.
    pub fn system() -> Result<Self> {
        let resolver = HickoryResolver::builder_tokio()
            .map_err(|e| Error::resolver(format!("system DNS configuration: {e}")))?
            .build();
        Ok(Self { resolver })
    }

    /// Create a resolver using Cloudflare's public DNS servers
    pub fn cloudflare() -> Self {
        let resolver = HickoryResolver::builder_with_config(
            ResolverConfig::cloudflare(),
            TokioConnectionProvider::default(),
        )
        .build();
        Self { resolver }
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn reverse(&self, address: IpAddr) -> Result<Vec<String>> {
        let lookup = self
            .resolver
            .reverse_lookup(address)
            .await
            .map_err(|e| Error::resolver(format!("{address}: {e}")))?;

        let names: Vec<String> = lookup
            .iter()
            .map(|ptr| ptr.to_string().trim_end_matches('.').to_string())
            .collect();
        debug!(%address, names = names.len(), "reverse lookup finished");
        Ok(names)
    }

    async fn lookup(&self, name: &str) -> Result<Vec<IpAddr>> {
        let lookup = self
            .resolver
            .lookup_ip(name)
            .await
            .map_err(|e| Error::resolver(format!("{name}: {e}")))?;

        Ok(lookup.iter().collect())
    }
}
