// # ipattr - IP attribution CLI
//
// Thin integration layer only: argument handling, wiring, and report
// rendering. All attribution logic lives in ipattr-core; the AWS and DNS
// collaborators live in ipattr-aws and ipattr-dns.
//
// ## Usage
//
// ```bash
// ipattr [-v|--verbose] [--json] <ip> [<ip> ...]
// ```
//
// ## Configuration
//
// Tuning is via environment variables:
//
// - `IPATTR_FALLBACK_REGIONS`: comma-separated regions to scan when
//   region enumeration fails (default: us-east-1,us-west-1)
// - `IPATTR_DNS_WORKERS`: cap on concurrent DNS lookups (default: 8)
// - `IPATTR_DNS`: `system` (default) or `cloudflare`
//
// AWS credentials come from the SDK's default provider chain.
//
// ## Example
//
// ```bash
// ipattr 10.0.0.5 54.1.2.3 203.0.113.9
// ```

use anyhow::Result;
use ipattr_core::{AttributionEngine, AttributionKind, AttributionReport, EngineConfig};
use ipattr_aws::AwsRegionSource;
use ipattr_core::traits::Resolver;
use ipattr_dns::DnsResolver;
use std::env;
use std::fmt::Write as _;
use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: clean run (including addresses that stayed unknown)
/// - 1: usage or configuration error
/// - 2: runtime error
#[derive(Debug, Clone, Copy)]
enum AttrExitCode {
    Clean = 0,
    UsageError = 1,
    RuntimeError = 2,
}

impl From<AttrExitCode> for ExitCode {
    fn from(code: AttrExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Run(Options),
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    verbose: bool,
    json: bool,
    addresses: Vec<IpAddr>,
    /// Arguments that did not parse as addresses; reported, not fatal,
    /// unless nothing at all parsed
    skipped: Vec<String>,
}

const USAGE: &str = "usage: ipattr [-v|--verbose] [--json] <ip> [<ip> ...]";

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Command, String> {
    let mut options = Options::default();
    let mut saw_any = false;

    for arg in args {
        saw_any = true;
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-v" | "--verbose" => options.verbose = true,
            "--json" => options.json = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown flag: {flag}\n{USAGE}"));
            }
            candidate => match candidate.parse::<IpAddr>() {
                Ok(address) => options.addresses.push(address),
                Err(_) => options.skipped.push(candidate.to_string()),
            },
        }
    }

    if !saw_any {
        return Err(USAGE.to_string());
    }
    // One bad address among many must not block the batch; a batch with
    // no usable address at all is a usage error.
    if options.addresses.is_empty() {
        return Err(format!(
            "no valid IP addresses among: {}\n{USAGE}",
            options.skipped.join(", ")
        ));
    }
    Ok(Command::Run(options))
}

/// Engine settings from the environment
fn engine_config_from_env(verbose: bool) -> EngineConfig {
    let mut config = EngineConfig {
        verbose,
        ..EngineConfig::default()
    };

    if let Ok(raw) = env::var("IPATTR_FALLBACK_REGIONS") {
        let regions: Vec<String> = raw
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if !regions.is_empty() {
            config.fallback_regions = regions;
        }
    }
    if let Ok(raw) = env::var("IPATTR_DNS_WORKERS") {
        if let Ok(workers) = raw.parse() {
            config.dns_workers = workers;
        }
    }
    config
}

/// Render the report in the line-oriented text format
fn render_text(report: &AttributionReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let attribution = &entry.attribution;
        let _ = writeln!(out, "{}:", entry.address);
        let _ = writeln!(out, "  type: {}", attribution.kind);
        if let Some(region) = &attribution.region {
            let _ = writeln!(out, "  region: {region}");
        }
        if let Some(id) = &attribution.id {
            let _ = writeln!(out, "  id: {id}");
        }
        if let Some(name) = &attribution.name {
            if attribution.kind == AttributionKind::ReverseDns {
                let _ = writeln!(out, "  ptr: {name}");
            } else {
                let _ = writeln!(out, "  name: {name}");
            }
        }
    }
    out
}

async fn run(options: Options) -> Result<()> {
    for skipped in &options.skipped {
        eprintln!("warning: skipping invalid address {skipped:?}");
    }

    let config = engine_config_from_env(options.verbose);

    let resolver: Arc<dyn Resolver> = match env::var("IPATTR_DNS").as_deref() {
        Ok("cloudflare") => Arc::new(DnsResolver::cloudflare()),
        _ => Arc::new(DnsResolver::system()?),
    };

    let sdk_config = ipattr_aws::load_sdk_config().await;
    let classifiers =
        ipattr_aws::default_classifiers(&sdk_config, Arc::clone(&resolver), config.dns_workers);
    let region_source = Box::new(AwsRegionSource::new(sdk_config));

    let (engine, mut events) = AttributionEngine::new(classifiers, region_source, resolver, config)?;
    let event_drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!(?event, "engine event");
        }
    });

    let report = engine.resolve(&options.addresses).await?;
    event_drain.abort();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    if options.verbose && !report.diagnostics.is_empty() {
        eprintln!("{} diagnostic(s):", report.diagnostics.len());
        for diagnostic in &report.diagnostics {
            match &diagnostic.region {
                Some(region) => {
                    eprintln!("  {} [{}]: {}", diagnostic.source, region, diagnostic.message)
                }
                None => eprintln!("  {}: {}", diagnostic.source, diagnostic.message),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let command = match parse_args(env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return AttrExitCode::UsageError.into();
        }
    };

    let options = match command {
        Command::Help => {
            println!("{USAGE}");
            return AttrExitCode::Clean.into();
        }
        Command::Run(options) => options,
    };

    let level = if options.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("failed to initialize logging");
        return AttrExitCode::RuntimeError.into();
    }

    match run(options).await {
        Ok(()) => AttrExitCode::Clean.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            AttrExitCode::RuntimeError.into()
        }
    }
}
