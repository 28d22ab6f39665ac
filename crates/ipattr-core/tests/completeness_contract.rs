//! Contract test: output completeness
//!
//! Every input address must appear in the final report exactly once:
//! attributed by a classifier, reverse-DNS-named, or explicitly unknown.
//! No address may be silently dropped.

mod common;

use common::*;
use ipattr_core::{Attribution, AttributionEngine, AttributionKind, EngineConfig};
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::test]
async fn mixed_batch_is_fully_accounted_for() {
    // One private instance, one Elastic IP, one address nothing
    // recognizes but reverse DNS names.
    let private = addr("10.0.0.5");
    let eip = addr("54.1.2.3");
    let stray = addr("203.0.113.9");

    let private_instances = StaticClassifier::new(
        "private-instance",
        "us-east-1",
        HashMap::from([(private, Attribution::instance("us-east-1", "i-0aa11bb22cc33dd44"))]),
    );
    let elastic_ips = StaticClassifier::new(
        "elastic-ip",
        "us-east-1",
        HashMap::from([(eip, Attribution::elastic_ip("us-east-1", "eipalloc-0123456789"))]),
    );
    let resolver = MockResolver::new(HashMap::from([(
        stray,
        vec!["host.example.com".to_string()],
    )]));

    let (engine, _events) = AttributionEngine::new(
        vec![private_instances.clone(), elastic_ips.clone()],
        StaticRegions::new(&["us-east-1", "us-west-1"]),
        resolver.clone(),
        EngineConfig::default(),
    )
    .expect("engine construction succeeds");

    let report = engine
        .resolve(&[private, eip, stray])
        .await
        .expect("run completes");

    assert_eq!(report.entries.len(), 3, "one entry per input address");
    assert_eq!(report.entries[0].address, private, "input order preserved");
    assert_eq!(report.entries[1].address, eip);
    assert_eq!(report.entries[2].address, stray);

    let private_attr = report.get(&private).expect("private address attributed");
    assert_eq!(private_attr.kind, AttributionKind::Instance);
    assert_eq!(private_attr.region.as_deref(), Some("us-east-1"));
    assert_eq!(private_attr.id.as_deref(), Some("i-0aa11bb22cc33dd44"));

    let eip_attr = report.get(&eip).expect("elastic IP attributed");
    assert_eq!(eip_attr.kind, AttributionKind::ElasticIp);

    let stray_attr = report.get(&stray).expect("stray address still reported");
    assert_eq!(stray_attr.kind, AttributionKind::ReverseDns);
    assert_eq!(stray_attr.name.as_deref(), Some("host.example.com"));

    assert_eq!(report.attributed_count(), 2);
    assert_eq!(report.bare_unknown_count(), 0);
    assert!(report.diagnostics.is_empty());
}

#[tokio::test]
async fn duplicate_input_addresses_collapse_to_one_entry() {
    let target = addr("54.1.2.3");
    let classifier = StaticClassifier::new(
        "elastic-ip",
        "us-east-1",
        HashMap::from([(target, Attribution::elastic_ip("us-east-1", "eipalloc-dup"))]),
    );

    let (engine, _events) = AttributionEngine::new(
        vec![classifier],
        StaticRegions::new(&["us-east-1"]),
        MockResolver::new(HashMap::new()),
        EngineConfig::default(),
    )
    .expect("engine construction succeeds");

    let report = engine
        .resolve(&[target, target, target])
        .await
        .expect("run completes");

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.get(&target).unwrap().kind, AttributionKind::ElasticIp);
}

#[tokio::test]
async fn classification_is_idempotent_against_a_static_dataset() {
    let target = addr("10.0.0.5");
    let classifier = StaticClassifier::new(
        "private-instance",
        "us-east-1",
        HashMap::from([(target, Attribution::instance("us-east-1", "i-same"))]),
    );

    let batch = [target];
    let first = classifier
        .classify("us-east-1", &batch)
        .await
        .expect("first query succeeds");
    let second = classifier
        .classify("us-east-1", &batch)
        .await
        .expect("second query succeeds");

    assert_eq!(first, second, "same region and batch yield identical records");
    assert_eq!(classifier.call_count(), 2);
}

#[tokio::test]
async fn repeated_runs_produce_identical_reports() {
    let target = addr("10.0.0.5");
    let classifier = StaticClassifier::new(
        "private-instance",
        "us-east-1",
        HashMap::from([(target, Attribution::instance("us-east-1", "i-stable"))]),
    );

    let (engine, _events) = AttributionEngine::new(
        vec![classifier],
        StaticRegions::new(&["us-east-1"]),
        MockResolver::new(HashMap::new()),
        EngineConfig::default(),
    )
    .expect("engine construction succeeds");

    let first = engine.resolve(&[target]).await.expect("first run");
    let second = engine.resolve(&[target]).await.expect("second run");

    assert_eq!(first.entries, second.entries);
}
