// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Integration tests for the DNS resolution probe.
//!
//! These run the real registry and resolver clients against a live cluster
//! and are skipped everywhere else.
//!
//! Run with: cargo test --test cluster_integration -- --ignored

use dnsprobe::registry::{KubeRegistry, Registry};
use dnsprobe::resolver::HickoryResolver;
use dnsprobe::verify::run_check;
use kube::Client;

/// Test helper to check if running in a Kubernetes cluster
async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {e}");
            None
        }
    }
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with working DNS"]
async fn test_kubernetes_master_service_passes_degraded_check() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let registry = KubeRegistry::new(client);
    let resolver = HickoryResolver::new();

    // The API server's own service record always exists; with no namespace
    // or selector configured this exercises the single-nameserver mode.
    let result = run_check(&registry, &resolver, "kubernetes.default", None, None).await;

    assert!(result.is_ok(), "degraded check failed: {result:?}");
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster with working DNS"]
async fn test_full_check_against_cluster_dns() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let registry = KubeRegistry::new(client);
    let resolver = HickoryResolver::new();

    let result = run_check(
        &registry,
        &resolver,
        "kubernetes.default",
        Some("kube-system"),
        Some("k8s-app=kube-dns"),
    )
    .await;

    assert!(result.is_ok(), "full check failed: {result:?}");
}

#[tokio::test]
#[ignore = "requires a Kubernetes cluster"]
async fn test_registry_finds_cluster_dns_endpoints() {
    let Some(client) = get_kube_client_or_skip().await else {
        return;
    };
    let registry = KubeRegistry::new(client);

    let dns_svc = registry
        .get_dns_service("kube-system", "k8s-app=kube-dns")
        .await
        .expect("DNS service lookup failed")
        .expect("no DNS service matched k8s-app=kube-dns");

    let endpoints = registry
        .dns_endpoint_ips("kube-system", &dns_svc.name)
        .await
        .expect("endpoint lookup failed");

    assert!(
        !endpoints.is_empty(),
        "cluster DNS service '{}' has no endpoints serving port 53",
        dns_svc.name
    );
}
