// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Topology snapshot builder.
//!
//! First of the probe's two phases. Resolves, through the registry alone (no
//! DNS queries), everything the reconciler will treat as ground truth:
//!
//! - optionally, the cluster DNS service's identity, endpoint IPs, and the
//!   pod IPs backing it (only when both a namespace and a node selector were
//!   configured);
//! - the parsed target hostname;
//! - the target service's registry record.
//!
//! The endpoint-subset-of-pods invariant is enforced here, before any DNS
//! query is issued: when the DNS service routes to endpoints that no selected
//! pod owns, any further resolution result would be meaningless.

use crate::errors::CheckError;
use crate::hostname::Hostname;
use crate::ipset::{difference, is_subset, sorted};
use crate::registry::{Registry, ServiceRecord};
use std::net::IpAddr;
use tracing::info;

/// Ground truth about the cluster DNS service, gathered from the registry.
///
/// Present only when both `NAMESPACE` and `DNS_NODE_SELECTOR` were supplied;
/// absence is a deliberate degraded mode, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsTopology {
    /// Name of the cluster DNS service (e.g. "kube-dns")
    pub service_name: String,
    /// Cluster IP of the DNS service, used as the nameserver for the
    /// master-service sanity check
    pub service_ip: IpAddr,
    /// Sorted IPs registered as DNS service endpoints; these are the
    /// nameservers the full check queries one by one
    pub endpoint_ips: Vec<IpAddr>,
    /// Sorted IPs of the pods matching the node selector
    pub pod_ips: Vec<IpAddr>,
}

/// Everything the consistency reconciler needs, built once per run.
///
/// Write-once: constructed from registry responses, read by the reconciler,
/// never mutated.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// DNS service topology, when topology checking was enabled
    pub topology: Option<DnsTopology>,
    /// Registry record of the service under test
    pub target: ServiceRecord,
    /// The parsed target hostname
    pub hostname: Hostname,
}

/// Build the topology snapshot for one probe run.
///
/// Runs strictly before any DNS query. Fails fast on the first
/// inconsistency; a returned snapshot is internally consistent.
///
/// # Arguments
///
/// * `registry` - Cluster registry client
/// * `hostname` - Target hostname, optionally namespace-qualified
/// * `namespace` - Namespace of the cluster DNS service, if configured
/// * `node_selector` - Label selector for the DNS service and pods, if configured
///
/// # Errors
///
/// * [`CheckError::DnsServiceNotFound`] - topology checking was enabled but
///   no DNS service matched the selector
/// * [`CheckError::TopologyInconsistency`] - DNS endpoint IPs are not a
///   subset of the selected pod IPs
/// * [`CheckError::ServiceNotFound`] - the target hostname has no service
///   record in its inferred namespace
/// * [`CheckError::Registry`] - a registry query failed
pub async fn build_snapshot<R: Registry + ?Sized>(
    registry: &R,
    hostname: &str,
    namespace: Option<&str>,
    node_selector: Option<&str>,
) -> Result<Snapshot, CheckError> {
    let topology = match (namespace, node_selector) {
        (Some(namespace), Some(node_selector)) => {
            info!("NAMESPACE and DNS_NODE_SELECTOR have both been provided. DNS endpoint checking is enabled.");
            Some(build_dns_topology(registry, namespace, node_selector).await?)
        }
        _ => {
            info!(
                "NAMESPACE is {:?} and DNS_NODE_SELECTOR is {:?}. They both need to be provided for DNS endpoint checks. Skipping",
                namespace, node_selector
            );
            None
        }
    };

    let hostname = parse_hostname(hostname);

    info!(
        "Looking for hostname '{}' in namespace '{}'",
        hostname.name, hostname.namespace
    );
    let target = registry
        .get_service(&hostname.namespace, &hostname.name)
        .await?
        .ok_or_else(|| CheckError::ServiceNotFound {
            name: hostname.name.clone(),
            namespace: hostname.namespace.clone(),
        })?;
    info!(
        "Found service '{}' with ClusterIP '{}'",
        hostname.raw, target.cluster_ip
    );

    Ok(Snapshot {
        topology,
        target,
        hostname,
    })
}

/// Discover the DNS service and verify its endpoints against its pods.
async fn build_dns_topology<R: Registry + ?Sized>(
    registry: &R,
    namespace: &str,
    node_selector: &str,
) -> Result<DnsTopology, CheckError> {
    let dns_svc = registry
        .get_dns_service(namespace, node_selector)
        .await?
        .ok_or_else(|| CheckError::DnsServiceNotFound {
            namespace: namespace.to_string(),
            node_selector: node_selector.to_string(),
        })?;
    info!(
        "Successfully found DNS service '{}' with IP '{}'",
        dns_svc.name, dns_svc.cluster_ip
    );

    let endpoint_ips = sorted(registry.dns_endpoint_ips(namespace, &dns_svc.name).await?);
    let pod_ips = sorted(registry.pod_ips(namespace, node_selector).await?);
    info!("Found DNS endpoint IPs: {:?}", endpoint_ips);
    info!("Found DNS pod IPs: {:?}", pod_ips);

    // Every registered endpoint must be backed by a selected pod.
    if !is_subset(&endpoint_ips, &pod_ips) {
        let orphaned = difference(&endpoint_ips, &pod_ips);
        tracing::error!("DNS endpoints {:?} have no backing pod", orphaned);
        return Err(CheckError::TopologyInconsistency {
            endpoint_ips,
            pod_ips,
        });
    }
    info!("Successfully matched DNS endpoint and pod IPs.");

    Ok(DnsTopology {
        service_name: dns_svc.name,
        service_ip: dns_svc.cluster_ip,
        endpoint_ips,
        pod_ips,
    })
}

fn parse_hostname(raw: &str) -> Hostname {
    let hostname = Hostname::parse(raw);
    if hostname.is_qualified() {
        info!(
            "HOSTNAME '{}' seems to be qualified. Inferring namespace '{}'",
            hostname.raw, hostname.namespace
        );
    } else {
        info!(
            "Non-qualified HOSTNAME '{}' was given. Assuming namespace '{}'",
            hostname.raw, hostname.namespace
        );
    }
    hostname
}
