// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the DNS resolution check.
//!
//! Every error in this taxonomy is fatal: the probe runs once, and the first
//! failing check terminates the run. Each variant carries the offending
//! identifier (nameserver, hostname, or service name) and, where applicable,
//! both the expected and actual values, so a failure is actionable without
//! re-running the probe.

use std::net::IpAddr;
use thiserror::Error;

/// Errors raised by the DNS resolution check.
#[derive(Error, Debug)]
pub enum CheckError {
    /// No DNS service matched the configured node selector.
    ///
    /// Raised by the topology snapshot builder when `NAMESPACE` and
    /// `DNS_NODE_SELECTOR` are both set but no service in that namespace
    /// carries the selector's labels.
    #[error("Could not find a DNS service in namespace '{namespace}' matching selector '{node_selector}'")]
    DnsServiceNotFound {
        /// Namespace that was searched
        namespace: String,
        /// Label selector the DNS service was expected to match
        node_selector: String,
    },

    /// The DNS service's registered endpoint IPs are not a subset of the
    /// pod IPs matching the node selector.
    ///
    /// Every registered endpoint must correspond to a real, selected pod;
    /// an endpoint without a backing pod means the DNS service is routing
    /// traffic to something that no longer exists.
    #[error("DNS service has mismatching endpoints and pod IPs! endpoints {endpoint_ips:?} are not all backed by pods {pod_ips:?}")]
    TopologyInconsistency {
        /// IPs currently registered as DNS service endpoints
        endpoint_ips: Vec<IpAddr>,
        /// IPs of the pods matching the DNS node selector
        pod_ips: Vec<IpAddr>,
    },

    /// The target hostname has no service record in the inferred namespace.
    #[error("Could not find service '{name}'. Check that it exists in the '{namespace}' namespace")]
    ServiceNotFound {
        /// Service name parsed from the hostname
        name: String,
        /// Namespace inferred from the hostname (or "default")
        namespace: String,
    },

    /// The cluster's master DNS entry point (`kubernetes.default`) did not
    /// resolve. Nothing else is worth checking when this fails.
    #[error("Failed to resolve the kubernetes master service via nameserver '{nameserver}': {reason}")]
    MasterResolutionFailed {
        /// Nameserver that was queried ("default" for the system resolver)
        nameserver: String,
        /// Underlying resolution failure
        reason: String,
    },

    /// A nameserver answered with IPs outside the expected set for the
    /// target hostname.
    #[error("Nameserver '{nameserver}' resolved '{hostname}' to {answer:?} when the expected IPs were {expected:?}")]
    AnswerMismatch {
        /// Nameserver that produced the bad answer ("default" for the
        /// system resolver)
        nameserver: String,
        /// The hostname that was queried
        hostname: String,
        /// The sorted answer the nameserver returned
        answer: Vec<IpAddr>,
        /// The sorted set of IPs considered correct
        expected: Vec<IpAddr>,
    },

    /// The registry returned an address string that does not parse as an IP.
    #[error("Registry returned unparsable IP address '{value}' for {context}")]
    InvalidAddress {
        /// The raw address string from the registry
        value: String,
        /// What the address was supposed to identify
        context: String,
    },

    /// A Kubernetes API call failed.
    #[error("Registry lookup failed: {0}")]
    Registry(#[from] kube::Error),

    /// A DNS query failed outright (NXDOMAIN, timeout, unreachable
    /// nameserver, or an empty answer section).
    #[error("DNS resolution of '{hostname}' failed: {reason}")]
    Resolution {
        /// The hostname that failed to resolve
        hostname: String,
        /// Underlying resolver failure
        reason: String,
    },
}
