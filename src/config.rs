// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Probe configuration.
//!
//! The probe is normally deployed as a Kuberhealthy check pod, so every input
//! arrives as an environment variable. Flags are accepted too so the probe
//! can be run by hand against a cluster (`dnsprobe --hostname my-svc`).
//!
//! `HOSTNAME` is the only required input. DNS topology checking is enabled
//! only when both `NAMESPACE` and `DNS_NODE_SELECTOR` are present; leaving
//! either unset deliberately degrades the probe to single-nameserver
//! verification.

use clap::Parser;

/// Configuration for a single probe run.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dnsprobe",
    version,
    about = "Verifies that in-cluster DNS resolves a service to its registered IPs"
)]
pub struct Config {
    /// Hostname of the service under test, optionally namespace-qualified
    /// (e.g. "my-svc" or "my-svc.team-a")
    #[arg(long, env = "HOSTNAME")]
    pub hostname: String,

    /// Namespace of the cluster DNS service (usually "kube-system")
    #[arg(long, env = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Label selector identifying the DNS service and its pods
    /// (e.g. "k8s-app=kube-dns")
    #[arg(long = "dns-node-selector", env = "DNS_NODE_SELECTOR")]
    pub dns_node_selector: Option<String>,

    /// Kuberhealthy reporting endpoint; when unset the verdict is only
    /// logged and reflected in the exit code
    #[arg(long = "reporting-url", env = "KH_REPORTING_URL")]
    pub reporting_url: Option<String>,
}

impl Config {
    /// Whether DNS topology checking is enabled for this run.
    #[must_use]
    pub fn topology_check_enabled(&self) -> bool {
        self.namespace.is_some() && self.dns_node_selector.is_some()
    }
}
