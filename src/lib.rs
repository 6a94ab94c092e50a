// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Dnsprobe - Kubernetes DNS Resolution Checker
//!
//! Dnsprobe is a one-shot diagnostic probe that verifies DNS service
//! discovery inside a Kubernetes cluster: it confirms that the cluster's
//! internal DNS resolves a target service's hostname to the IPs the service
//! registry actually assigns to it, and (optionally) that the DNS system's
//! own backing pods are consistent with its registered endpoints.
//!
//! ## Overview
//!
//! The probe runs two phases strictly in sequence:
//!
//! 1. [`topology::build_snapshot`] resolves the expected state from the
//!    registry alone: the DNS service's endpoint and pod IPs (when a
//!    namespace and node selector are configured) and the target service's
//!    record.
//! 2. [`verify::verify_snapshot`] issues the DNS queries the snapshot calls
//!    for and folds the answers into a single pass/fail verdict, degrading
//!    gracefully through four verification modes depending on what the
//!    snapshot could discover.
//!
//! Every failure is fatal; the probe reports one verdict and terminates.
//! Designed to run as a [Kuberhealthy](https://github.com/kuberhealthy)
//! external check, but usable standalone via exit codes.
//!
//! ## Modules
//!
//! - [`config`] - Environment/flag configuration
//! - [`hostname`] - Hostname qualification parsing
//! - [`topology`] - Topology snapshot builder
//! - [`verify`] - Consistency reconciler and check modes
//! - [`registry`] - Cluster registry client (Kubernetes API)
//! - [`resolver`] - DNS protocol client (hickory-resolver)
//! - [`report`] - Kuberhealthy status reporting
//! - [`errors`] - Fatal error taxonomy
//!
//! ## Example
//!
//! ```rust,no_run
//! use dnsprobe::registry::KubeRegistry;
//! use dnsprobe::resolver::HickoryResolver;
//! use dnsprobe::verify::run_check;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = kube::Client::try_default().await?;
//! let registry = KubeRegistry::new(client);
//! let resolver = HickoryResolver::new();
//!
//! run_check(
//!     &registry,
//!     &resolver,
//!     "my-svc.team-a",
//!     Some("kube-system"),
//!     Some("k8s-app=kube-dns"),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod hostname;
pub mod ipset;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod topology;
pub mod verify;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod ipset_tests;
#[cfg(test)]
mod topology_tests;
