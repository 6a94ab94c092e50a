// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS protocol client.
//!
//! [`Resolve`] is the probe's one-method view of DNS: resolve a hostname to
//! its A/AAAA answer set, either through the ambient system resolver or
//! against an explicit list of nameserver IPs. [`HickoryResolver`] implements
//! it with hickory-resolver; tests substitute scripted fakes.
//!
//! When explicit nameservers are given, the system resolv.conf search path is
//! still applied so that short in-cluster names ("kubernetes.default",
//! "my-svc.team-a") resolve the same way they would through the default
//! resolver. One query, no retries beyond what the resolver itself does.

use crate::errors::CheckError;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use tracing::debug;

/// Port queried on explicit nameservers.
const DNS_PORT: u16 = 53;

/// A single-attempt DNS lookup.
#[async_trait]
pub trait Resolve {
    /// Resolve `hostname` to its answer IP set.
    ///
    /// With `nameservers = None` the ambient system resolver configuration is
    /// used; otherwise the query goes only to the given nameserver IPs.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Resolution`] for NXDOMAIN, timeouts, unreachable
    /// nameservers, or an empty answer section. An empty answer is an error
    /// because the probe always expects the hostname to exist.
    async fn resolve(
        &self,
        hostname: &str,
        nameservers: Option<&[IpAddr]>,
    ) -> Result<Vec<IpAddr>, CheckError>;
}

/// [`Resolve`] implementation backed by hickory-resolver over UDP.
#[derive(Debug, Default)]
pub struct HickoryResolver;

impl HickoryResolver {
    /// Create a resolver client.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn targeted(hostname: &str, nameservers: &[IpAddr]) -> TokioAsyncResolver {
        let group = NameServerConfigGroup::from_ips_clear(nameservers, DNS_PORT, true);

        // Carry the system search path over so short cluster names still
        // qualify; outside a cluster there may be no resolv.conf at all.
        let (config, opts) = match read_system_conf() {
            Ok((system, opts)) => (
                ResolverConfig::from_parts(system.domain().cloned(), system.search().to_vec(), group),
                opts,
            ),
            Err(err) => {
                debug!(
                    "Could not read system resolver configuration ({}); querying '{}' without a search path",
                    err, hostname
                );
                (
                    ResolverConfig::from_parts(None, Vec::new(), group),
                    ResolverOpts::default(),
                )
            }
        };

        TokioAsyncResolver::tokio(config, opts)
    }
}

#[async_trait]
impl Resolve for HickoryResolver {
    async fn resolve(
        &self,
        hostname: &str,
        nameservers: Option<&[IpAddr]>,
    ) -> Result<Vec<IpAddr>, CheckError> {
        let resolver = match nameservers {
            Some(ips) => Self::targeted(hostname, ips),
            None => TokioAsyncResolver::tokio_from_system_conf().map_err(|err| {
                CheckError::Resolution {
                    hostname: hostname.to_string(),
                    reason: format!("could not load system resolver configuration: {err}"),
                }
            })?,
        };

        let lookup = resolver
            .lookup_ip(hostname)
            .await
            .map_err(|err| CheckError::Resolution {
                hostname: hostname.to_string(),
                reason: err.to_string(),
            })?;

        let ips: Vec<IpAddr> = lookup.iter().collect();
        if ips.is_empty() {
            return Err(CheckError::Resolution {
                hostname: hostname.to_string(),
                reason: "nameserver returned an empty answer".to_string(),
            });
        }
        Ok(ips)
    }
}
