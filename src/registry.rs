// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Service registry client.
//!
//! The probe's view of the cluster is a thin key-value query interface over
//! services, endpoints, and pods. The [`Registry`] trait is that interface;
//! [`KubeRegistry`] implements it over the Kubernetes API. Tests substitute
//! in-memory fakes, which is the whole reason this seam exists.
//!
//! Every call is a single attempt: any API failure surfaces as a terminal
//! [`CheckError::Registry`].

use crate::errors::CheckError;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Endpoints, Pod, Service};
use kube::{api::ListParams, Api, Client};
use std::net::IpAddr;
use tracing::debug;

/// Port a DNS endpoint subset must serve to count as a nameserver.
const DNS_PORT: i32 = 53;

/// Registry record for the service under test.
///
/// `cluster_ip` is kept as the raw registry string because the Kubernetes
/// API uses the literal `"None"` as the headless sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Service name
    pub name: String,
    /// Cluster IP string, or `"None"` for a headless service
    pub cluster_ip: String,
}

impl ServiceRecord {
    /// Whether this service is headless (no single virtual cluster IP).
    #[must_use]
    pub fn is_headless(&self) -> bool {
        self.cluster_ip == "None"
    }
}

/// Identity of the cluster's internal DNS service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsService {
    /// DNS service name (e.g. "kube-dns")
    pub name: String,
    /// The DNS service's cluster IP
    pub cluster_ip: IpAddr,
}

/// Cluster registry queries needed by the probe.
///
/// The probe issues each query at most a handful of times, strictly
/// sequentially; implementations do not need to cache or deduplicate.
#[async_trait]
pub trait Registry {
    /// Look up a service by exact name in a namespace.
    ///
    /// Returns `Ok(None)` when no service with that name exists; the caller
    /// decides whether absence is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry query itself fails.
    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceRecord>, CheckError>;

    /// Find the cluster DNS service in a namespace by label selector.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the matched service carries an
    /// unparsable cluster IP.
    async fn get_dns_service(
        &self,
        namespace: &str,
        node_selector: &str,
    ) -> Result<Option<DnsService>, CheckError>;

    /// IPs registered as endpoints of the DNS service.
    ///
    /// Only endpoint subsets serving port 53 are counted; a DNS service
    /// endpoint that does not serve DNS is not a nameserver.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints object cannot be fetched or carries
    /// an unparsable address.
    async fn dns_endpoint_ips(
        &self,
        namespace: &str,
        service_name: &str,
    ) -> Result<Vec<IpAddr>, CheckError>;

    /// IPs registered as endpoints of a headless service, across all subsets.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoints object cannot be fetched or carries
    /// an unparsable address.
    async fn headless_endpoint_ips(
        &self,
        namespace: &str,
        service_name: &str,
    ) -> Result<Vec<IpAddr>, CheckError>;

    /// IPs of pods in a namespace matching a label selector.
    ///
    /// Pods without an assigned IP (still scheduling) are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pod list query fails or a pod reports an
    /// unparsable IP.
    async fn pod_ips(
        &self,
        namespace: &str,
        node_selector: &str,
    ) -> Result<Vec<IpAddr>, CheckError>;
}

/// [`Registry`] implementation over the Kubernetes API.
pub struct KubeRegistry {
    client: Client,
}

impl KubeRegistry {
    /// Create a registry backed by the given Kubernetes client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Registry for KubeRegistry {
    async fn get_service(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<ServiceRecord>, CheckError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().fields(&format!("metadata.name={name}"));

        debug!("Listing services in '{}' with field selector 'metadata.name={}'", namespace, name);
        let services = api.list(&params).await?;

        Ok(services.items.into_iter().next().map(|svc| ServiceRecord {
            name: svc.metadata.name.unwrap_or_else(|| name.to_string()),
            cluster_ip: svc
                .spec
                .and_then(|spec| spec.cluster_ip)
                .unwrap_or_else(|| "None".to_string()),
        }))
    }

    async fn get_dns_service(
        &self,
        namespace: &str,
        node_selector: &str,
    ) -> Result<Option<DnsService>, CheckError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(node_selector);

        debug!("Listing services in '{}' with label selector '{}'", namespace, node_selector);
        let services = api.list(&params).await?;

        let Some(svc) = services.items.into_iter().next() else {
            return Ok(None);
        };

        let name = svc.metadata.name.unwrap_or_default();
        let raw_ip = svc
            .spec
            .and_then(|spec| spec.cluster_ip)
            .unwrap_or_default();
        let cluster_ip = parse_ip(&raw_ip, &format!("cluster IP of DNS service '{name}'"))?;

        Ok(Some(DnsService { name, cluster_ip }))
    }

    async fn dns_endpoint_ips(
        &self,
        namespace: &str,
        service_name: &str,
    ) -> Result<Vec<IpAddr>, CheckError> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), namespace);
        let endpoints = api.get(service_name).await?;

        let mut ips = Vec::new();
        for subset in endpoints.subsets.unwrap_or_default() {
            let serves_dns = subset
                .ports
                .as_ref()
                .is_some_and(|ports| ports.iter().any(|p| p.port == DNS_PORT));
            if !serves_dns {
                continue;
            }
            for address in subset.addresses.unwrap_or_default() {
                ips.push(parse_ip(
                    &address.ip,
                    &format!("endpoint of DNS service '{service_name}'"),
                )?);
            }
        }
        Ok(ips)
    }

    async fn headless_endpoint_ips(
        &self,
        namespace: &str,
        service_name: &str,
    ) -> Result<Vec<IpAddr>, CheckError> {
        let api: Api<Endpoints> = Api::namespaced(self.client.clone(), namespace);
        let endpoints = api.get(service_name).await?;

        let mut ips = Vec::new();
        for subset in endpoints.subsets.unwrap_or_default() {
            for address in subset.addresses.unwrap_or_default() {
                ips.push(parse_ip(
                    &address.ip,
                    &format!("endpoint of headless service '{service_name}'"),
                )?);
            }
        }
        Ok(ips)
    }

    async fn pod_ips(
        &self,
        namespace: &str,
        node_selector: &str,
    ) -> Result<Vec<IpAddr>, CheckError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(node_selector);
        let pods = api.list(&params).await?;

        let mut ips = Vec::new();
        for pod in pods.items {
            let name = pod.metadata.name.unwrap_or_default();
            let Some(pod_ip) = pod.status.and_then(|status| status.pod_ip) else {
                debug!("Pod '{}' has no IP assigned yet, skipping", name);
                continue;
            };
            ips.push(parse_ip(&pod_ip, &format!("IP of pod '{name}'"))?);
        }
        Ok(ips)
    }
}

fn parse_ip(value: &str, context: &str) -> Result<IpAddr, CheckError> {
    value.parse().map_err(|_| CheckError::InvalidAddress {
        value: value.to_string(),
        context: context.to_string(),
    })
}
