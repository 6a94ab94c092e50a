// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `topology.rs`
//!
//! Uses an in-memory registry fake; the snapshot builder never touches DNS,
//! so no resolver is involved here at all.

#[cfg(test)]
mod tests {
    use crate::errors::CheckError;
    use crate::registry::{DnsService, Registry, ServiceRecord};
    use crate::topology::build_snapshot;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::net::IpAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[derive(Default)]
    struct FakeRegistry {
        services: HashMap<(String, String), ServiceRecord>,
        dns_service: Option<DnsService>,
        dns_endpoints: Vec<IpAddr>,
        pod_ips: Vec<IpAddr>,
    }

    impl FakeRegistry {
        fn with_service(mut self, namespace: &str, record: ServiceRecord) -> Self {
            self.services
                .insert((namespace.to_string(), record.name.clone()), record);
            self
        }

        fn with_dns(mut self, service_ip: &str, endpoints: &[&str], pods: &[&str]) -> Self {
            self.dns_service = Some(DnsService {
                name: "kube-dns".to_string(),
                cluster_ip: ip(service_ip),
            });
            self.dns_endpoints = endpoints.iter().map(|s| ip(s)).collect();
            self.pod_ips = pods.iter().map(|s| ip(s)).collect();
            self
        }
    }

    #[async_trait]
    impl Registry for FakeRegistry {
        async fn get_service(
            &self,
            namespace: &str,
            name: &str,
        ) -> Result<Option<ServiceRecord>, CheckError> {
            Ok(self
                .services
                .get(&(namespace.to_string(), name.to_string()))
                .cloned())
        }

        async fn get_dns_service(
            &self,
            _namespace: &str,
            _node_selector: &str,
        ) -> Result<Option<DnsService>, CheckError> {
            Ok(self.dns_service.clone())
        }

        async fn dns_endpoint_ips(
            &self,
            _namespace: &str,
            _service_name: &str,
        ) -> Result<Vec<IpAddr>, CheckError> {
            Ok(self.dns_endpoints.clone())
        }

        async fn headless_endpoint_ips(
            &self,
            _namespace: &str,
            _service_name: &str,
        ) -> Result<Vec<IpAddr>, CheckError> {
            Ok(Vec::new())
        }

        async fn pod_ips(
            &self,
            _namespace: &str,
            _node_selector: &str,
        ) -> Result<Vec<IpAddr>, CheckError> {
            Ok(self.pod_ips.clone())
        }
    }

    fn svc(name: &str, cluster_ip: &str) -> ServiceRecord {
        ServiceRecord {
            name: name.to_string(),
            cluster_ip: cluster_ip.to_string(),
        }
    }

    #[tokio::test]
    async fn test_builds_topology_when_fully_configured() {
        let registry = FakeRegistry::default()
            .with_dns("10.96.0.10", &["10.0.0.2", "10.0.0.1"], &["10.0.0.1", "10.0.0.2", "10.0.0.3"])
            .with_service("default", svc("my-svc", "10.96.1.5"));

        let snapshot = build_snapshot(
            &registry,
            "my-svc",
            Some("kube-system"),
            Some("k8s-app=kube-dns"),
        )
        .await
        .unwrap();

        let topology = snapshot.topology.expect("topology should be present");
        assert_eq!(topology.service_name, "kube-dns");
        assert_eq!(topology.service_ip, ip("10.96.0.10"));
        // Sorted for deterministic comparison downstream.
        assert_eq!(topology.endpoint_ips, vec![ip("10.0.0.1"), ip("10.0.0.2")]);
        assert_eq!(snapshot.target.cluster_ip, "10.96.1.5");
    }

    #[tokio::test]
    async fn test_missing_selector_skips_topology() {
        let registry =
            FakeRegistry::default().with_service("default", svc("my-svc", "10.96.1.5"));

        let snapshot = build_snapshot(&registry, "my-svc", Some("kube-system"), None)
            .await
            .unwrap();

        assert!(snapshot.topology.is_none());
    }

    #[tokio::test]
    async fn test_missing_namespace_skips_topology() {
        let registry =
            FakeRegistry::default().with_service("default", svc("my-svc", "10.96.1.5"));

        let snapshot = build_snapshot(&registry, "my-svc", None, Some("k8s-app=kube-dns"))
            .await
            .unwrap();

        assert!(snapshot.topology.is_none());
    }

    #[tokio::test]
    async fn test_endpoint_not_backed_by_pod_is_terminal() {
        // 10.0.0.9 is registered as an endpoint but no selected pod owns it.
        let registry = FakeRegistry::default()
            .with_dns("10.96.0.10", &["10.0.0.1", "10.0.0.9"], &["10.0.0.1", "10.0.0.2"])
            .with_service("default", svc("my-svc", "10.96.1.5"));

        let error = build_snapshot(
            &registry,
            "my-svc",
            Some("kube-system"),
            Some("k8s-app=kube-dns"),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, CheckError::TopologyInconsistency { .. }));
        assert!(error.to_string().contains("10.0.0.9"));
    }

    #[tokio::test]
    async fn test_no_dns_service_matching_selector_is_terminal() {
        let registry =
            FakeRegistry::default().with_service("default", svc("my-svc", "10.96.1.5"));

        let error = build_snapshot(
            &registry,
            "my-svc",
            Some("kube-system"),
            Some("k8s-app=kube-dns"),
        )
        .await
        .unwrap_err();

        assert!(matches!(error, CheckError::DnsServiceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unknown_target_service_is_terminal() {
        let registry = FakeRegistry::default();

        let error = build_snapshot(&registry, "ghost-svc", None, None)
            .await
            .unwrap_err();

        match error {
            CheckError::ServiceNotFound { name, namespace } => {
                assert_eq!(name, "ghost-svc");
                assert_eq!(namespace, "default");
            }
            other => panic!("expected ServiceNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_qualified_hostname_looks_up_inferred_namespace() {
        let registry =
            FakeRegistry::default().with_service("team-a", svc("my-svc", "10.96.1.5"));

        let snapshot = build_snapshot(&registry, "my-svc.team-a", None, None)
            .await
            .unwrap();

        assert_eq!(snapshot.hostname.name, "my-svc");
        assert_eq!(snapshot.hostname.namespace, "team-a");
        assert_eq!(snapshot.target.cluster_ip, "10.96.1.5");
    }

    #[tokio::test]
    async fn test_headless_sentinel_survives_snapshot() {
        let registry =
            FakeRegistry::default().with_service("default", svc("headless-svc", "None"));

        let snapshot = build_snapshot(&registry, "headless-svc", None, None)
            .await
            .unwrap();

        assert!(snapshot.target.is_headless());
    }
}
