// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`
//!
//! Tests parse from explicit flags rather than environment variables:
//! flags take precedence, so these stay stable no matter what HOSTNAME the
//! test runner itself has exported.

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use clap::Parser;

    #[test]
    fn test_hostname_alone_is_enough() {
        let config = Config::try_parse_from(["dnsprobe", "--hostname", "my-svc"]).unwrap();

        assert_eq!(config.hostname, "my-svc");
        assert!(config.namespace.is_none());
        assert!(config.dns_node_selector.is_none());
        assert!(!config.topology_check_enabled());
    }

    #[test]
    fn test_topology_check_requires_both_inputs() {
        let config = Config::try_parse_from([
            "dnsprobe",
            "--hostname",
            "my-svc",
            "--namespace",
            "kube-system",
        ])
        .unwrap();

        assert!(!config.topology_check_enabled());

        let config = Config::try_parse_from([
            "dnsprobe",
            "--hostname",
            "my-svc",
            "--namespace",
            "kube-system",
            "--dns-node-selector",
            "k8s-app=kube-dns",
        ])
        .unwrap();

        assert!(config.topology_check_enabled());
    }

    #[test]
    fn test_reporting_url_is_optional() {
        let config = Config::try_parse_from([
            "dnsprobe",
            "--hostname",
            "my-svc",
            "--reporting-url",
            "http://kuberhealthy.kuberhealthy.svc/external-check",
        ])
        .unwrap();

        assert_eq!(
            config.reporting_url.as_deref(),
            Some("http://kuberhealthy.kuberhealthy.svc/external-check")
        );
    }
}
