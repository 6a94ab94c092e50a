// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ipset.rs`

#[cfg(test)]
mod tests {
    use crate::ipset::{difference, is_subset, sorted};
    use std::net::IpAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_sorted_orders_addresses() {
        let ips = sorted(vec![ip("10.0.1.2"), ip("10.0.0.5"), ip("10.0.1.1")]);

        assert_eq!(ips, vec![ip("10.0.0.5"), ip("10.0.1.1"), ip("10.0.1.2")]);
    }

    #[test]
    fn test_difference_reports_only_missing() {
        let left = vec![ip("10.0.0.1"), ip("10.0.0.9")];
        let right = vec![ip("10.0.0.1"), ip("10.0.0.2")];

        assert_eq!(difference(&left, &right), vec![ip("10.0.0.9")]);
    }

    #[test]
    fn test_subset_holds_for_equal_sets() {
        let ips = vec![ip("10.0.0.1"), ip("10.0.0.2")];

        assert!(is_subset(&ips, &ips));
    }

    #[test]
    fn test_empty_set_is_subset_of_anything() {
        assert!(is_subset(&[], &[ip("10.0.0.1")]));
        assert!(is_subset(&[], &[]));
    }

    #[test]
    fn test_nonempty_set_is_not_subset_of_empty() {
        assert!(!is_subset(&[ip("10.0.0.1")], &[]));
    }
}
