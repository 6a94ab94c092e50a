// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Small IP set utilities.
//!
//! IP sets in this probe are plain sorted `Vec<IpAddr>` values. They are tiny
//! (a handful of endpoints at most), compared once, and included verbatim in
//! diagnostics, so a sorted vector beats a hash set for determinism and
//! readable error messages.

use std::net::IpAddr;

/// Sort an IP list in place and return it.
///
/// Every set in the probe is sorted before comparison so that verdicts and
/// diagnostics are deterministic regardless of registry or answer order.
#[must_use]
pub fn sorted(mut ips: Vec<IpAddr>) -> Vec<IpAddr> {
    ips.sort_unstable();
    ips
}

/// IPs present in `left` but absent from `right`.
///
/// An empty difference means `left` is a subset of `right`, which is the
/// pass condition for both the endpoint/pod topology invariant and the
/// answer-vs-expected comparison.
#[must_use]
pub fn difference(left: &[IpAddr], right: &[IpAddr]) -> Vec<IpAddr> {
    left.iter()
        .filter(|ip| !right.contains(ip))
        .copied()
        .collect()
}

/// Whether every IP in `left` also appears in `right`.
#[must_use]
pub fn is_subset(left: &[IpAddr], right: &[IpAddr]) -> bool {
    difference(left, right).is_empty()
}
