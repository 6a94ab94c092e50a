// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Hostname qualification parsing.
//!
//! A target hostname may be bare (`my-svc`) or namespace-qualified
//! (`my-svc.team-a`, `my-svc.team-a.svc.cluster.local`). Only the first two
//! segments matter for registry lookups: the first is the service name, the
//! second (when present) the namespace.

/// A target hostname split into its service name and namespace.
///
/// The original, unsplit hostname is retained because DNS queries are issued
/// for the full qualified form while registry lookups use the parsed parts.
///
/// # Example
///
/// ```rust
/// use dnsprobe::hostname::Hostname;
///
/// let bare = Hostname::parse("my-svc");
/// assert_eq!(bare.name, "my-svc");
/// assert_eq!(bare.namespace, "default");
///
/// let qualified = Hostname::parse("my-svc.team-a.svc.cluster.local");
/// assert_eq!(qualified.name, "my-svc");
/// assert_eq!(qualified.namespace, "team-a");
/// assert_eq!(qualified.raw, "my-svc.team-a.svc.cluster.local");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostname {
    /// The hostname exactly as provided
    pub raw: String,
    /// Service name (first dot-separated segment)
    pub name: String,
    /// Namespace (second segment, or "default" when unqualified)
    pub namespace: String,
}

impl Hostname {
    /// Parse a hostname, inferring the namespace from the second segment.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw.split('.');
        let name = segments.next().unwrap_or(raw).to_string();
        let namespace = segments
            .next()
            .map_or_else(|| "default".to_string(), ToString::to_string);

        Self {
            raw: raw.to_string(),
            name,
            namespace,
        }
    }

    /// Whether the hostname carried an explicit namespace segment.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.raw.contains('.')
    }
}
