// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Consistency reconciler.
//!
//! Second of the probe's two phases: folds DNS answers against the
//! expectations recorded in the [`Snapshot`] and produces the single
//! pass/fail verdict.
//!
//! The reconciler always starts with a master-service sanity check
//! (`kubernetes.default` must resolve), then dispatches on a [`CheckMode`]
//! selected once from two facts: whether DNS endpoint IPs were discovered,
//! and whether the target service is headless.
//!
//! | endpoints known | headless | mode |
//! |-----------------|----------|------|
//! | yes | yes | [`CheckMode::Full`], expected = target's headless endpoint IPs |
//! | yes | no  | [`CheckMode::Full`], expected = target's cluster IP |
//! | no  | no  | [`CheckMode::SingleNameserver`], expected = target's cluster IP |
//! | no  | yes | [`CheckMode::SkippedHeadless`], no query issued |
//!
//! The full check queries every discovered DNS endpoint independently and
//! requires each of them to agree with the expected set: one stale replica
//! fails the whole run (the no-split-brain guarantee). Verification depth
//! degrades with available topology information rather than producing a
//! false pass: an unknown-topology headless target is an explicit no-op.

use crate::errors::CheckError;
use crate::ipset::{is_subset, sorted};
use crate::registry::Registry;
use crate::resolver::Resolve;
use crate::topology::Snapshot;
use std::net::IpAddr;
use tracing::{info, warn};

/// The master service every healthy cluster must be able to resolve.
pub const MASTER_SERVICE: &str = "kubernetes.default";

/// Nameserver label used in diagnostics when the system resolver answered.
const DEFAULT_NAMESERVER: &str = "default";

/// How much verification the available inputs allow.
///
/// Selected exactly once per run, then dispatched; the two booleans are
/// never re-derived mid-check.
///
/// # Example
///
/// ```rust
/// use dnsprobe::verify::CheckMode;
///
/// assert_eq!(CheckMode::select(true, true), CheckMode::Full);
/// assert_eq!(CheckMode::select(true, false), CheckMode::Full);
/// assert_eq!(CheckMode::select(false, false), CheckMode::SingleNameserver);
/// assert_eq!(CheckMode::select(false, true), CheckMode::SkippedHeadless);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    /// Query every discovered DNS endpoint independently and require each
    /// one to answer within the expected set.
    Full,
    /// No DNS endpoints known; best-effort single query against the system
    /// default nameserver.
    SingleNameserver,
    /// No DNS endpoints known and the target is headless: there is no
    /// expected set to compare against, so no check is performed.
    SkippedHeadless,
}

impl CheckMode {
    /// Select the verification mode from the two degradation facts.
    #[must_use]
    pub fn select(endpoints_known: bool, headless: bool) -> Self {
        match (endpoints_known, headless) {
            (true, _) => Self::Full,
            (false, false) => Self::SingleNameserver,
            (false, true) => Self::SkippedHeadless,
        }
    }
}

/// Run the full probe: build nothing, verify everything.
///
/// Takes a snapshot produced by [`crate::topology::build_snapshot`] and
/// reconciles DNS answers against it. Fail-fast: the first failing
/// comparison is the verdict.
///
/// # Errors
///
/// * [`CheckError::MasterResolutionFailed`] - `kubernetes.default` did not
///   resolve; reported before any target-specific check
/// * [`CheckError::AnswerMismatch`] - a queried nameserver answered outside
///   the expected IP set
/// * [`CheckError::Registry`] / [`CheckError::Resolution`] - a collaborator
///   call failed
pub async fn verify_snapshot<R, D>(
    registry: &R,
    resolver: &D,
    snapshot: &Snapshot,
) -> Result<(), CheckError>
where
    R: Registry + ?Sized,
    D: Resolve + ?Sized,
{
    check_master_service(resolver, snapshot).await?;

    let nameservers: &[IpAddr] = snapshot
        .topology
        .as_ref()
        .map_or(&[], |topology| topology.endpoint_ips.as_slice());
    let endpoints_known = !nameservers.is_empty();
    let headless = snapshot.target.is_headless();

    match CheckMode::select(endpoints_known, headless) {
        CheckMode::Full => full_check(registry, resolver, snapshot, nameservers).await,
        CheckMode::SingleNameserver => single_nameserver_check(resolver, snapshot).await,
        CheckMode::SkippedHeadless => {
            info!(
                "Service '{}' is headless and no DNS endpoints are known; nothing to compare against. Skipping resolution check",
                snapshot.hostname.raw
            );
            Ok(())
        }
    }
}

/// Verify that the Kubernetes master service resolves at all.
///
/// If this fails there is no point checking anything else: the cluster's
/// core DNS entry point is broken. Uses the discovered DNS service IP as the
/// nameserver when topology is known, the system default otherwise.
async fn check_master_service<D: Resolve + ?Sized>(
    resolver: &D,
    snapshot: &Snapshot,
) -> Result<(), CheckError> {
    info!("Attempting to resolve the kubernetes master service");

    let (nameservers, label) = match &snapshot.topology {
        Some(topology) => (
            Some(vec![topology.service_ip]),
            topology.service_ip.to_string(),
        ),
        None => (None, DEFAULT_NAMESERVER.to_string()),
    };

    resolver
        .resolve(MASTER_SERVICE, nameservers.as_deref())
        .await
        .map_err(|err| CheckError::MasterResolutionFailed {
            nameserver: label,
            reason: err.to_string(),
        })?;

    info!("Service '{}' resolved successfully", MASTER_SERVICE);
    Ok(())
}

/// Full cross-validation: every discovered DNS endpoint must agree.
async fn full_check<R, D>(
    registry: &R,
    resolver: &D,
    snapshot: &Snapshot,
    nameservers: &[IpAddr],
) -> Result<(), CheckError>
where
    R: Registry + ?Sized,
    D: Resolve + ?Sized,
{
    let expected = expected_ips(registry, snapshot).await?;

    info!(
        "Attempting to resolve '{}' with all DNS nameservers previously found",
        snapshot.hostname.raw
    );
    for nameserver in nameservers {
        let answer = sorted(
            resolver
                .resolve(&snapshot.hostname.raw, Some(std::slice::from_ref(nameserver)))
                .await?,
        );
        info!(
            "Nameserver '{}' resolved hostname to {:?}",
            nameserver, answer
        );
        if !is_subset(&answer, &expected) {
            return Err(CheckError::AnswerMismatch {
                nameserver: nameserver.to_string(),
                hostname: snapshot.hostname.raw.clone(),
                answer,
                expected,
            });
        }
    }
    info!("All nameservers resolved '{}' correctly!", snapshot.hostname.raw);
    Ok(())
}

/// Best-effort verification against the system default nameserver only.
async fn single_nameserver_check<D: Resolve + ?Sized>(
    resolver: &D,
    snapshot: &Snapshot,
) -> Result<(), CheckError> {
    let expected = vec![target_cluster_ip(snapshot)?];

    let answer = sorted(resolver.resolve(&snapshot.hostname.raw, None).await?);
    if !is_subset(&answer, &expected) {
        return Err(CheckError::AnswerMismatch {
            nameserver: DEFAULT_NAMESERVER.to_string(),
            hostname: snapshot.hostname.raw.clone(),
            answer,
            expected,
        });
    }
    info!(
        "Default nameserver resolved '{}' to {:?} which is correct!",
        snapshot.hostname.raw, answer
    );
    Ok(())
}

/// Derive the expected IP set for the target under a full check.
///
/// Headless targets have no cluster IP; their correct answer is the set of
/// backing pod IPs, looked up fresh from the target's own endpoints.
async fn expected_ips<R: Registry + ?Sized>(
    registry: &R,
    snapshot: &Snapshot,
) -> Result<Vec<IpAddr>, CheckError> {
    if snapshot.target.is_headless() {
        let ips = sorted(
            registry
                .headless_endpoint_ips(&snapshot.hostname.namespace, &snapshot.hostname.name)
                .await?,
        );
        if ips.is_empty() {
            // With no endpoints registered, any answer a nameserver gives
            // will be reported as a mismatch.
            warn!(
                "Headless service '{}' has no endpoint IPs registered",
                snapshot.hostname.raw
            );
        }
        info!(
            "Found endpoint IPs {:?} for headless service '{}'",
            ips, snapshot.hostname.raw
        );
        Ok(ips)
    } else {
        Ok(vec![target_cluster_ip(snapshot)?])
    }
}

fn target_cluster_ip(snapshot: &Snapshot) -> Result<IpAddr, CheckError> {
    snapshot
        .target
        .cluster_ip
        .parse()
        .map_err(|_| CheckError::InvalidAddress {
            value: snapshot.target.cluster_ip.clone(),
            context: format!("cluster IP of service '{}'", snapshot.hostname.raw),
        })
}

/// Build the snapshot and verify it, in order. The probe's entire core.
///
/// # Errors
///
/// Propagates the first failure from either phase; see
/// [`crate::topology::build_snapshot`] and [`verify_snapshot`].
pub async fn run_check<R, D>(
    registry: &R,
    resolver: &D,
    hostname: &str,
    namespace: Option<&str>,
    node_selector: Option<&str>,
) -> Result<(), CheckError>
where
    R: Registry + ?Sized,
    D: Resolve + ?Sized,
{
    let snapshot =
        crate::topology::build_snapshot(registry, hostname, namespace, node_selector).await?;
    verify_snapshot(registry, resolver, &snapshot).await
}
