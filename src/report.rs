// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kuberhealthy status reporting.
//!
//! When the probe runs as a Kuberhealthy external check, Kuberhealthy injects
//! `KH_REPORTING_URL` and expects a single JSON status POST before the pod
//! exits: `{"OK": bool, "Errors": [..]}`. This module builds and submits that
//! report. Without a reporting URL the probe is still usable standalone; the
//! caller falls back to exit codes.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::info;

/// A Kuberhealthy check status report.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Report {
    /// Whether the check passed
    #[serde(rename = "OK")]
    pub ok: bool,
    /// Human-readable failure reasons; empty on success
    #[serde(rename = "Errors")]
    pub errors: Vec<String>,
}

impl Report {
    /// A passing report.
    #[must_use]
    pub fn success() -> Self {
        Self {
            ok: true,
            errors: Vec::new(),
        }
    }

    /// A failing report with one reason.
    #[must_use]
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            errors: vec![reason.into()],
        }
    }
}

/// POST a status report to the Kuberhealthy reporting endpoint.
///
/// # Errors
///
/// Returns an error if the request cannot be sent or Kuberhealthy answers
/// with a non-success status. A failed report submission must fail the pod:
/// otherwise Kuberhealthy would time the check out with no diagnostics.
pub async fn submit(url: &str, report: &Report) -> Result<()> {
    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .json(report)
        .send()
        .await
        .with_context(|| format!("failed to POST check status to '{url}'"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Kuberhealthy reporting endpoint '{url}' answered {status}");
    }

    info!("Reported status OK={} to '{}'", report.ok, url);
    Ok(())
}
