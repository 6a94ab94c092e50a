// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use dnsprobe::{
    config::Config,
    registry::KubeRegistry,
    report::{self, Report},
    resolver::HickoryResolver,
    verify::run_check,
};
use kube::Client;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("dnsprobe")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    // Initialize logging with custom format
    // Format: timestamp file:line LEVEL message
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug dnsprobe
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json dnsprobe
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let config = Config::parse();

    info!("HOSTNAME provided as: '{}'", config.hostname);
    if let Some(namespace) = &config.namespace {
        info!("NAMESPACE provided as: '{}'", namespace);
    }
    if let Some(selector) = &config.dns_node_selector {
        info!("DNS_NODE_SELECTOR provided as: '{}'", selector);
    }

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    let registry = KubeRegistry::new(client);
    let resolver = HickoryResolver::new();

    let outcome = run_check(
        &registry,
        &resolver,
        &config.hostname,
        config.namespace.as_deref(),
        config.dns_node_selector.as_deref(),
    )
    .await;

    let status = match &outcome {
        Ok(()) => {
            info!("DNS resolution check passed for '{}'", config.hostname);
            Report::success()
        }
        Err(err) => {
            error!("DNS resolution check failed: {}", err);
            Report::failure(err.to_string())
        }
    };

    match config.reporting_url.as_deref() {
        Some(url) => report::submit(url, &status).await?,
        None => debug!("KH_REPORTING_URL not set; relying on the exit code"),
    }

    if outcome.is_err() {
        std::process::exit(1);
    }
    Ok(())
}
