// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod config;
mod error;
mod identity;
mod routes;

#[cfg(test)]
mod tests;

use axum::Router;
use clap::Parser;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use waste_billing_api::{BillingSettings, MemberInfo, bootstrap_admin};
use waste_billing_persistence::SqlitePersistence;

use crate::config::Args;
use crate::routes::build_router;

/// Application state shared across handlers.
///
/// The persistence layer sits behind an async mutex so that every API call
/// runs against the single connection in turn. Settings never change after
/// startup.
#[derive(Clone)]
pub struct AppState {
    /// The persistence layer.
    pub persistence: Arc<Mutex<SqlitePersistence>>,
    /// Rate table and completion policy.
    pub settings: Arc<BillingSettings>,
}

impl AppState {
    /// Wraps an opened database and the startup settings.
    #[must_use]
    pub fn new(persistence: SqlitePersistence, settings: BillingSettings) -> Self {
        Self {
            persistence: Arc::new(Mutex::new(persistence)),
            settings: Arc::new(settings),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Waste Billing Server");

    let settings: BillingSettings = args.billing_settings()?;
    info!(
        completion_policy = settings.completion_policy.as_str(),
        "Loaded billing settings"
    );

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let admin: Option<MemberInfo> = bootstrap_admin(&mut persistence, &args.bootstrap_admin)?;
    if let Some(admin) = admin {
        info!(
            member_id = ?admin.member_id,
            display_name = %admin.display_name,
            "Bootstrapped administrator"
        );
    }

    // Build router
    let app: Router = build_router(AppState::new(persistence, settings));

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
