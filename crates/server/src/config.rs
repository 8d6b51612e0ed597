// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Startup configuration: command-line arguments and the rate table.

use clap::Parser;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use waste_billing_api::BillingSettings;
use waste_billing_domain::{CompletionPolicy, DomainError, RateTable};

/// Waste Billing Server - HTTP server for waste pickup requests and billing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    pub database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    pub port: u16,

    /// JSON file mapping category names to per-kilogram rates. Listed
    /// categories override the standard tariff.
    #[arg(short, long)]
    pub rates: Option<PathBuf>,

    /// Only allow paid requests to be completed
    #[arg(long)]
    pub require_payment: bool,

    /// Display name of the administrator created on an empty database
    #[arg(long, default_value = "admin")]
    pub bootstrap_admin: String,
}

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read rate file {path}: {source}")]
    ReadRates {
        path: String,
        source: std::io::Error,
    },
    #[error("Rate file is not a JSON object of category rates: {0}")]
    ParseRates(#[from] serde_json::Error),
    #[error("Invalid rate table: {0}")]
    InvalidRates(DomainError),
}

/// Parses rate overrides and applies them on top of the standard tariff.
///
/// # Errors
///
/// Returns an error if the JSON is malformed, names an unknown category,
/// or contains a negative rate.
pub fn parse_rate_table(contents: &str) -> Result<RateTable, ConfigError> {
    let named: BTreeMap<String, Decimal> = serde_json::from_str(contents)?;
    let overrides: RateTable =
        RateTable::from_named_rates(named).map_err(ConfigError::InvalidRates)?;

    overrides
        .entries()
        .try_fold(RateTable::standard(), |table, (category, rate)| {
            table.with_rate(category, rate)
        })
        .map_err(ConfigError::InvalidRates)
}

/// Loads the rate table, falling back to the standard tariff.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_rate_table(path: Option<&Path>) -> Result<RateTable, ConfigError> {
    let Some(path) = path else {
        return Ok(RateTable::standard());
    };

    let contents: String =
        std::fs::read_to_string(path).map_err(|source| ConfigError::ReadRates {
            path: path.display().to_string(),
            source,
        })?;
    let rate_table: RateTable = parse_rate_table(&contents)?;
    info!(path = %path.display(), "Loaded rate table");
    Ok(rate_table)
}

impl Args {
    /// Builds the billing settings selected on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate file cannot be loaded.
    pub fn billing_settings(&self) -> Result<BillingSettings, ConfigError> {
        let completion_policy: CompletionPolicy = if self.require_payment {
            CompletionPolicy::RequirePayment
        } else {
            CompletionPolicy::AllowUnpaid
        };
        Ok(BillingSettings::new(
            load_rate_table(self.rates.as_deref())?,
            completion_policy,
        ))
    }
}
