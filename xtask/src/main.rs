// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations used in CI, plus one project-specific check:
//!
//! - `cargo xtask verify-migrations` applies the persistence migrations to an
//!   in-memory `SQLite` database, checks the resulting table set, then reverts
//!   every migration and checks that nothing but the migration ledger is left.
//!
//! Standard `cargo test` needs no external services.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{collections::BTreeSet, io, process::Output};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context};
use diesel::sql_types::Text;
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

/// Tables the billing schema must create.
const EXPECTED_TABLES: [&str; 9] = [
    "audit_events",
    "collection_items",
    "collection_records",
    "invoice_lines",
    "invoices",
    "members",
    "request_items",
    "request_status_history",
    "waste_requests",
];

/// Diesel's own bookkeeping table, which survives a full revert.
const MIGRATION_LEDGER: &str = "__diesel_schema_migrations";

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the workspace
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Run clippy, rustdoc and rustfmt checks
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Build each crate's docs with warnings denied
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting with nightly rustfmt
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Apply nightly rustfmt
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run unit, integration and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply and revert the billing migrations against `SQLite`
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => run_cargo(vec!["build", "--workspace", "--all-targets"]),
            Self::Check => run_cargo(vec!["check", "--workspace", "--all-targets"]),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => run_cargo_nightly(vec!["fmt", "--all", "--check"]),
            Self::FixFormatting => run_cargo_nightly(vec!["fmt", "--all"]),
            Self::Test => run_cargo(vec!["test", "--workspace"]),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

fn ci() -> Result<()> {
    lint()?;
    run_cargo(vec!["build", "--workspace", "--all-targets"])?;
    run_cargo(vec!["test", "--workspace"])?;
    verify_migrations()
}

fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])
}

/// Documents every workspace crate on its own so a broken intra-doc link
/// names the crate it lives in.
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_packages() {
        tracing::debug!("documenting {}", package.name);
        cmd("cargo", ["doc", "--no-deps", "--package", &package.name])
            .env_remove("CARGO")
            .env("RUSTDOCFLAGS", "-D warnings")
            .run_with_trace()?;
    }

    Ok(())
}

fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Runs a cargo subcommand on the nightly toolchain.
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify that the billing migrations apply and revert cleanly
///
/// ## What This Command Does
///
/// 1. Opens an in-memory `SQLite` database with foreign keys enabled
/// 2. Applies every pending migration
/// 3. Checks that exactly the billing tables exist
/// 4. Reverts every migration
/// 5. Checks that only the migration ledger remains
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply migrations: {}", e))?;
    tracing::info!("Migrations applied successfully");

    let applied: BTreeSet<String> = list_tables(&mut conn)?;
    let expected: BTreeSet<String> = EXPECTED_TABLES
        .iter()
        .map(ToString::to_string)
        .chain(std::iter::once(MIGRATION_LEDGER.to_string()))
        .collect();
    compare_tables("after apply", &applied, &expected)?;

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert migrations: {}", e))?;
    tracing::info!("Migrations reverted successfully");

    let remaining: BTreeSet<String> = list_tables(&mut conn)?;
    let ledger_only: BTreeSet<String> = std::iter::once(MIGRATION_LEDGER.to_string()).collect();
    compare_tables("after revert", &remaining, &ledger_only)?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// List user tables in the connected `SQLite` database
fn list_tables(conn: &mut SqliteConnection) -> Result<BTreeSet<String>> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let rows: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
    )
    .load(conn)
    .wrap_err("Failed to list SQLite tables")?;

    Ok(rows.into_iter().map(|row| row.name).collect())
}

/// Fail with the missing and unexpected tables if the sets differ
fn compare_tables(
    stage: &str,
    actual: &BTreeSet<String>,
    expected: &BTreeSet<String>,
) -> Result<()> {
    let missing: Vec<&String> = expected.difference(actual).collect();
    let unexpected: Vec<&String> = actual.difference(expected).collect();

    if missing.is_empty() && unexpected.is_empty() {
        tracing::info!("Table set {stage} matches ({} tables)", actual.len());
        return Ok(());
    }

    for table in &missing {
        tracing::error!("Missing table {stage}: {table}");
    }
    for table in &unexpected {
        tracing::error!("Unexpected table {stage}: {table}");
    }
    Err(color_eyre::eyre::eyre!(
        "Table set {stage} differs: {} missing, {} unexpected",
        missing.len(),
        unexpected.len()
    ))
}

/// Logs a `duct` command before running it and again if it fails.
trait TracedRun {
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl TracedRun for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("$ {self:?}");
        self.run()
            .inspect_err(|err| tracing::error!("{self:?} failed: {err}"))
    }
}
