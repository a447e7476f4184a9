//! Shared test utilities for the gym ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating plans, members and memberships with sensible defaults.

use crate::{
    core::{
        member::{self, NewMember},
        membership::{self, NewMembership},
        plan,
    },
    entities,
    errors::Result,
    money::Money,
};
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Routes `tracing` output through the test harness so it shows up on failure.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database under `dir` with a pool of
/// `max_connections`, so transactions really run side by side.
pub async fn setup_file_db(dir: &Path, max_connections: u32) -> Result<DatabaseConnection> {
    init_test_tracing();
    let url = format!("sqlite://{}?mode=rwc", dir.join("ledger.sqlite").display());
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .min_connections(max_connections)
        .sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a plan with the given shape.
pub async fn create_test_plan(
    db: &DatabaseConnection,
    name: &str,
    duration_months: i32,
    price: Money,
) -> Result<entities::membership_plan::Model> {
    plan::create_plan(db, name, duration_months, price).await
}

/// Creates a test member with sensible defaults.
///
/// # Defaults
/// * `phone_number`: "9800000000"
/// * everything optional: None
pub async fn create_test_member(
    db: &DatabaseConnection,
    full_name: &str,
) -> Result<entities::member::Model> {
    member::create_member(
        db,
        NewMember {
            full_name: full_name.to_string(),
            phone_number: "9800000000".to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Enrols a member in a plan starting on `start_date`.
/// Returns the membership and its freshly opened payment header.
pub async fn create_test_membership_on(
    db: &DatabaseConnection,
    member_id: i64,
    plan_id: i64,
    start_date: NaiveDate,
) -> Result<(entities::membership::Model, entities::payment::Model)> {
    membership::create_membership(db, NewMembership::new(member_id, plan_id, start_date)).await
}

/// Rows created by [`setup_with_payment`].
pub struct PaymentFixture {
    /// Plan priced at the requested total
    pub plan: entities::membership_plan::Model,
    /// Member who owns the membership
    pub member: entities::member::Model,
    /// Membership starting 2025-01-01
    pub membership: entities::membership::Model,
    /// Header as opened, nothing paid
    pub payment: entities::payment::Model,
}

/// Creates one plan, member and membership owing `total_amount` in `db`.
pub async fn create_payment_fixture(
    db: &DatabaseConnection,
    total_amount: Money,
) -> Result<PaymentFixture> {
    let plan = create_test_plan(db, "Test Plan", 6, total_amount).await?;
    let member = create_test_member(db, "Test Member").await?;
    let start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();
    let (membership, payment) =
        create_test_membership_on(db, member.id, plan.id, start_date).await?;
    Ok(PaymentFixture {
        plan,
        member,
        membership,
        payment,
    })
}

/// Sets up a complete test environment with one membership owing `total_amount`.
/// Returns (db, fixture) for ledger tests.
pub async fn setup_with_payment(
    total_amount: Money,
) -> Result<(DatabaseConnection, PaymentFixture)> {
    let db = setup_test_db().await?;
    let fixture = create_payment_fixture(&db, total_amount).await?;
    Ok((db, fixture))
}
