//! Membership plan configuration loaded from config.toml
//!
//! The `[[plans]]` tables in config.toml describe the plan catalog. They are used
//! to seed the database on first run or when a configured plan is missing.

use crate::money::Money;
use serde::Deserialize;

/// Configuration for a single membership plan
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PlanConfig {
    /// Display name of the plan; also its natural key
    pub name: String,
    /// Length of one enrolment period in months
    pub duration_months: i32,
    /// Price of one period
    pub price: Money,
}

/// The catalog used when config.toml defines no plans.
#[must_use]
pub fn default_plans() -> Vec<PlanConfig> {
    [
        ("Monthly", 1, 1500),
        ("Quarterly", 3, 4000),
        ("Half-Yearly", 6, 7000),
        ("Yearly", 12, 12000),
    ]
    .into_iter()
    .map(|(name, duration_months, price)| PlanConfig {
        name: name.to_string(),
        duration_months,
        price: Money::from_major(price),
    })
    .collect()
}
