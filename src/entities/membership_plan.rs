//! Membership plan entity - The catalog of purchasable plans.
//!
//! A plan fixes a duration in months and a price. Plans are immutable once a
//! membership references them, so billing history always points at the terms
//! the member actually signed up for.

use crate::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Membership plan database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membership_plans")]
pub struct Model {
    /// Unique identifier for the plan
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Quarterly")
    #[sea_orm(unique)]
    pub plan_name: String,
    /// Length of one enrolment period in months
    pub duration_months: i32,
    /// Price charged for one period
    pub price: Money,
    /// When the plan was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `MembershipPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One plan is used by many memberships
    #[sea_orm(has_many = "super::membership::Entity")]
    Memberships,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
