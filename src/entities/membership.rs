//! Membership entity - One enrolment period of a member under a plan.
//!
//! The period is the half-open range `[start_date, end_date)`. Renewals create
//! new rows, each with its own payment header.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an enrolment period
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    /// Period has not ended yet
    #[sea_orm(string_value = "active")]
    Active,
    /// Period has ended
    #[sea_orm(string_value = "expired")]
    Expired,
}

/// Membership database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memberships")]
pub struct Model {
    /// Unique identifier for the membership
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member this enrolment belongs to
    pub member_id: i64,
    /// Plan the member enrolled under
    pub plan_id: i64,
    /// First day of the period (inclusive)
    pub start_date: Date,
    /// Day the period ends (exclusive)
    pub end_date: Date,
    /// Active or expired
    pub status: MembershipStatus,
    /// Trainer assigned for the period, if any
    pub trainer_assigned: Option<String>,
    /// Preferred batch time slot (e.g., "06:00-07:00")
    pub batch_time: Option<String>,
    /// Free-form membership type (e.g., "gym", "gym+cardio")
    pub membership_type: Option<String>,
    /// Whether a locker was assigned
    pub locker_required: bool,
    /// When the membership was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Membership and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
    /// Each membership is billed under one plan
    #[sea_orm(
        belongs_to = "super::membership_plan::Entity",
        from = "Column::PlanId",
        to = "super::membership_plan::Column::Id"
    )]
    Plan,
    /// One membership owns exactly one payment header
    #[sea_orm(has_one = "super::payment::Entity")]
    Payment,
    /// One membership has many payment transactions
    #[sea_orm(has_many = "super::payment_transaction::Entity")]
    PaymentTransactions,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl Related<super::membership_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<super::payment_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
