//! Payment entity - The ledger header for one membership.
//!
//! Each membership owns exactly one header holding the amount owed for the
//! period (`total_amount`) and the amount collected so far (`paid_amount`).
//! `0 <= paid_amount <= total_amount` holds after every mutation.

use crate::money::Money;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement state of a payment header.
///
/// `Pending`, `Partial` and `Full` follow from the paid/total amounts.
/// `Refunded` is only ever set by an explicit correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Nothing collected yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Some but not all of the total collected
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Total collected
    #[sea_orm(string_value = "full")]
    Full,
    /// Money returned to the member; terminal
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// How the money was received
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentMode {
    /// Cash at the front desk
    #[sea_orm(string_value = "Cash")]
    Cash,
    /// UPI transfer
    #[sea_orm(string_value = "UPI")]
    #[serde(rename = "UPI")]
    Upi,
    /// Debit or credit card
    #[sea_orm(string_value = "Card")]
    Card,
    /// Online bank transfer
    #[sea_orm(string_value = "Online")]
    Online,
}

/// Payment header database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the header
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Membership this header bills (1:1)
    #[sea_orm(unique)]
    pub membership_id: i64,
    /// Amount owed for the membership period, in minor units
    pub total_amount: Money,
    /// Cumulative amount collected so far, in minor units
    pub paid_amount: Money,
    /// Mode used for the most recent collection
    pub payment_mode: Option<PaymentMode>,
    /// Stored status; see [`PaymentStatus`]
    pub payment_status: PaymentStatus,
    /// When the next instalment is due, if any
    pub next_due_date: Option<Date>,
    /// When the header was opened
    pub created_at: DateTimeUtc,
    /// When the header was last modified
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Amount still owed: `total_amount - paid_amount`.
    #[must_use]
    pub fn pending_amount(&self) -> Money {
        self.total_amount - self.paid_amount
    }
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each header belongs to one membership
    #[sea_orm(
        belongs_to = "super::membership::Entity",
        from = "Column::MembershipId",
        to = "super::membership::Column::Id"
    )]
    Membership,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Membership.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
