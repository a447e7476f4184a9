//! Payment transaction entity - One money-received event.
//!
//! Rows are append-only. For every membership the amounts sum to the header's
//! `paid_amount` as long as postings go through `core::payment::add_payment`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::payment::PaymentMode;
use crate::money::Money;

/// Payment transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Membership the money was collected for
    pub membership_id: i64,
    /// Amount received (always positive)
    pub amount: Money,
    /// How the money was received
    pub payment_mode: PaymentMode,
    /// Business date of the collection
    pub payment_date: Date,
    /// Optional external reference (UPI ref, card slip number)
    pub reference_number: Option<String>,
    /// When the row was recorded
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `PaymentTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction belongs to one membership
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
