//! User entity - Staff accounts for the back-office dashboard.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access level of a staff account
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full administrative access
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Reception and front-desk access
    #[sea_orm(string_value = "staff")]
    Staff,
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, stored trimmed and lower-cased
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 PHC string; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Access level
    pub role: UserRole,
    /// Whether the email has been verified
    pub is_verified: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Users have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
