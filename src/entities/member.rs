//! Member entity - People enrolled at the gym.
//!
//! Members are created by reception staff and never hard-deleted while a
//! membership references them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name as printed on the membership card
    pub full_name: String,
    /// Primary contact number
    pub phone_number: String,
    /// Optional contact email
    pub email: Option<String>,
    /// Optional gender as recorded at intake
    pub gender: Option<String>,
    /// Optional date of birth
    pub date_of_birth: Option<Date>,
    /// Optional reference to an uploaded profile photo
    pub profile_photo_url: Option<String>,
    /// When the member was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many memberships over time
    #[sea_orm(has_many = "super::membership::Entity")]
    Memberships,
}

impl Related<super::membership::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
