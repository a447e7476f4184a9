//! Member directory business logic.
//!
//! Provides member intake, lookups, and the directory view that joins each member
//! with their latest membership, its plan, and its payment header.

use crate::{
    core::lookup::find_all_by_ids,
    entities::{
        Member, Membership, MembershipPlan, Payment, member, membership, membership_plan, payment,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// Fields accepted when registering a member.
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    /// Full name; must not be blank
    pub full_name: String,
    /// Contact number; must not be blank
    pub phone_number: String,
    /// Optional email
    pub email: Option<String>,
    /// Optional gender
    pub gender: Option<String>,
    /// Optional date of birth
    pub date_of_birth: Option<Date>,
    /// Optional profile photo reference
    pub profile_photo_url: Option<String>,
}

/// A member together with their most recent enrolment, if any.
#[derive(Debug, Clone, Serialize)]
pub struct MemberDirectoryEntry {
    /// The member record
    #[serde(flatten)]
    pub member: member::Model,
    /// Latest membership by start date
    pub membership: Option<membership::Model>,
    /// Plan of the latest membership
    pub plan: Option<membership_plan::Model>,
    /// Payment header of the latest membership
    pub payment: Option<payment::Model>,
}

/// Retrieves all members ordered alphabetically by name.
pub async fn list_members(db: &DatabaseConnection) -> Result<Vec<member::Model>> {
    Member::find()
        .order_by_asc(member::Column::FullName)
        .order_by_asc(member::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by their unique ID.
pub async fn get_member<C>(db: &C, member_id: i64) -> Result<Option<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find_by_id(member_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new member, trimming text fields and rejecting blanks.
pub async fn create_member(db: &DatabaseConnection, new_member: NewMember) -> Result<member::Model> {
    let full_name = new_member.full_name.trim();
    if full_name.is_empty() {
        return Err(Error::validation("Member name cannot be empty"));
    }
    let phone_number = new_member.phone_number.trim();
    if phone_number.is_empty() {
        return Err(Error::validation("Phone number cannot be empty"));
    }

    let member = member::ActiveModel {
        full_name: Set(full_name.to_string()),
        phone_number: Set(phone_number.to_string()),
        email: Set(non_blank(new_member.email)),
        gender: Set(non_blank(new_member.gender)),
        date_of_birth: Set(new_member.date_of_birth),
        profile_photo_url: Set(non_blank(new_member.profile_photo_url)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    Ok(member.insert(db).await?)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Builds the member directory: every member ordered by name, each enriched
/// with their latest membership (by start date, then id) and its plan and
/// payment header.
pub async fn list_member_directory(db: &DatabaseConnection) -> Result<Vec<MemberDirectoryEntry>> {
    let members = list_members(db).await?;
    let member_ids: Vec<i64> = members.iter().map(|m| m.id).collect();
    if member_ids.is_empty() {
        return Ok(Vec::new());
    }

    let memberships =
        find_all_by_ids::<Membership, _, _>(db, membership::Column::MemberId, member_ids).await?;

    // Latest by start date, then id
    let mut latest: HashMap<i64, membership::Model> = HashMap::new();
    for ms in memberships {
        match latest.get(&ms.member_id) {
            Some(current) if (current.start_date, current.id) >= (ms.start_date, ms.id) => {}
            _ => {
                latest.insert(ms.member_id, ms);
            }
        }
    }

    let plan_ids = latest.values().map(|ms| ms.plan_id);
    let plans: HashMap<i64, membership_plan::Model> =
        find_all_by_ids::<MembershipPlan, _, _>(db, membership_plan::Column::Id, plan_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

    let membership_ids = latest.values().map(|ms| ms.id);
    let payments: HashMap<i64, payment::Model> =
        find_all_by_ids::<Payment, _, _>(db, payment::Column::MembershipId, membership_ids)
            .await?
            .into_iter()
            .map(|p| (p.membership_id, p))
            .collect();

    Ok(members
        .into_iter()
        .map(|member| {
            let membership = latest.remove(&member.id);
            let plan = membership
                .as_ref()
                .and_then(|ms| plans.get(&ms.plan_id).cloned());
            let payment = membership
                .as_ref()
                .and_then(|ms| payments.get(&ms.id).cloned());
            MemberDirectoryEntry {
                member,
                membership,
                plan,
                payment,
            }
        })
        .collect())
}
