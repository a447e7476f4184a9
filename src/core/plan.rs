//! Plan catalog business logic.
//!
//! Plans are read-only over the API. New plans come from the `[[plans]]`
//! tables in config.toml, which are seeded at startup.

use crate::{
    config::plans::PlanConfig,
    entities::{MembershipPlan, membership_plan},
    errors::{Error, Result},
    money::Money,
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Retrieves every plan, shortest duration first (price breaks ties).
pub async fn list_plans(db: &DatabaseConnection) -> Result<Vec<membership_plan::Model>> {
    MembershipPlan::find()
        .order_by_asc(membership_plan::Column::DurationMonths)
        .order_by_asc(membership_plan::Column::Price)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a plan by its unique ID.
pub async fn get_plan<C>(db: &C, plan_id: i64) -> Result<Option<membership_plan::Model>>
where
    C: ConnectionTrait,
{
    MembershipPlan::find_by_id(plan_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a plan by its name.
pub async fn get_plan_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<membership_plan::Model>> {
    MembershipPlan::find()
        .filter(membership_plan::Column::PlanName.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a plan after validating its terms.
///
/// The name is trimmed and must be non-empty and unused. Duration must be at
/// least one month and the price must not be negative.
pub async fn create_plan(
    db: &DatabaseConnection,
    name: &str,
    duration_months: i32,
    price: Money,
) -> Result<membership_plan::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("Plan name cannot be empty"));
    }
    if duration_months <= 0 {
        return Err(Error::validation("Plan duration must be at least one month"));
    }
    if price.is_negative() {
        return Err(Error::InvalidAmount { amount: price });
    }

    if get_plan_by_name(db, name).await?.is_some() {
        return Err(Error::conflict(format!("Plan '{name}' already exists")));
    }

    let plan = membership_plan::ActiveModel {
        plan_name: Set(name.to_string()),
        duration_months: Set(duration_months),
        price: Set(price),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    Ok(plan.insert(db).await?)
}

/// Inserts every configured plan whose name is not in the catalog yet.
///
/// Returns the number of plans created. Existing plans are left untouched.
pub async fn seed_plans(db: &DatabaseConnection, plans: &[PlanConfig]) -> Result<usize> {
    let mut created = 0;
    for plan in plans {
        if get_plan_by_name(db, plan.name.trim()).await?.is_some() {
            continue;
        }
        create_plan(db, &plan.name, plan.duration_months, plan.price).await?;
        created += 1;
    }
    if created > 0 {
        info!("Seeded {created} membership plans");
    }
    Ok(created)
}
