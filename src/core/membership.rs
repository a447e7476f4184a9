//! Membership business logic - enrolment periods and their payment headers.
//!
//! Creating a membership opens its payment header in the same database
//! transaction, so a membership never exists without something to bill against.

use crate::{
    core::{member, plan},
    entities::{Membership, MembershipStatus, PaymentStatus, membership, payment},
    errors::{Error, Result},
    money::Money,
};
use chrono::Months;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use std::{sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{info, instrument, warn};

/// Fields accepted when enrolling a member in a plan.
#[derive(Debug, Clone)]
pub struct NewMembership {
    /// Member being enrolled
    pub member_id: i64,
    /// Plan being purchased
    pub plan_id: i64,
    /// First day of the period
    pub start_date: Date,
    /// Optional trainer
    pub trainer_assigned: Option<String>,
    /// Optional batch time slot
    pub batch_time: Option<String>,
    /// Optional membership type label
    pub membership_type: Option<String>,
    /// Whether a locker is included
    pub locker_required: bool,
    /// Amount owed; defaults to the plan price (e.g. when a discount applies)
    pub total_amount: Option<Money>,
    /// Due date of the first instalment, if any
    pub next_due_date: Option<Date>,
}

impl NewMembership {
    /// Enrolment with only the required fields set.
    #[must_use]
    pub const fn new(member_id: i64, plan_id: i64, start_date: Date) -> Self {
        Self {
            member_id,
            plan_id,
            start_date,
            trainer_assigned: None,
            batch_time: None,
            membership_type: None,
            locker_required: false,
            total_amount: None,
            next_due_date: None,
        }
    }
}

/// Computes the exclusive end date of a period that starts on `start_date`.
///
/// Month arithmetic clamps to the last day of shorter months
/// (31 Jan + 1 month = 28/29 Feb).
pub fn period_end(start_date: Date, duration_months: i32) -> Result<Date> {
    let months = u32::try_from(duration_months)
        .map_err(|_| Error::validation("Plan duration must be at least one month"))?;
    start_date
        .checked_add_months(Months::new(months))
        .ok_or_else(|| Error::validation("Membership end date is out of range"))
}

/// Enrols a member in a plan and opens the payment header for the period.
///
/// Both rows are written in one transaction. The header starts with nothing
/// paid and status `pending`.
#[instrument(skip(db))]
pub async fn create_membership(
    db: &DatabaseConnection,
    new_membership: NewMembership,
) -> Result<(membership::Model, payment::Model)> {
    if let Some(total) = new_membership.total_amount {
        if total.is_negative() {
            return Err(Error::InvalidAmount { amount: total });
        }
    }

    let txn = db.begin().await?;

    member::get_member(&txn, new_membership.member_id)
        .await?
        .ok_or(Error::MemberNotFound {
            id: new_membership.member_id,
        })?;
    let plan = plan::get_plan(&txn, new_membership.plan_id)
        .await?
        .ok_or(Error::PlanNotFound {
            id: new_membership.plan_id,
        })?;

    let end_date = period_end(new_membership.start_date, plan.duration_months)?;
    let now = chrono::Utc::now();

    let membership = membership::ActiveModel {
        member_id: Set(new_membership.member_id),
        plan_id: Set(plan.id),
        start_date: Set(new_membership.start_date),
        end_date: Set(end_date),
        status: Set(MembershipStatus::Active),
        trainer_assigned: Set(new_membership.trainer_assigned),
        batch_time: Set(new_membership.batch_time),
        membership_type: Set(new_membership.membership_type),
        locker_required: Set(new_membership.locker_required),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let header = payment::ActiveModel {
        membership_id: Set(membership.id),
        total_amount: Set(new_membership.total_amount.unwrap_or(plan.price)),
        paid_amount: Set(Money::ZERO),
        payment_mode: Set(None),
        payment_status: Set(PaymentStatus::Pending),
        next_due_date: Set(new_membership.next_due_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        membership_id = membership.id,
        member_id = membership.member_id,
        total_amount = %header.total_amount,
        "Membership created"
    );
    Ok((membership, header))
}

/// Finds a membership by its unique ID.
pub async fn get_membership<C>(db: &C, membership_id: i64) -> Result<Option<membership::Model>>
where
    C: ConnectionTrait,
{
    Membership::find_by_id(membership_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all memberships of a member, newest period first.
pub async fn get_memberships_for_member(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Vec<membership::Model>> {
    Membership::find()
        .filter(membership::Column::MemberId.eq(member_id))
        .order_by_desc(membership::Column::StartDate)
        .order_by_desc(membership::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks every active membership whose period has ended as expired.
///
/// The period is `[start_date, end_date)`, so a membership ending today is
/// already over. Returns the number of memberships updated.
#[instrument(skip(db))]
pub async fn expire_memberships(db: &DatabaseConnection, today: Date) -> Result<u64> {
    let result = Membership::update_many()
        .col_expr(
            membership::Column::Status,
            Expr::value(MembershipStatus::Expired),
        )
        .filter(membership::Column::Status.eq(MembershipStatus::Active))
        .filter(membership::Column::EndDate.lte(today))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        info!("Expired {} memberships", result.rows_affected);
    }
    Ok(result.rows_affected)
}

/// Runs [`expire_memberships`] for the local date every `period`.
///
/// The first sweep happens immediately. A failed sweep is logged and retried
/// on the next tick; the task runs until its handle is aborted.
pub fn spawn_expiry_task(db: Arc<DatabaseConnection>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let today = chrono::Local::now().date_naive();
            if let Err(e) = expire_memberships(&db, today).await {
                warn!("Membership expiry sweep failed: {}", e);
            }
        }
    })
}
