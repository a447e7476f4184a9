//! Payment ledger business logic - headers, postings, corrections and history.
//!
//! Every membership owns one payment header (`payments`) and an append-only list
//! of money-received events (`payment_transactions`). Postings go through
//! [`add_payment`], which inserts the event and increments the header in a single
//! database transaction, so the sum of a membership's transactions always equals
//! its header's `paid_amount`. [`update_payment`] is the only way to overwrite a
//! header directly and the only way to set a status the amounts would not derive.

use crate::{
    core::membership,
    entities::{
        Member, Membership, MembershipPlan, Payment, PaymentMode, PaymentStatus,
        PaymentTransaction, member, membership as membership_entity, membership_plan, payment,
        payment_transaction,
    },
    core::lookup::find_all_by_ids,
    errors::{Error, Result},
    money::Money,
};
use sea_orm::{
    PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*,
    sea_query::{Expr, Func, SimpleExpr},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument, warn};

/// Derives the settlement status from the amount owed and the amount collected.
///
/// Nothing collected is `pending`, anything short of the total is `partial`, and
/// the total or more is `full`. `refunded` is never derived.
#[must_use]
pub fn derive_status(total_amount: Money, paid_amount: Money) -> PaymentStatus {
    if !paid_amount.is_positive() {
        PaymentStatus::Pending
    } else if paid_amount < total_amount {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Full
    }
}

/// True when a due date is set and strictly before `today`.
#[must_use]
pub fn is_past_due(next_due_date: Option<Date>, today: Date) -> bool {
    next_due_date.is_some_and(|due| due < today)
}

/// Display flag for headers that still owe money past their due date.
///
/// Only `pending` and `partial` headers can be overdue; the flag never feeds
/// back into the stored status.
#[must_use]
pub fn is_overdue(status: PaymentStatus, next_due_date: Option<Date>, today: Date) -> bool {
    matches!(status, PaymentStatus::Pending | PaymentStatus::Partial)
        && is_past_due(next_due_date, today)
}

/// A payment header joined with its membership, member and plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentView {
    /// Header id
    pub id: i64,
    /// Membership billed by this header
    pub membership_id: i64,
    /// Amount owed for the period
    pub total_amount: Money,
    /// Amount collected so far
    pub paid_amount: Money,
    /// `total_amount - paid_amount`
    pub pending_amount: Money,
    /// Mode of the most recent collection
    pub payment_mode: Option<PaymentMode>,
    /// Stored status
    pub payment_status: PaymentStatus,
    /// Next instalment due date
    pub next_due_date: Option<Date>,
    /// Whether the header still owes money past its due date
    pub is_overdue: bool,
    /// When the header was opened
    pub created_at: DateTimeUtc,
    /// Member paying for the membership
    pub member_id: i64,
    /// Member's full name
    pub full_name: String,
    /// Member's phone number
    pub phone_number: String,
    /// Member's photo reference
    pub profile_photo_url: Option<String>,
    /// Start of the membership period
    pub start_date: Date,
    /// End of the membership period (exclusive)
    pub end_date: Date,
    /// Name of the plan purchased
    pub plan_name: String,
}

/// A ledger transaction joined with its membership, member and plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionView {
    /// Transaction id
    pub id: i64,
    /// Membership the money was collected for
    pub membership_id: i64,
    /// Amount received
    pub amount: Money,
    /// How the money was received
    pub payment_mode: PaymentMode,
    /// Business date of the collection
    pub payment_date: Date,
    /// External reference, if any
    pub reference_number: Option<String>,
    /// When the row was recorded
    pub created_at: DateTimeUtc,
    /// Member who paid
    pub member_id: i64,
    /// Member's full name
    pub full_name: String,
    /// Member's phone number
    pub phone_number: String,
    /// Member's photo reference
    pub profile_photo_url: Option<String>,
    /// Start of the membership period
    pub start_date: Date,
    /// End of the membership period (exclusive)
    pub end_date: Date,
    /// Name of the plan purchased
    pub plan_name: String,
}

/// Ledger-wide aggregates for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentSummary {
    /// Number of payment headers
    pub total_payments: u64,
    /// Sum of `paid_amount` over every header
    pub total_revenue: Money,
    /// Sum of `total_amount - paid_amount` over pending and partial headers
    pub pending_amount: Money,
    /// Number of fully paid headers
    pub full_payments: u64,
    /// Number of pending or partial headers past their due date
    pub overdue_payments: u64,
}

/// Administrative correction of a payment header.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentUpdate {
    /// New cumulative paid amount; must stay within `[0, total_amount]`
    pub paid_amount: Money,
    /// New last-used payment mode
    pub payment_mode: PaymentMode,
    /// Explicit status; derived from the amounts when omitted
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    /// New due date; `None` clears it
    #[serde(default)]
    pub next_due_date: Option<Date>,
}

/// A money-received event to post against a membership.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    /// Member paying; must own the membership
    pub member_id: i64,
    /// Membership being paid for
    pub membership_id: i64,
    /// Amount received; positive and at most the pending balance
    pub amount: Money,
    /// How the money was received
    pub payment_mode: PaymentMode,
    /// Business date of the collection
    pub payment_date: Date,
    /// External reference, if any
    #[serde(default)]
    pub reference_number: Option<String>,
}

struct MembershipContext {
    membership: membership_entity::Model,
    member: member::Model,
    plan_name: String,
}

/// Loads membership, member and plan rows for a batch of memberships.
///
/// Memberships whose member or plan cannot be found are left out, mirroring an
/// inner join.
async fn load_contexts<C, I>(db: &C, membership_ids: I) -> Result<HashMap<i64, MembershipContext>>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let memberships =
        find_all_by_ids::<Membership, _, _>(db, membership_entity::Column::Id, membership_ids)
            .await?;

    let member_ids = memberships.iter().map(|ms| ms.member_id);
    let members: HashMap<i64, member::Model> =
        find_all_by_ids::<Member, _, _>(db, member::Column::Id, member_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

    let plan_ids = memberships.iter().map(|ms| ms.plan_id);
    let plan_names: HashMap<i64, String> =
        find_all_by_ids::<MembershipPlan, _, _>(db, membership_plan::Column::Id, plan_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.plan_name))
            .collect();

    Ok(memberships
        .into_iter()
        .filter_map(|membership| {
            let member = members.get(&membership.member_id)?.clone();
            let plan_name = plan_names.get(&membership.plan_id)?.clone();
            Some((
                membership.id,
                MembershipContext {
                    membership,
                    member,
                    plan_name,
                },
            ))
        })
        .collect())
}

fn payment_view(header: payment::Model, ctx: &MembershipContext, today: Date) -> PaymentView {
    PaymentView {
        id: header.id,
        membership_id: header.membership_id,
        total_amount: header.total_amount,
        paid_amount: header.paid_amount,
        pending_amount: header.pending_amount(),
        payment_mode: header.payment_mode,
        payment_status: header.payment_status,
        next_due_date: header.next_due_date,
        is_overdue: is_overdue(header.payment_status, header.next_due_date, today),
        created_at: header.created_at,
        member_id: ctx.member.id,
        full_name: ctx.member.full_name.clone(),
        phone_number: ctx.member.phone_number.clone(),
        profile_photo_url: ctx.member.profile_photo_url.clone(),
        start_date: ctx.membership.start_date,
        end_date: ctx.membership.end_date,
        plan_name: ctx.plan_name.clone(),
    }
}

fn transaction_view(row: payment_transaction::Model, ctx: &MembershipContext) -> TransactionView {
    TransactionView {
        id: row.id,
        membership_id: row.membership_id,
        amount: row.amount,
        payment_mode: row.payment_mode,
        payment_date: row.payment_date,
        reference_number: row.reference_number,
        created_at: row.created_at,
        member_id: ctx.member.id,
        full_name: ctx.member.full_name.clone(),
        phone_number: ctx.member.phone_number.clone(),
        profile_photo_url: ctx.member.profile_photo_url.clone(),
        start_date: ctx.membership.start_date,
        end_date: ctx.membership.end_date,
        plan_name: ctx.plan_name.clone(),
    }
}

/// Retrieves every payment header with its membership, member and plan,
/// newest-created first. `today` drives the overdue flag.
pub async fn list_payments(db: &DatabaseConnection, today: Date) -> Result<Vec<PaymentView>> {
    let headers = Payment::find()
        .order_by_desc(payment::Column::CreatedAt)
        .order_by_desc(payment::Column::Id)
        .all(db)
        .await?;

    let membership_ids = headers.iter().map(|h| h.membership_id);
    let contexts = load_contexts(db, membership_ids).await?;

    Ok(headers
        .into_iter()
        .filter_map(|header| {
            let ctx = contexts.get(&header.membership_id)?;
            Some(payment_view(header, ctx, today))
        })
        .collect())
}

/// Finds a payment header by its unique ID.
pub async fn get_payment<C>(db: &C, payment_id: i64) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the payment header that bills a membership.
pub async fn get_payment_for_membership<C>(
    db: &C,
    membership_id: i64,
) -> Result<Option<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .filter(payment::Column::MembershipId.eq(membership_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn history_rows(
    db: &DatabaseConnection,
    membership_id: Option<i64>,
) -> Result<Vec<TransactionView>> {
    let mut query = PaymentTransaction::find().filter(payment_transaction::Column::Amount.gt(0));
    if let Some(id) = membership_id {
        query = query.filter(payment_transaction::Column::MembershipId.eq(id));
    }
    let rows = query
        .order_by_desc(payment_transaction::Column::CreatedAt)
        .order_by_desc(payment_transaction::Column::Id)
        .all(db)
        .await?;

    let membership_ids = rows.iter().map(|r| r.membership_id);
    let contexts = load_contexts(db, membership_ids).await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let ctx = contexts.get(&row.membership_id)?;
            Some(transaction_view(row, ctx))
        })
        .collect())
}

/// Retrieves every realized payment (amount > 0) across all memberships,
/// newest first, with membership, member and plan context.
pub async fn list_payment_history(db: &DatabaseConnection) -> Result<Vec<TransactionView>> {
    history_rows(db, None).await
}

/// Retrieves the realized payments of one membership, newest first.
pub async fn list_transactions_for_membership(
    db: &DatabaseConnection,
    membership_id: i64,
) -> Result<Vec<TransactionView>> {
    membership::get_membership(db, membership_id)
        .await?
        .ok_or(Error::MembershipNotFound { id: membership_id })?;
    history_rows(db, Some(membership_id)).await
}

/// Sum of every transaction amount recorded for a membership.
pub async fn sum_transactions<C>(db: &C, membership_id: i64) -> Result<Money>
where
    C: ConnectionTrait,
{
    let total: Option<Option<i64>> = PaymentTransaction::find()
        .select_only()
        .column_as(
            Expr::col(payment_transaction::Column::Amount).sum(),
            "total",
        )
        .filter(payment_transaction::Column::MembershipId.eq(membership_id))
        .into_tuple()
        .one(db)
        .await?;
    Ok(Money::from_minor(total.flatten().unwrap_or(0)))
}

/// Computes the dashboard aggregates with SQL aggregates, so the result size
/// stays constant no matter how many headers exist.
pub async fn payment_summary(db: &DatabaseConnection, today: Date) -> Result<PaymentSummary> {
    let owing = [PaymentStatus::Pending, PaymentStatus::Partial];

    let total_payments = Payment::find().count(db).await?;

    let total_revenue: Option<Option<i64>> = Payment::find()
        .select_only()
        .column_as(Expr::col(payment::Column::PaidAmount).sum(), "revenue")
        .into_tuple()
        .one(db)
        .await?;

    let outstanding = SimpleExpr::from(Func::sum(
        Expr::col(payment::Column::TotalAmount).sub(Expr::col(payment::Column::PaidAmount)),
    ));
    let pending_amount: Option<Option<i64>> = Payment::find()
        .select_only()
        .column_as(outstanding, "pending")
        .filter(payment::Column::PaymentStatus.is_in(owing))
        .into_tuple()
        .one(db)
        .await?;

    let full_payments = Payment::find()
        .filter(payment::Column::PaymentStatus.eq(PaymentStatus::Full))
        .count(db)
        .await?;

    let overdue_payments = Payment::find()
        .filter(payment::Column::PaymentStatus.is_in(owing))
        .filter(payment::Column::NextDueDate.is_not_null())
        .filter(payment::Column::NextDueDate.lt(today))
        .count(db)
        .await?;

    Ok(PaymentSummary {
        total_payments,
        total_revenue: Money::from_minor(total_revenue.flatten().unwrap_or(0)),
        pending_amount: Money::from_minor(pending_amount.flatten().unwrap_or(0)),
        full_payments,
        overdue_payments,
    })
}

/// Overwrites the mutable fields of a payment header.
///
/// This is a correction, not a payment event: no transaction row is appended.
/// A supplied `payment_status` is stored as given (e.g. `refunded`); otherwise
/// the status is derived from the new amounts. The paid amount must stay
/// within `[0, total_amount]`, else nothing changes.
#[instrument(skip(db))]
pub async fn update_payment(
    db: &DatabaseConnection,
    payment_id: i64,
    update: PaymentUpdate,
) -> Result<payment::Model> {
    if update.paid_amount.is_negative() {
        return Err(Error::InvalidAmount {
            amount: update.paid_amount,
        });
    }

    let header = get_payment(db, payment_id)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    if update.paid_amount > header.total_amount {
        return Err(Error::validation(format!(
            "Paid amount {} cannot exceed total amount {}",
            update.paid_amount, header.total_amount
        )));
    }

    let status = update
        .payment_status
        .unwrap_or_else(|| derive_status(header.total_amount, update.paid_amount));

    // A single UPDATE; the total is immutable so the bound checked above holds.
    let mut active: payment::ActiveModel = header.into();
    active.paid_amount = Set(update.paid_amount);
    active.payment_mode = Set(Some(update.payment_mode));
    active.payment_status = Set(status);
    active.next_due_date = Set(update.next_due_date);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(db).await?;

    info!(
        payment_id,
        paid_amount = %updated.paid_amount,
        status = ?updated.payment_status,
        "Payment header corrected"
    );
    Ok(updated)
}

/// Why a posting of `amount` against `header` cannot be accepted, if it can't.
fn posting_rejection(header: &payment::Model, amount: Money) -> Option<Error> {
    if header.payment_status == PaymentStatus::Refunded {
        return Some(Error::PaymentRefunded { id: header.id });
    }
    let pending = header.pending_amount();
    if amount > pending {
        return Some(Error::ExceedsPendingBalance {
            pending,
            requested: amount,
        });
    }
    None
}

/// Records a money-received event and applies it to the membership's header.
///
/// The membership, ownership and header are checked first. Then, inside one
/// database transaction, the first statement is a guarded increment
/// `paid_amount = paid_amount + amount` that only matches while the amount
/// still fits the pending balance and the header is not refunded. The
/// transaction row is appended and the status re-derived from the new paid
/// amount. If the guard matches nothing, the transaction rolls back and the
/// caller gets a validation error; concurrent postings therefore accumulate
/// instead of overwriting each other.
#[instrument(skip(db))]
pub async fn add_payment(db: &DatabaseConnection, new_payment: NewPayment) -> Result<payment::Model> {
    let amount = new_payment.amount;
    if !amount.is_positive() {
        return Err(Error::InvalidAmount { amount });
    }

    let membership = membership::get_membership(db, new_payment.membership_id)
        .await?
        .ok_or(Error::MembershipNotFound {
            id: new_payment.membership_id,
        })?;
    if membership.member_id != new_payment.member_id {
        return Err(Error::validation(format!(
            "Membership {} does not belong to member {}",
            membership.id, new_payment.member_id
        )));
    }

    let header = get_payment_for_membership(db, membership.id)
        .await?
        .ok_or_else(|| {
            Error::validation(format!("No payment record for membership {}", membership.id))
        })?;
    if let Some(err) = posting_rejection(&header, amount) {
        warn!(payment_id = header.id, amount = %amount, "Payment rejected: {err}");
        return Err(err);
    }

    // The write comes first so the store takes its write lock before any read.
    let txn = db.begin().await?;
    let now = chrono::Utc::now();
    let guarded = Payment::update_many()
        .col_expr(
            payment::Column::PaidAmount,
            Expr::col(payment::Column::PaidAmount).add(amount.minor()),
        )
        .col_expr(
            payment::Column::PaymentMode,
            Expr::value(new_payment.payment_mode),
        )
        .col_expr(payment::Column::UpdatedAt, Expr::value(now))
        .filter(payment::Column::Id.eq(header.id))
        .filter(payment::Column::PaymentStatus.ne(PaymentStatus::Refunded))
        .filter(
            Expr::col(payment::Column::PaidAmount)
                .lte(Expr::col(payment::Column::TotalAmount).sub(amount.minor())),
        )
        .exec(&txn)
        .await?;

    if guarded.rows_affected == 0 {
        // Another posting or a correction got in first; report against the row as it is now.
        let current = get_payment(&txn, header.id)
            .await?
            .ok_or(Error::PaymentNotFound { id: header.id })?;
        txn.rollback().await?;
        let err = posting_rejection(&current, amount).unwrap_or(Error::ExceedsPendingBalance {
            pending: current.pending_amount(),
            requested: amount,
        });
        warn!(payment_id = header.id, amount = %amount, "Payment rejected: {err}");
        return Err(err);
    }

    payment_transaction::ActiveModel {
        membership_id: Set(membership.id),
        amount: Set(amount),
        payment_mode: Set(new_payment.payment_mode),
        payment_date: Set(new_payment.payment_date),
        reference_number: Set(new_payment
            .reference_number
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let incremented = get_payment(&txn, header.id)
        .await?
        .ok_or(Error::PaymentNotFound { id: header.id })?;
    let status = derive_status(incremented.total_amount, incremented.paid_amount);
    let mut active: payment::ActiveModel = incremented.into();
    active.payment_status = Set(status);
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        payment_id = updated.id,
        membership_id = membership.id,
        amount = %amount,
        paid_amount = %updated.paid_amount,
        status = ?updated.payment_status,
        "Payment recorded"
    );
    Ok(updated)
}
