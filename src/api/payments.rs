//! Payment ledger endpoints.

use crate::{
    api::{AppState, error::json_body},
    core::payment::{self, NewPayment, PaymentUpdate},
    errors::Error,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::{Value, json};

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub async fn list_payments(State(state): State<AppState>) -> Result<Json<Value>, Error> {
    let payments = payment::list_payments(state.db(), today()).await?;
    Ok(Json(json!({ "success": true, "payments": payments })))
}

pub async fn payment_summary(State(state): State<AppState>) -> Result<Json<Value>, Error> {
    let summary = payment::payment_summary(state.db(), today()).await?;
    Ok(Json(json!({ "success": true, "summary": summary })))
}

pub async fn payment_history(State(state): State<AppState>) -> Result<Json<Value>, Error> {
    let transactions = payment::list_payment_history(state.db()).await?;
    Ok(Json(json!({ "success": true, "transactions": transactions })))
}

pub async fn membership_transactions(
    State(state): State<AppState>,
    Path(membership_id): Path<i64>,
) -> Result<Json<Value>, Error> {
    let transactions = payment::list_transactions_for_membership(state.db(), membership_id).await?;
    Ok(Json(json!({ "success": true, "transactions": transactions })))
}

/// Administrative correction of a payment header.
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<PaymentUpdate>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let update = json_body(payload)?;
    let payment = payment::update_payment(state.db(), id, update).await?;
    Ok(Json(json!({ "success": true, "payment": payment })))
}

/// Records money received against a membership.
pub async fn add_payment(
    State(state): State<AppState>,
    payload: Result<Json<NewPayment>, JsonRejection>,
) -> Result<Json<Value>, Error> {
    let new_payment = json_body(payload)?;
    let payment = payment::add_payment(state.db(), new_payment).await?;
    Ok(Json(json!({ "success": true, "payment": payment })))
}
