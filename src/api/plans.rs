use crate::{
    api::{AppState, error::PlainError},
    core::plan,
};
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// Lists the plan catalog, shortest and cheapest first.
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Value>, PlainError> {
    let plans = plan::list_plans(state.db()).await?;
    Ok(Json(json!({ "success": true, "plans": plans })))
}
