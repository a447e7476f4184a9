//! First-run administrator setup.

use crate::{
    api::{
        AppState,
        error::{PlainError, json_body},
    },
    core::admin::{self, NewAdmin},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

pub async fn setup_status(State(state): State<AppState>) -> Result<Json<Value>, PlainError> {
    let admin_exists = admin::check_admin_exists(state.db()).await?;
    Ok(Json(json!({
        "adminExists": admin_exists,
        "needsSetup": !admin_exists,
    })))
}

pub async fn create_first_admin(
    State(state): State<AppState>,
    payload: Result<Json<NewAdmin>, JsonRejection>,
) -> Result<Json<Value>, PlainError> {
    let new_admin = json_body(payload)?;
    let user = admin::create_first_admin(state.db(), new_admin).await?;
    Ok(Json(json!({
        "message": "Admin created successfully",
        "user": user,
    })))
}
