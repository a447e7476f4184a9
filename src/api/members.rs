use crate::{api::AppState, core::member, errors::Error};
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

/// Member directory: every member with their latest membership, plan and
/// payment header.
pub async fn list_members(State(state): State<AppState>) -> Result<Json<Value>, Error> {
    let members = member::list_member_directory(state.db()).await?;
    Ok(Json(json!({ "success": true, "members": members })))
}

pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, Error> {
    let member = member::get_member(state.db(), id)
        .await?
        .ok_or(Error::MemberNotFound { id })?;
    Ok(Json(json!({ "success": true, "member": member })))
}
