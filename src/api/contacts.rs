//! Health and read-only contact endpoints for operators.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::db_call;
use crate::error::CrmError;
use crate::store::Contact;
use crate::AppState;

pub(super) async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "rolodex",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(super) async fn health(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, CrmError> {
    let contacts = db_call(&state.db, |db| db.count()).await??;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "contacts": contacts,
        "ai": state.ai.is_some(),
    })))
}

#[derive(Deserialize)]
pub(super) struct ListParams {
    limit: Option<usize>,
}

pub(super) async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Contact>>, CrmError> {
    let limit = params.limit.unwrap_or(100);
    let mut contacts = db_call(&state.db, |db| db.list_all()).await??;
    contacts.truncate(limit);
    Ok(Json(contacts))
}

pub(super) async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Contact>, CrmError> {
    let contact = db_call(&state.db, move |db| db.get(&id)).await??;
    contact.map(Json).ok_or(CrmError::NotFound)
}
