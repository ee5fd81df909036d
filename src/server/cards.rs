// Saved cards and share links

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;

use super::page;
use super::{ApiError, AppState};
use crate::card::CardRecord;
use crate::workflow::ShareLink;

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub record: CardRecord,
    pub redirect: &'static str,
}

/// POST /api/cards - save the current card
pub async fn save(State(state): State<AppState>) -> Result<Json<SaveResponse>, ApiError> {
    let outcome = state.workflow.save().await?;
    Ok(Json(SaveResponse {
        record: outcome.record,
        redirect: outcome.redirect,
    }))
}

/// GET /api/cards - saved cards for the session user, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<CardRecord>>, ApiError> {
    Ok(Json(state.workflow.saved_cards().await?))
}

/// DELETE /api/cards/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.workflow.delete_card(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /saved-cards - where a successful save lands
pub async fn saved_cards_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let records = state.workflow.saved_cards().await?;
    Ok(Html(page::saved_cards_page(&records)))
}

/// POST /api/share
pub async fn share(State(state): State<AppState>) -> Result<Json<ShareLink>, ApiError> {
    Ok(Json(state.workflow.generate_share_link().await?))
}

/// GET /share/:id - public view of a stored card
pub async fn share_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    match state.workflow.find_card(&id).await? {
        Some(record) => Ok(Html(page::share_page(&record))),
        None => {
            tracing::debug!(card_id = %id, "Share link has no stored card");
            Err(ApiError::NotFound(format!("card {} not found", id)))
        }
    }
}
