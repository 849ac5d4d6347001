//! Match lifecycle routes and usage status.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{Match, MatchDetails};
use matching::{MatchView, UsageSnapshot};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::Result;
use crate::state::AppState;

/// Direct partner request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub partner_id: String,
    pub community_id: String,
}

/// The caller's matching quota.
pub async fn usage_status(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Json<UsageSnapshot>> {
    Ok(Json(state.engine.usage_status(&principal).await?))
}

pub async fn pending(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Json<Vec<MatchView>>> {
    Ok(Json(state.partnerships.pending_matches(&principal).await?))
}

pub async fn active(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Json<Vec<MatchView>>> {
    Ok(Json(state.partnerships.active_matches(&principal).await?))
}

pub async fn request(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(request): Json<MatchRequest>,
) -> Result<(StatusCode, Json<Match>)> {
    let created = state
        .partnerships
        .request_match(&principal, &request.partner_id, &request.community_id)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(match_id): Path<String>,
) -> Result<Json<MatchDetails>> {
    Ok(Json(state.partnerships.get_match(&principal, &match_id).await?))
}

pub async fn accept(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(match_id): Path<String>,
) -> Result<Json<Match>> {
    Ok(Json(state.partnerships.accept(&principal, &match_id).await?))
}

pub async fn decline(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(match_id): Path<String>,
) -> Result<Json<Match>> {
    Ok(Json(state.partnerships.decline(&principal, &match_id).await?))
}
