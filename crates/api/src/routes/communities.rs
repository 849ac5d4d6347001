//! Community directory, membership and the AI matching trigger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::{Community, CommunityPage, Membership};
use matching::MatchOutcome;
use serde::Deserialize;
use tracing::info;

use crate::auth::Caller;
use crate::error::Result;
use crate::state::AppState;

/// Request to create a community.
#[derive(Deserialize)]
pub struct CreateCommunityRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Directory search and paging.
#[derive(Deserialize)]
pub struct DirectoryParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// The community directory; no identity needed.
pub async fn list_all(
    State(state): State<AppState>,
    Query(params): Query<DirectoryParams>,
) -> Result<Json<CommunityPage>> {
    let page = state
        .communities
        .directory(params.q.as_deref(), params.limit, params.offset)
        .await?;
    Ok(Json(page))
}

/// The caller's memberships.
pub async fn list_mine(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Json<Vec<Membership>>> {
    Ok(Json(state.communities.memberships(&principal).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Json(request): Json<CreateCommunityRequest>,
) -> Result<(StatusCode, Json<Community>)> {
    let created = state
        .communities
        .create(&principal, &request.name, request.description.as_deref())
        .await?;

    info!(community_id = %created.id, user_id = principal.id(), "Community created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn join(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(community_id): Path<String>,
) -> Result<Json<Community>> {
    Ok(Json(state.communities.join(&principal, &community_id).await?))
}

/// Run the matching engine for the caller in one community.
pub async fn ai_match(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(community_id): Path<String>,
) -> Result<Json<MatchOutcome>> {
    let outcome = state.engine.run(&principal, &community_id).await?;
    info!(
        community_id,
        user_id = principal.id(),
        matched = outcome.matched,
        "AI match completed"
    );
    Ok(Json(outcome))
}
