//! Learning goal routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::LearningGoal;
use matching::GoalEdit;
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateGoalRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial goal update; absent fields stay as they are.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(community_id): Path<String>,
) -> Result<Json<Vec<LearningGoal>>> {
    Ok(Json(state.goals.list(&principal, &community_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(community_id): Path<String>,
    Json(request): Json<CreateGoalRequest>,
) -> Result<(StatusCode, Json<LearningGoal>)> {
    let created = state
        .goals
        .create(
            &principal,
            &community_id,
            &request.title,
            request.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(goal_id): Path<String>,
    Json(request): Json<UpdateGoalRequest>,
) -> Result<Json<LearningGoal>> {
    let edit = GoalEdit {
        title: request.title,
        description: request.description,
        is_completed: request.is_completed,
    };
    Ok(Json(state.goals.update(&principal, &goal_id, &edit).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(goal_id): Path<String>,
) -> Result<StatusCode> {
    state.goals.delete(&principal, &goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
