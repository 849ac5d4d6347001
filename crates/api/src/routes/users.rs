//! Dashboard stats and user search.

use axum::extract::{Query, State};
use axum::Json;
use database::{UserStats, UserSummary};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

pub async fn stats(
    State(state): State<AppState>,
    Caller(principal): Caller,
) -> Result<Json<UserStats>> {
    Ok(Json(state.users.stats(&principal).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<UserSummary>>> {
    Ok(Json(state.users.search(&principal, &params.q).await?))
}
