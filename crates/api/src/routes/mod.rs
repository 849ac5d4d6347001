//! Route handlers for the MeshMind API.

pub mod communities;
pub mod goals;
pub mod health;
pub mod matches;
pub mod messages;
pub mod users;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Communities and goals
        .route("/api/communities/all", get(communities::list_all))
        .route(
            "/api/communities",
            get(communities::list_mine).post(communities::create),
        )
        .route("/api/communities/:community_id/join", post(communities::join))
        .route(
            "/api/communities/:community_id/goals",
            get(goals::list).post(goals::create),
        )
        .route(
            "/api/communities/:community_id/aiMatch",
            post(communities::ai_match),
        )
        .route("/api/goals/:goal_id", patch(goals::update).delete(goals::delete))
        // Matches
        .route("/api/matches/aiMatch/status", get(matches::usage_status))
        .route("/api/matches/pending", get(matches::pending))
        .route("/api/matches/active", get(matches::active))
        .route("/api/matches/request", post(matches::request))
        .route("/api/matches/:match_id", get(matches::get))
        .route("/api/matches/:match_id/accept", post(matches::accept))
        .route("/api/matches/:match_id/decline", post(matches::decline))
        .route(
            "/api/matches/:match_id/messages",
            get(messages::list).post(messages::send),
        )
        .route("/api/matches/:match_id/insight", post(messages::insight))
        // Users
        .route("/api/user/stats", get(users::stats))
        .route("/api/users/search", get(users::search))
}
