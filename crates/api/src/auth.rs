//! Caller identity forwarded by the identity gateway.
//!
//! The gateway verifies the session and passes the account as
//! `x-identity-*` headers. Handlers take [`Caller`] to get the upserted
//! user as a [`Principal`].

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use database::{user, validation, IdentityProfile};
use matching::{Principal, Tier};

use crate::error::ApiError;
use crate::state::AppState;

pub const IDENTITY_ID: &str = "x-identity-id";
pub const IDENTITY_EMAIL: &str = "x-identity-email";
pub const IDENTITY_NAME: &str = "x-identity-name";
pub const IDENTITY_AVATAR: &str = "x-identity-avatar";
pub const IDENTITY_PLAN: &str = "x-identity-plan";

/// Display name for accounts without one.
pub const DEFAULT_NAME: &str = "MeshMind User";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Check the gateway's bearer token when one is configured.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.identity_token.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized("missing gateway token"))?;

    if provided != expected {
        return Err(ApiError::Unauthorized("gateway token mismatch"));
    }
    Ok(())
}

/// Read the identity headers into a profile and tier.
fn identity(headers: &HeaderMap) -> Result<(IdentityProfile, Tier), ApiError> {
    let external_id =
        header_value(headers, IDENTITY_ID).ok_or(ApiError::Unauthorized("missing identity"))?;
    let email =
        header_value(headers, IDENTITY_EMAIL).ok_or(ApiError::Unauthorized("missing email"))?;
    validation::validate_email(email).map_err(|_| ApiError::Unauthorized("invalid email"))?;

    let tier = match header_value(headers, IDENTITY_PLAN) {
        Some(plan) if plan.eq_ignore_ascii_case("pro") => Tier::Privileged,
        _ => Tier::Standard,
    };

    let profile = IdentityProfile {
        external_id: external_id.to_string(),
        email: email.to_string(),
        name: header_value(headers, IDENTITY_NAME)
            .unwrap_or(DEFAULT_NAME)
            .to_string(),
        image_url: header_value(headers, IDENTITY_AVATAR).map(str::to_string),
    };
    Ok((profile, tier))
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authorize(state, &parts.headers)?;
        let (profile, tier) = identity(&parts.headers)?;

        let user = user::upsert_identity(state.db.pool(), &profile).await?;
        tracing::debug!(user_id = %user.id, ?tier, "Caller resolved");
        Ok(Caller(Principal::new(user, tier)))
    }
}
