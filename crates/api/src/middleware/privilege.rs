//! Privilege-enforcing extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not hold the named privilege. Use these in route handlers to enforce
//! authorization at the type level; the handler signature then documents
//! exactly which privilege gates it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use pressroom_core::error::CoreError;
use pressroom_core::privileges::{privilege_names, role_has_privilege};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

async fn require(
    parts: &mut Parts,
    state: &AppState,
    privilege: &'static str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !role_has_privilege(&user.role, privilege) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Privilege '{privilege}' required"
        ))));
    }
    Ok(user)
}

/// Requires the `event_management` privilege (create/modify/lock events).
pub struct RequireEventManagement(pub AuthUser);

impl FromRequestParts<AppState> for RequireEventManagement {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, privilege_names::EVENT_MANAGEMENT)
            .await
            .map(RequireEventManagement)
    }
}

/// Requires the `event_spike` privilege.
pub struct RequireEventSpike(pub AuthUser);

impl FromRequestParts<AppState> for RequireEventSpike {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, privilege_names::EVENT_SPIKE)
            .await
            .map(RequireEventSpike)
    }
}

/// Requires the `event_unspike` privilege.
pub struct RequireEventUnspike(pub AuthUser);

impl FromRequestParts<AppState> for RequireEventUnspike {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, privilege_names::EVENT_UNSPIKE)
            .await
            .map(RequireEventUnspike)
    }
}

/// Requires the `event_publish` privilege.
pub struct RequireEventPublish(pub AuthUser);

impl FromRequestParts<AppState> for RequireEventPublish {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, privilege_names::EVENT_PUBLISH)
            .await
            .map(RequireEventPublish)
    }
}

/// Requires the `planning_management` privilege.
pub struct RequirePlanningManagement(pub AuthUser);

impl FromRequestParts<AppState> for RequirePlanningManagement {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require(parts, state, privilege_names::PLANNING_MANAGEMENT)
            .await
            .map(RequirePlanningManagement)
    }
}
