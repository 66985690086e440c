use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::Permission;
use crate::state::AppState;

use super::AuthCtx;

/// Requires an authenticated caller; 401 otherwise.
///
/// Relies on the access middleware having inserted `AuthCtx` into extensions.
pub struct CurrentUser(pub AuthCtx);

/// Authenticated caller if any. Never rejects.
pub struct MaybeUser(pub Option<AuthCtx>);

/// Requires elevated permission (`service_role`); 401 without identity, 403 without the permission.
pub struct ServiceRoleUser(pub AuthCtx);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthCtx>().cloned()))
    }
}

impl FromRequestParts<AppState> for ServiceRoleUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(ctx) = CurrentUser::from_request_parts(parts, state).await?;

        if !ctx.user.has_permission(Permission::Elevated) {
            tracing::warn!(user_id = %ctx.user.id, role = ctx.user.role.as_str(), "elevated permission required");
            return Err(AppError::Forbidden);
        }

        Ok(ServiceRoleUser(ctx))
    }
}
