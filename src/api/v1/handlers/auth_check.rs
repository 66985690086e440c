/*
 * Responsibility
 * - GET /test/health, /test/public, /test/protected, /test/admin
 * - Lets operators check the bearer-token flow end to end
 */
use axum::Json;
use chrono::Utc;

use crate::api::v1::dto::auth_check::{
    ProtectedResponse, PublicResponse, ServiceHealthResponse, TokenInfo, UserSummary,
};
use crate::api::v1::extractors::{AuthCtx, CurrentUser, MaybeUser, ServiceRoleUser};

pub async fn service_health() -> Json<ServiceHealthResponse> {
    Json(ServiceHealthResponse {
        status: "healthy",
        service: "inventory-api",
        authentication: "Supabase JWT",
        timestamp: Utc::now(),
    })
}

pub async fn public_view(MaybeUser(ctx): MaybeUser) -> Json<PublicResponse> {
    let (authenticated, user) = match ctx {
        Some(ctx) => (true, ctx.user.to_string()),
        None => (false, "anonymous".to_string()),
    };

    Json(PublicResponse {
        status: "success",
        message: "public endpoint",
        authenticated,
        user,
    })
}

pub async fn protected_view(CurrentUser(ctx): CurrentUser) -> Json<ProtectedResponse> {
    Json(protected_response(ctx, "authenticated"))
}

pub async fn admin_view(ServiceRoleUser(ctx): ServiceRoleUser) -> Json<ProtectedResponse> {
    Json(protected_response(ctx, "elevated permission granted"))
}

fn protected_response(ctx: AuthCtx, message: &'static str) -> ProtectedResponse {
    let is_authenticated = ctx.user.is_authenticated();

    ProtectedResponse {
        status: "success",
        message,
        user: UserSummary {
            id: ctx.user.id,
            email: ctx.user.email,
            role: ctx.user.role,
            is_authenticated,
        },
        token_info: TokenInfo {
            length: ctx.token_length,
        },
    }
}
