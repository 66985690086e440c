/*
 * Responsibility
 * - URL layout of v1
 * - Authentication is applied to the whole tree by middleware; each handler's
 *   extractor decides whether an identity is required
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth_check::{admin_view, protected_view, public_view, service_health},
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/test/health", get(service_health))
        .route("/test/public", get(public_view))
        .route("/test/protected", get(protected_view))
        .route("/test/admin", get(admin_view))
}
