//! Bearer token → verification → `AuthCtx` in request extensions.
//!
//! - No `Authorization: Bearer` credential: the request continues anonymously.
//!   Handlers that need an identity reject it through their extractor.
//! - A credential that fails verification is rejected with 401 on every route.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::bearer_token;
use crate::state::AppState;

/// Apply the authentication middleware to `router`.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(req.headers()) else {
        return Ok(next.run(req).await);
    };

    // AuthService logs the failure kind before we collapse it to 401.
    let user = state.auth.authenticate(token).await?;
    let auth_ctx = AuthCtx::new(user, token.len());

    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}
