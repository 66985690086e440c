/*
 * Responsibility
 * - Authenticated context as seen by handlers
 * - The middleware verifies and stores it in request extensions; handlers only receive this type
 */

use crate::services::auth::AuthenticatedUser;

/// Context attached to a request carrying a verified bearer token.
///
/// The raw token is not kept; `token_length` is enough for diagnostics.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub user: AuthenticatedUser,
    pub token_length: usize,
}

impl AuthCtx {
    pub fn new(user: AuthenticatedUser, token_length: usize) -> Self {
        Self { user, token_length }
    }
}
