use axum::http::{HeaderMap, header};
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the bearer token out of the `Authorization` header.
///
/// `None` means no credential: the header is absent, not valid UTF-8/visible
/// ASCII, or lacks the case-sensitive `Bearer ` prefix. The remainder after the
/// prefix is returned verbatim.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        debug!("no authorization header");
        return None;
    };

    let Ok(value) = value.to_str() else {
        debug!("authorization header is not visible ascii");
        return None;
    };

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) => {
            debug!("bearer credential present");
            Some(token)
        }
        None => {
            debug!("authorization header without 'Bearer ' prefix");
            None
        }
    }
}
