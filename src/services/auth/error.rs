use thiserror::Error;

/// Reasons an authentication attempt is rejected.
///
/// A missing or non-`Bearer` credential is not represented here: the bearer
/// extractor returns `None` for it and the request proceeds as anonymous.
/// Every variant is scoped to one request; none of them is fatal to the process.
#[derive(Debug, Error)]
pub enum AuthError {
    // Provider unreachable, timed out, or answered with a non-200 status.
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),

    #[error("key set malformed: {0}")]
    KeySetMalformed(#[source] serde_json::Error),

    #[error("token malformed: {0}")]
    TokenMalformed(&'static str),

    #[error("no key matches kid {0:?}")]
    KeyNotFound(Option<String>),

    #[error("key conversion failed: {0}")]
    KeyConversionFailed(String),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("token expired")]
    TokenExpired,

    #[error("token invalid: {0}")]
    TokenInvalid(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Stable label used in logs so rejections stay distinguishable after
    /// they collapse into a single 401 at the HTTP boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::KeySetUnavailable(_) => "key_set_unavailable",
            Self::KeySetMalformed(_) => "key_set_malformed",
            Self::TokenMalformed(_) => "token_malformed",
            Self::KeyNotFound(_) => "key_not_found",
            Self::KeyConversionFailed(_) => "key_conversion_failed",
            Self::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            Self::TokenExpired => "token_expired",
            Self::TokenInvalid(_) => "token_invalid",
        }
    }

    /// Infrastructure failure on the provider side rather than a bad token.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::KeySetUnavailable(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::TokenInvalid(e),
        }
    }
}
