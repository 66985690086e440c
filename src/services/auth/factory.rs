/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{
    AuthService, CachedKeySet, JwksFetcher, KeyResolver, KeySetSource, TokenVerifier,
};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AppError> {
    let fetcher = JwksFetcher::new(
        &config.supabase_url,
        config.supabase_anon_key.clone(),
        config.jwks_timeout,
    )
    .map_err(|e| {
        error!(error = %e, "failed to build jwks http client");
        AppError::Internal
    })?;

    let keys: Arc<dyn KeySetSource> = if config.jwks_cache_ttl.is_zero() {
        Arc::new(fetcher)
    } else {
        Arc::new(CachedKeySet::new(fetcher, config.jwks_cache_ttl))
    };

    let verifier = TokenVerifier::new(
        TokenVerifier::issuer_for(&config.supabase_url),
        config.jwt_leeway_seconds,
    );

    info!(
        jwks_url = keys.source_url(),
        issuer = verifier.issuer(),
        cache_ttl = ?config.jwks_cache_ttl,
        default_key_alg = ?config.default_key_alg,
        "auth service configured"
    );

    Ok(Arc::new(AuthService::new(
        keys,
        KeyResolver::new(config.default_key_alg),
        verifier,
    )))
}
