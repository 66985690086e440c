use std::sync::Arc;

use base64::Engine as _;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::services::auth::error::AuthError;
use crate::services::auth::identity::AuthenticatedUser;
use crate::services::auth::jwks::KeySetSource;
use crate::services::auth::key_resolver::KeyResolver;
use crate::services::auth::verifier::{Claims, TokenVerifier};

/// Bearer-token authentication: fetch key set → resolve key → verify → project.
///
/// Holds no per-attempt state; concurrent calls are independent apart from
/// whatever the key-set source shares internally.
#[derive(Clone)]
pub struct AuthService {
    keys: Arc<dyn KeySetSource>,
    resolver: KeyResolver,
    verifier: TokenVerifier,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("jwks_url", &self.keys.source_url())
            .field("resolver", &self.resolver)
            .field("verifier", &self.verifier)
            .finish()
    }
}

impl AuthService {
    pub fn new(keys: Arc<dyn KeySetSource>, resolver: KeyResolver, verifier: TokenVerifier) -> Self {
        Self {
            keys,
            resolver,
            verifier,
        }
    }

    /// Verify a token and return its claim set.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let keys = self.keys.key_set().await?;
        let key = self.resolver.resolve(token, &keys)?;
        self.verifier.verify(token, &key)
    }

    /// Verify a token and project it into an application identity.
    ///
    /// This is the entry-point for middleware. Failures are logged here with
    /// their kind before being handed back.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let fingerprint = token_fingerprint(token);

        match self.verify(token).await {
            Ok(claims) => {
                let user = AuthenticatedUser::from_claims(claims);
                debug!(token = %fingerprint, user_id = %user.id, role = user.role.as_str(), "token verified");
                Ok(user)
            }
            Err(err) => {
                warn!(
                    token = %fingerprint,
                    kind = err.kind(),
                    transient = err.is_transient(),
                    error = %err,
                    "token verification failed"
                );
                Err(err)
            }
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }
}

/// Short, non-reversible token identifier for logs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(12);
    encoded
}
