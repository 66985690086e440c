use jsonwebtoken::Validation;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::services::auth::error::AuthError;
use crate::services::auth::key_resolver::ResolvedKey;

/// Audience every provider-issued user token carries.
pub const EXPECTED_AUDIENCE: &str = "authenticated";

/// Verified claim set.
///
/// Only produced by `TokenVerifier::verify` after the signature checks out.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    // string or array of strings; audience membership is checked by `Validation`
    pub aud: Value,
    pub exp: u64,

    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub app_metadata: Option<Map<String, Value>>,

    // provider-specific extras (aal, session_id, amr, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Signature + registered-claim verification against a resolved key.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    leeway_seconds: u64,
}

impl TokenVerifier {
    pub fn new(issuer: impl Into<String>, leeway_seconds: u64) -> Self {
        Self {
            issuer: issuer.into(),
            audience: EXPECTED_AUDIENCE.to_string(),
            leeway_seconds,
        }
    }

    /// `{base_url}/auth/v1`
    pub fn issuer_for(base_url: &str) -> String {
        format!("{}/auth/v1", base_url.trim_end_matches('/'))
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Checks signature (with exactly the key's algorithm), `exp`, `aud` and `iss`.
    pub fn verify(&self, token: &str, key: &ResolvedKey) -> Result<Claims, AuthError> {
        // Single-algorithm validation: a token whose header names another
        // algorithm fails with InvalidAlgorithm.
        let mut validation = Validation::new(key.algorithm.jwt_algorithm());
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);
        validation.leeway = self.leeway_seconds;

        let data = jsonwebtoken::decode::<Claims>(token, &key.decoding_key, &validation)?;
        Ok(data.claims)
    }
}
