#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use inventory_api::services::auth::{
    AuthService, JwksFetcher, KeyAlgorithm, KeyResolver, TokenVerifier,
};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::pkcs8::{EncodePrivateKey, LineEnding};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";
pub const ANON_KEY: &str = "test-anon-key";

const RSA_PRIVATE_PEM: &str = include_str!("../fixtures/rsa_private.pem");
const RSA_PUBLIC_JWK: &str = include_str!("../fixtures/rsa_public_jwk.json");

/// Signing key plus the JWK the provider would publish for it.
pub struct TestKey {
    pub kid: String,
    pub algorithm: Algorithm,
    pub encoding_key: EncodingKey,
    pub jwk: Value,
}

impl TestKey {
    /// Fresh P-256 key pair.
    pub fn ec(kid: &str) -> Self {
        let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
        let point = secret.public_key().to_encoded_point(false);
        let pem = secret.to_pkcs8_pem(LineEnding::LF).expect("pkcs8 pem");

        Self {
            kid: kid.to_string(),
            algorithm: Algorithm::ES256,
            encoding_key: EncodingKey::from_ec_pem(pem.as_bytes()).expect("ec encoding key"),
            jwk: json!({
                "kty": "EC",
                "kid": kid,
                "alg": "ES256",
                "use": "sig",
                "crv": "P-256",
                "x": URL_SAFE_NO_PAD.encode(point.x().expect("x")),
                "y": URL_SAFE_NO_PAD.encode(point.y().expect("y")),
            }),
        }
    }

    /// Fixed 2048-bit RSA key from the fixtures directory.
    pub fn rsa(kid: &str) -> Self {
        let mut jwk: Value = serde_json::from_str(RSA_PUBLIC_JWK).expect("rsa jwk fixture");
        jwk["kid"] = json!(kid);
        jwk["alg"] = json!("RS256");
        jwk["use"] = json!("sig");

        Self {
            kid: kid.to_string(),
            algorithm: Algorithm::RS256,
            encoding_key: EncodingKey::from_rsa_pem(RSA_PRIVATE_PEM.as_bytes())
                .expect("rsa encoding key"),
            jwk,
        }
    }

    pub fn without_alg(mut self) -> Self {
        if let Some(obj) = self.jwk.as_object_mut() {
            obj.remove("alg");
        }
        self
    }

    pub fn sign(&self, claims: &Value) -> String {
        self.sign_as(&self.kid, claims)
    }

    /// Sign with this key but advertise `kid` in the header.
    pub fn sign_as(&self, kid: &str, claims: &Value) -> String {
        let mut header = Header::new(self.algorithm);
        header.kid = Some(kid.to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).expect("sign token")
    }
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn issuer(server: &MockServer) -> String {
    format!("{}/auth/v1", server.uri())
}

/// Claims a provider-issued user token carries, valid for an hour.
pub fn user_claims(server: &MockServer, sub: &str, email: &str) -> Value {
    json!({
        "sub": sub,
        "email": email,
        "role": "authenticated",
        "aud": "authenticated",
        "iss": issuer(server),
        "iat": now(),
        "exp": now() + 3600,
        "user_metadata": {"full_name": "Test Operator"},
        "app_metadata": {"provider": "email", "providers": ["email"]},
    })
}

/// Token with an arbitrary header and a junk signature.
pub fn forged_token(header: Value, claims: &Value) -> String {
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).expect("header json")),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("claims json")),
        URL_SAFE_NO_PAD.encode(b"not-a-signature"),
    )
}

pub async fn mount_jwks(server: &MockServer, keys: &[&TestKey]) {
    let body = json!({ "keys": keys.iter().map(|k| k.jwk.clone()).collect::<Vec<_>>() });
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn auth_service(server: &MockServer, default_key_alg: Option<KeyAlgorithm>) -> AuthService {
    let fetcher =
        JwksFetcher::new(&server.uri(), ANON_KEY, Duration::from_secs(5)).expect("fetcher");

    AuthService::new(
        Arc::new(fetcher),
        KeyResolver::new(default_key_alg),
        TokenVerifier::new(issuer(server), 0),
    )
}
