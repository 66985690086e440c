//! Token header parsing and JWK → verification key conversion.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use jsonwebtoken::{Algorithm, DecodingKey};
use p256::elliptic_curve::sec1::FromEncodedPoint;
use p256::pkcs8::{EncodePublicKey, LineEnding};
use p256::{EncodedPoint, FieldBytes, PublicKey};
use serde::Deserialize;
use tracing::debug;

use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::{Jwk, JwkSet};

// base64url that accepts both padded and unpadded input.
const B64URL_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const P256_COORDINATE_LEN: usize = 32;

/// Signature algorithms we verify. Anything else is rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Es256,
    Rs256,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Es256 => "ES256",
            Self::Rs256 => "RS256",
        }
    }

    pub fn jwt_algorithm(&self) -> Algorithm {
        match self {
            Self::Es256 => Algorithm::ES256,
            Self::Rs256 => Algorithm::RS256,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ES256" => Ok(Self::Es256),
            "RS256" => Ok(Self::Rs256),
            other => Err(AuthError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Unverified first segment of a compact JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

impl TokenHeader {
    /// Decode the header segment without touching the signature.
    pub fn parse(token: &str) -> Result<Self, AuthError> {
        let (segment, _) = token
            .split_once('.')
            .ok_or(AuthError::TokenMalformed("missing header segment"))?;

        let raw = B64URL_LENIENT
            .decode(segment)
            .map_err(|_| AuthError::TokenMalformed("header is not base64url"))?;

        serde_json::from_slice(&raw).map_err(|_| AuthError::TokenMalformed("header is not json"))
    }
}

/// Public key ready for signature verification.
///
/// Lives for one verification only. Key material is not printable via Debug.
#[derive(Clone)]
pub struct ResolvedKey {
    pub kid: String,
    pub algorithm: KeyAlgorithm,
    pub decoding_key: DecodingKey,
}

impl fmt::Debug for ResolvedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedKey")
            .field("kid", &self.kid)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

/// Selects and converts the key a token was signed with.
#[derive(Debug, Clone, Copy)]
pub struct KeyResolver {
    // Assumed when a JWK omits `alg`. `None` rejects such keys.
    default_key_alg: Option<KeyAlgorithm>,
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self {
            default_key_alg: Some(KeyAlgorithm::Es256),
        }
    }
}

impl KeyResolver {
    pub fn new(default_key_alg: Option<KeyAlgorithm>) -> Self {
        Self { default_key_alg }
    }

    pub fn default_key_alg(&self) -> Option<KeyAlgorithm> {
        self.default_key_alg
    }

    pub fn resolve(&self, token: &str, keys: &JwkSet) -> Result<ResolvedKey, AuthError> {
        let header = TokenHeader::parse(token)?;

        // Reject before any key lookup or construction.
        header.alg.parse::<KeyAlgorithm>()?;

        let kid = header
            .kid
            .as_deref()
            .ok_or(AuthError::KeyNotFound(None))?;
        let jwk = keys
            .find(kid)
            .ok_or_else(|| AuthError::KeyNotFound(Some(kid.to_string())))?;

        let algorithm = match jwk.alg.as_deref() {
            Some(alg) => alg.parse::<KeyAlgorithm>()?,
            None => self
                .default_key_alg
                .ok_or_else(|| AuthError::UnsupportedAlgorithm("<unspecified>".to_string()))?,
        };

        debug!(kid, token_alg = %header.alg, key_alg = %algorithm, "resolved signing key");

        let decoding_key = match algorithm {
            KeyAlgorithm::Es256 => ec_decoding_key(jwk)?,
            KeyAlgorithm::Rs256 => rsa_decoding_key(jwk)?,
        };

        Ok(ResolvedKey {
            kid: kid.to_string(),
            algorithm,
            decoding_key,
        })
    }
}

fn ec_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "EC" {
        return Err(conversion(format!("ES256 needs an EC key, got {}", jwk.kty)));
    }
    if let Some(crv) = jwk.crv.as_deref() {
        if crv != "P-256" {
            return Err(conversion(format!("unsupported curve {crv}")));
        }
    }

    let x = coordinate(jwk.x.as_deref(), "x")?;
    let y = coordinate(jwk.y.as_deref(), "y")?;

    let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
    let public_key = Option::<PublicKey>::from(PublicKey::from_encoded_point(&point))
        .ok_or_else(|| conversion("point is not on P-256".to_string()))?;

    let pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| conversion(format!("spki encoding failed: {e}")))?;

    DecodingKey::from_ec_pem(pem.as_bytes()).map_err(|e| conversion(e.to_string()))
}

/// Decode a base64url coordinate as a big-endian unsigned integer, left-padded to 32 bytes.
fn coordinate(value: Option<&str>, name: &'static str) -> Result<FieldBytes, AuthError> {
    let value = value.ok_or_else(|| conversion(format!("missing '{name}'")))?;
    let raw = B64URL_LENIENT
        .decode(value)
        .map_err(|_| conversion(format!("'{name}' is not base64url")))?;

    let first_nonzero = raw.iter().position(|b| *b != 0).unwrap_or(raw.len());
    let digits = raw.get(first_nonzero..).unwrap_or_default();
    if digits.len() > P256_COORDINATE_LEN {
        return Err(conversion(format!("'{name}' exceeds 32 bytes")));
    }

    let mut out = FieldBytes::default();
    out[P256_COORDINATE_LEN - digits.len()..].copy_from_slice(digits);
    Ok(out)
}

fn rsa_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    if jwk.kty != "RSA" {
        return Err(conversion(format!("RS256 needs an RSA key, got {}", jwk.kty)));
    }
    let n = jwk.n.as_deref().ok_or_else(|| conversion("missing 'n'".into()))?;
    let e = jwk.e.as_deref().ok_or_else(|| conversion("missing 'e'".into()))?;

    DecodingKey::from_rsa_components(n, e).map_err(|e| conversion(e.to_string()))
}

fn conversion(reason: String) -> AuthError {
    AuthError::KeyConversionFailed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    use p256::elliptic_curve::sec1::ToEncodedPoint;

    fn header_only_token(header: serde_json::Value) -> String {
        format!(
            "{}.e30.c2ln",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap())
        )
    }

    fn ec_jwk(kid: &str, alg: Option<&str>) -> Jwk {
        let secret = p256::SecretKey::random(&mut rand::rngs::OsRng);
        let point = secret.public_key().to_encoded_point(false);
        Jwk {
            kty: "EC".into(),
            kid: Some(kid.into()),
            alg: alg.map(str::to_string),
            key_use: Some("sig".into()),
            crv: Some("P-256".into()),
            x: Some(URL_SAFE_NO_PAD.encode(point.x().unwrap())),
            y: Some(URL_SAFE_NO_PAD.encode(point.y().unwrap())),
            n: None,
            e: None,
        }
    }

    fn set(keys: Vec<Jwk>) -> JwkSet {
        JwkSet { keys }
    }

    #[test]
    fn header_parse_rejects_garbage() {
        assert!(matches!(
            TokenHeader::parse("no-dots-here"),
            Err(AuthError::TokenMalformed(_))
        ));
        assert!(matches!(
            TokenHeader::parse("!!!.e30.sig"),
            Err(AuthError::TokenMalformed(_))
        ));
        let not_json = format!("{}.e30.sig", URL_SAFE_NO_PAD.encode(b"not json"));
        assert!(matches!(
            TokenHeader::parse(&not_json),
            Err(AuthError::TokenMalformed(_))
        ));
    }

    #[test]
    fn resolves_ec_key_by_kid() {
        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k1"}));
        let keys = set(vec![ec_jwk("k0", Some("ES256")), ec_jwk("k1", Some("ES256"))]);

        let resolved = KeyResolver::default().resolve(&token, &keys).unwrap();

        assert_eq!(resolved.kid, "k1");
        assert_eq!(resolved.algorithm, KeyAlgorithm::Es256);
    }

    #[test]
    fn padded_coordinates_are_accepted() {
        let mut jwk = ec_jwk("k1", Some("ES256"));
        let x = URL_SAFE_NO_PAD.decode(jwk.x.as_deref().unwrap()).unwrap();
        let y = URL_SAFE_NO_PAD.decode(jwk.y.as_deref().unwrap()).unwrap();
        jwk.x = Some(URL_SAFE.encode(x));
        jwk.y = Some(URL_SAFE.encode(y));

        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k1"}));
        assert!(KeyResolver::default().resolve(&token, &set(vec![jwk])).is_ok());
    }

    #[test]
    fn unknown_kid_is_key_not_found() {
        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k2"}));
        let err = KeyResolver::default()
            .resolve(&token, &set(vec![ec_jwk("k1", Some("ES256"))]))
            .unwrap_err();

        assert!(matches!(err, AuthError::KeyNotFound(Some(ref kid)) if kid == "k2"));
    }

    #[test]
    fn token_without_kid_is_key_not_found() {
        let token = header_only_token(serde_json::json!({"alg": "ES256"}));
        let err = KeyResolver::default()
            .resolve(&token, &set(vec![ec_jwk("k1", Some("ES256"))]))
            .unwrap_err();

        assert!(matches!(err, AuthError::KeyNotFound(None)));
    }

    #[test]
    fn token_alg_outside_allowlist_is_rejected_before_lookup() {
        for alg in ["HS256", "none", "ES384", "PS256"] {
            let token = header_only_token(serde_json::json!({"alg": alg, "kid": "k1"}));
            // Empty key set: a lookup would have produced KeyNotFound instead.
            let err = KeyResolver::default().resolve(&token, &set(vec![])).unwrap_err();
            assert!(matches!(err, AuthError::UnsupportedAlgorithm(ref a) if a == alg));
        }
    }

    #[test]
    fn key_alg_outside_allowlist_is_rejected() {
        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k1"}));
        let err = KeyResolver::default()
            .resolve(&token, &set(vec![ec_jwk("k1", Some("ES384"))]))
            .unwrap_err();

        assert!(matches!(err, AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn missing_key_alg_falls_back_to_configured_default() {
        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k1"}));
        let keys = set(vec![ec_jwk("k1", None)]);

        let resolved = KeyResolver::default().resolve(&token, &keys).unwrap();
        assert_eq!(resolved.algorithm, KeyAlgorithm::Es256);

        let err = KeyResolver::new(None).resolve(&token, &keys).unwrap_err();
        assert!(matches!(err, AuthError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn point_off_curve_fails_conversion() {
        let mut jwk = ec_jwk("k1", Some("ES256"));
        jwk.y = jwk.x.clone();

        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k1"}));
        let err = KeyResolver::default()
            .resolve(&token, &set(vec![jwk]))
            .unwrap_err();

        assert!(matches!(err, AuthError::KeyConversionFailed(_)));
    }

    #[test]
    fn bad_coordinates_fail_conversion() {
        let token = header_only_token(serde_json::json!({"alg": "ES256", "kid": "k1"}));

        let mut not_b64 = ec_jwk("k1", Some("ES256"));
        not_b64.x = Some("***".into());
        let mut too_long = ec_jwk("k1", Some("ES256"));
        too_long.x = Some(URL_SAFE_NO_PAD.encode([0xffu8; 33]));
        let mut missing = ec_jwk("k1", Some("ES256"));
        missing.y = None;
        let mut wrong_curve = ec_jwk("k1", Some("ES256"));
        wrong_curve.crv = Some("P-384".into());

        for jwk in [not_b64, too_long, missing, wrong_curve] {
            let err = KeyResolver::default()
                .resolve(&token, &set(vec![jwk]))
                .unwrap_err();
            assert!(matches!(err, AuthError::KeyConversionFailed(_)), "{err:?}");
        }
    }

    #[test]
    fn short_coordinate_is_left_padded() {
        let mut raw = [0u8; 32];
        raw[31] = 7;
        let encoded = URL_SAFE_NO_PAD.encode([7u8]);

        let out = coordinate(Some(&encoded), "x").unwrap();
        assert_eq!(out.as_slice(), raw.as_slice());
    }

    #[test]
    fn rs256_key_needs_rsa_material() {
        let token = header_only_token(serde_json::json!({"alg": "RS256", "kid": "r1"}));
        let jwk = Jwk {
            kty: "RSA".into(),
            kid: Some("r1".into()),
            alg: Some("RS256".into()),
            key_use: None,
            crv: None,
            x: None,
            y: None,
            n: None,
            e: Some("AQAB".into()),
        };

        let err = KeyResolver::default()
            .resolve(&token, &set(vec![jwk]))
            .unwrap_err();
        assert!(matches!(err, AuthError::KeyConversionFailed(_)));
    }

    #[test]
    fn key_type_must_match_algorithm() {
        let token = header_only_token(serde_json::json!({"alg": "RS256", "kid": "k1"}));
        let err = KeyResolver::default()
            .resolve(&token, &set(vec![ec_jwk("k1", Some("RS256"))]))
            .unwrap_err();

        assert!(matches!(err, AuthError::KeyConversionFailed(_)));
    }
}
