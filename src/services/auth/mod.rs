pub mod bearer;
pub mod error;
pub mod factory;
pub mod identity;
pub mod jwks;
pub mod key_cache;
pub mod key_resolver;
pub mod service;
pub mod verifier;

pub use bearer::bearer_token;
pub use error::AuthError;
pub use factory::build_auth_service;
pub use identity::{AuthenticatedUser, Permission, Role};
pub use jwks::{JwkSet, JwksFetcher, KeySetSource};
pub use key_cache::CachedKeySet;
pub use key_resolver::{KeyAlgorithm, KeyResolver};
pub use service::AuthService;
pub use verifier::{Claims, TokenVerifier};
