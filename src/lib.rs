//! Inventory/dispatch API backend.
//!
//! Requests are authenticated with bearer tokens issued by the Supabase identity
//! provider: the provider's JWKS is fetched, the signing key is selected by `kid`
//! and converted (ES256 / RS256), and the verified claims become an
//! [`AuthenticatedUser`](services::auth::AuthenticatedUser).

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
