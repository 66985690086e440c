use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::auth::Role;

#[derive(Debug, Serialize)]
pub struct ServiceHealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub authentication: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PublicResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub authenticated: bool,
    // email when present, otherwise the subject; "anonymous" without identity
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub is_authenticated: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenInfo {
    pub length: usize,
}

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub user: UserSummary,
    pub token_info: TokenInfo,
}
