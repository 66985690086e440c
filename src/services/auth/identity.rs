use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::services::auth::verifier::Claims;

/// Role carried in the `role` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Authenticated,
    ServiceRole,
    Other(String),
}

impl Role {
    pub fn from_claim(role: Option<&str>) -> Self {
        match role {
            None | Some("authenticated") => Self::Authenticated,
            Some("service_role") => Self::ServiceRole,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Authenticated => "authenticated",
            Self::ServiceRole => "service_role",
            Self::Other(role) => role,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Capabilities handlers can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Elevated,
}

/// Application-level identity built from a verified claim set.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
    pub user_metadata: Map<String, Value>,
    pub app_metadata: Map<String, Value>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            role: Role::from_claim(claims.role.as_deref()),
            id: claims.sub,
            email: claims.email,
            user_metadata: claims.user_metadata.unwrap_or_default(),
            app_metadata: claims.app_metadata.unwrap_or_default(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        true
    }

    pub fn is_anonymous(&self) -> bool {
        false
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        match permission {
            Permission::Elevated => self.role == Role::ServiceRole,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl fmt::Display for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.email.as_deref().unwrap_or(&self.id))
    }
}
