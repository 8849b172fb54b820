//! Authenticated user and session records.
//!
//! The session triple `{token, user, login time}` is persisted under the
//! storage keys listed here and is valid for a fixed window after login.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key of the opaque bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Storage key of the JSON-serialized `User`.
pub const USER_KEY: &str = "auth_user";
/// Storage key of the login time in epoch milliseconds.
pub const TIME_KEY: &str = "auth_time";

/// All keys owned by the session store.
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USER_KEY, TIME_KEY];

/// A user role. Unknown roles are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Doctor,
    Patient,
    Admin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Doctor => "doctor",
            Self::Patient => "patient",
            Self::Admin => "admin",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "doctor" => Self::Doctor,
            "patient" => Self::Patient,
            "admin" => Self::Admin,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The user record returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

impl User {
    /// Full name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Body of a successful `/auth/login` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// A valid, unexpired session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub authenticated_at: DateTime<Utc>,
}
