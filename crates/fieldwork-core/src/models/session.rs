//! Authenticated session and current-user models

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::util::normalize_text_option;

/// Bearer session issued by `POST /auth/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    /// Builds a session from a raw token, reading `username` and `role` from
    /// the JWT payload when it can be decoded.
    #[must_use]
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into().trim().to_string();
        let claims = decode_claims(&token).unwrap_or_default();
        Self {
            token,
            username: normalize_text_option(claims.username),
            role: normalize_text_option(claims.role),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or("unknown user")
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("role", &self.role)
            .finish()
    }
}

/// Response of `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}
