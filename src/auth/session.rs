//! Session management for authentication

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::Error;

/// Claims the backend puts in its access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// The user ID
    pub sub: String,

    /// Expiry as a unix timestamp
    pub exp: i64,

    /// The user's e-mail, when the token carries one
    #[serde(default)]
    pub email: Option<String>,

    /// The database role (`authenticated`, `anon`)
    #[serde(default)]
    pub role: Option<String>,
}

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: String,

    /// The user ID
    pub user_id: String,

    /// The token type
    pub token_type: String,

    /// The expiry time in seconds
    pub expires_in: i64,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session
    pub fn new(
        access_token: String,
        refresh_token: String,
        user_id: String,
        expires_in: i64,
    ) -> Self {
        let now = Utc::now().timestamp();

        Self {
            access_token,
            refresh_token,
            user_id,
            token_type: "bearer".to_string(),
            expires_in,
            expires_at: Some(now + expires_in),
        }
    }

    /// Rebuild a session from a stored access token
    ///
    /// The signature is not verified here: the backend verifies it on every
    /// request, the client only needs the subject and expiry.
    pub fn from_access_token(access_token: &str, refresh_token: &str) -> Result<Self, Error> {
        let claims = decode_claims(access_token)?;
        let now = Utc::now().timestamp();

        Ok(Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            user_id: claims.sub,
            token_type: "bearer".to_string(),
            expires_in: (claims.exp - now).max(0),
            expires_at: Some(claims.exp),
        })
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    /// Expiry as a timestamp
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }
}

/// Read the claims of an access token without checking its signature
pub fn decode_claims(token: &str) -> Result<AccessClaims, Error> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
