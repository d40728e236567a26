//! Types for authentication and user management

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Session;

/// Response of the sign-up and token endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The access token
    pub access_token: Option<String>,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: Option<String>,

    /// The expiry time in seconds
    pub expires_in: Option<i64>,

    /// The expiry timestamp
    pub expires_at: Option<i64>,

    /// The user data
    pub user: Option<User>,
}

impl AuthResponse {
    /// The session carried by this response, if the user is signed in
    ///
    /// Sign-up with e-mail confirmation enabled returns a user but no tokens.
    pub fn session(&self) -> Option<Session> {
        let access_token = self.access_token.clone()?;
        let user = self.user.as_ref()?;

        let mut session = Session::new(
            access_token,
            self.refresh_token.clone().unwrap_or_default(),
            user.id.clone(),
            self.expires_in.unwrap_or(3600),
        );
        if let Some(token_type) = &self.token_type {
            session.token_type = token_type.clone();
        }
        if self.expires_at.is_some() {
            session.expires_at = self.expires_at;
        }
        Some(session)
    }
}

/// User data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The app metadata
    #[serde(default)]
    pub app_metadata: HashMap<String, serde_json::Value>,

    /// The user metadata
    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,

    /// The user's e-mail address
    pub email: Option<String>,

    /// When the e-mail was confirmed
    pub email_confirmed_at: Option<String>,

    /// The user's phone number
    pub phone: Option<String>,

    /// When the phone was confirmed
    pub phone_confirmed_at: Option<String>,

    /// The last sign-in time
    pub last_sign_in_at: Option<String>,

    /// The creation time
    pub created_at: Option<String>,

    /// The update time
    pub updated_at: Option<String>,

    /// The user's role
    pub role: Option<String>,
}

impl User {
    /// Read a string entry from the user metadata
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Display name chosen at sign-up
    pub fn full_name(&self) -> Option<&str> {
        self.metadata_str("full_name")
            .or_else(|| self.metadata_str("name"))
    }

    /// Whether the e-mail address has been confirmed
    pub fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// Whether the phone number has been confirmed
    pub fn is_phone_confirmed(&self) -> bool {
        self.phone_confirmed_at.is_some()
    }
}

/// User attributes that can be updated
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAttributes {
    /// E-mail address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// User metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}
