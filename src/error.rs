//! Error handling for the Grabi client

use std::fmt;
use thiserror::Error;

use crate::i18n::{Locale, MessageKey};

/// Unified error type for the Grabi client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A backend endpoint answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An operation needing a signed-in user was called without a session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Database query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Edge Function errors
    #[error("Function error: {0}")]
    Function(String),

    /// Payment provider errors
    #[error("Payment error: {0}")]
    Payment(String),

    /// A form field failed its presence check
    #[error("Validation error: {0:?}")]
    Validation(MessageKey),

    /// A user tried to review their own seller profile
    #[error("A seller cannot review themselves")]
    SelfReview,

    /// A row that should exist was not returned
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new function error
    pub fn function<T: fmt::Display>(msg: T) -> Self {
        Error::Function(msg.to_string())
    }

    /// Create a new payment error
    pub fn payment<T: fmt::Display>(msg: T) -> Self {
        Error::Payment(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(what: T) -> Self {
        Error::NotFound(what.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the backend reported a unique constraint violation
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Api { status, message } => *status == 409 || message.contains("23505"),
            _ => false,
        }
    }

    /// The translated message the UI shows for this error
    pub fn message_key(&self) -> MessageKey {
        match self {
            Error::Validation(key) => *key,
            Error::SelfReview => MessageKey::CannotReviewYourself,
            Error::NotAuthenticated => MessageKey::NotAuthenticated,
            Error::Auth(_) => MessageKey::InvalidCredentials,
            Error::Http(_) => MessageKey::NetworkError,
            Error::Payment(_) => MessageKey::PaymentFailed,
            Error::Api { status: 401, .. } => MessageKey::SessionExpired,
            _ => MessageKey::UnexpectedError,
        }
    }

    /// Shorthand for translating [`Error::message_key`]
    pub fn user_message(&self, locale: Locale) -> &'static str {
        self.message_key().text(locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_detected_from_postgres_code() {
        let err = Error::Api {
            status: 400,
            message: "duplicate key value violates unique constraint (23505)".to_string(),
        };
        assert!(err.is_conflict());
    }

    #[test]
    fn unrelated_conflict_gets_the_generic_message() {
        let err = Error::Api {
            status: 409,
            message: "duplicate key value violates unique constraint \"checkout_sessions_pkey\" (23505)"
                .to_string(),
        };
        assert!(err.is_conflict());
        assert_eq!(err.message_key(), MessageKey::UnexpectedError);
    }

    #[test]
    fn self_review_has_its_own_message() {
        assert_eq!(
            Error::SelfReview.user_message(Locale::En),
            "You cannot review yourself."
        );
    }
}
