//! Authentication and user management

mod session;
mod types;

use log::{debug, info};
use reqwest::Client;
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ClientOptions;
use crate::error::Error;
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Client for the backend's authentication API
#[derive(Clone)]
pub struct Auth {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// HTTP client used for requests
    client: Client,

    /// The current session, shared with every service built from the same client
    session: Arc<Mutex<Option<Session>>>,

    /// Client options
    options: ClientOptions,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(url: &str, key: &str, client: Client, options: ClientOptions) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            client,
            session: Arc::new(Mutex::new(None)),
            options,
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    /// Session slot, recovering from a poisoned lock
    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn store(&self, response: &AuthResponse) {
        if let Some(session) = response.session() {
            *self.lock() = Some(session);
        }
    }

    /// Sign up a new user with e-mail, password and display name
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/signup");

        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });

        let result = Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<AuthResponse>()
            .await?;

        self.store(&result);
        info!("signed up {}", email);

        Ok(result)
    }

    /// Sign in a user with e-mail and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/token?grant_type=password");

        let body = json!({
            "email": email,
            "password": password,
        });

        let result = Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .timeout(self.options.request_timeout)
            .json(&body)?
            .execute::<AuthResponse>()
            .await
            .map_err(|e| match e {
                Error::Api { status: 400, message } | Error::Api { status: 401, message } => {
                    Error::Auth(message)
                }
                other => other,
            })?;

        if result.access_token.is_none() {
            return Err(Error::auth("token endpoint returned no access token"));
        }

        self.store(&result);
        debug!("signed in {}", email);

        Ok(result)
    }

    /// Sign out the current user
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");
        let token = self.access_token()?;

        Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .execute_raw()
            .await?;

        // The local session goes away even if the server already forgot the token.
        *self.lock() = None;

        Ok(())
    }

    /// Send a password recovery e-mail
    pub async fn reset_password_for_email(&self, email: &str) -> Result<(), Error> {
        let url = self.get_auth_url("/recover");

        Fetch::post(&self.client, &url)
            .api_key(&self.key)
            .timeout(self.options.request_timeout)
            .json(&json!({ "email": email }))?
            .execute_empty()
            .await
    }

    /// Get the user data for the currently authenticated user
    pub async fn get_user(&self) -> Result<User, Error> {
        let url = self.get_auth_url("/user");
        let token = self.access_token()?;

        Fetch::get(&self.client, &url)
            .api_key(&self.key)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .execute::<User>()
            .await
    }

    /// Update the user's e-mail, password, phone or metadata
    pub async fn update(&self, attributes: &UserAttributes) -> Result<User, Error> {
        let url = self.get_auth_url("/user");
        let token = self.access_token()?;

        Fetch::put(&self.client, &url)
            .api_key(&self.key)
            .bearer_auth(&token)
            .timeout(self.options.request_timeout)
            .json(attributes)?
            .execute::<User>()
            .await
    }

    /// Get the current session
    pub fn get_session(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// Set the session, e.g. when restoring one from a persisted store
    pub fn set_session(&self, session: Session) {
        *self.lock() = Some(session);
    }

    /// Forget the current session without calling the backend
    pub fn clear_session(&self) {
        *self.lock() = None;
    }

    /// Access token of a live session
    pub fn access_token(&self) -> Result<String, Error> {
        match self.lock().as_ref() {
            Some(session) if !session.is_expired() => Ok(session.access_token.clone()),
            _ => Err(Error::NotAuthenticated),
        }
    }

    /// ID of the signed-in user
    pub fn user_id(&self) -> Result<String, Error> {
        match self.lock().as_ref() {
            Some(session) if !session.is_expired() => Ok(session.user_id.clone()),
            _ => Err(Error::NotAuthenticated),
        }
    }

    /// Token to authorize row requests with: the user's token when signed in,
    /// the anonymous key otherwise
    pub fn bearer_or_anon(&self) -> String {
        self.access_token().unwrap_or_else(|_| self.key.clone())
    }
}
