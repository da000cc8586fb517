//! HTTP Basic authentication

use super::{
    password::PasswordHasher,
    strategy::{AuthSettings, AuthStrategy},
};
use crate::{models::user::User, repository::UserRepository};
use async_trait::async_trait;
use axum::http::HeaderMap;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;

const BASIC_PREFIX: &str = "Basic ";

/// Base64 payload of a `Basic` authorization header
pub fn extract_base64(header: &str) -> Option<&str> {
    header.strip_prefix(BASIC_PREFIX)
}

/// Decode the payload; malformed base64 or non UTF-8 content yields `None`.
/// Characters outside the base64 alphabet make the payload malformed.
pub fn decode_base64(payload: &str) -> Option<String> {
    let bytes = STANDARD.decode(payload).ok()?;
    String::from_utf8(bytes).ok()
}

/// Split `email:password` on the first `:`; the password may contain `:`
pub fn split_credentials(decoded: &str) -> Option<(String, String)> {
    decoded
        .split_once(':')
        .map(|(email, password)| (email.to_string(), password.to_string()))
}

pub struct BasicAuth {
    settings: AuthSettings,
    users: Arc<dyn UserRepository>,
    hasher: Arc<PasswordHasher>,
}

impl BasicAuth {
    pub fn new(
        settings: AuthSettings,
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            settings,
            users,
            hasher,
        }
    }

    /// The user owning `email` if `password` matches
    pub async fn user_from_credentials(&self, email: &str, password: &str) -> Option<User> {
        let user = match self.users.find_by_email(email).await {
            Ok(user) => user?,
            Err(e) => {
                tracing::warn!(error = %e, "User lookup failed during basic auth");
                return None;
            }
        };

        self.hasher
            .verify(&user.hashed_password, password)
            .then_some(user)
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn kind(&self) -> &'static str {
        "basic_auth"
    }

    fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    async fn current_user(&self, headers: &HeaderMap) -> Option<User> {
        let header = self.authorization_header(headers)?;
        let payload = extract_base64(&header)?;
        let decoded = decode_base64(payload)?;
        let (email, password) = split_credentials(&decoded)?;

        self.user_from_credentials(&email, &password).await
    }
}
