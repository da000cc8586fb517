//! Authentication-related form payloads

use serde::Deserialize;

/// Login form (`email`, `password`)
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration form
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
}

/// Reset token request form
#[derive(Debug, Deserialize)]
pub struct ResetTokenForm {
    pub email: String,
}

/// Password update form
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordForm {
    pub email: String,
    pub reset_token: String,
    pub new_password: String,
}
