//! User profile model and the auth/profile request payloads.

use serde::{Deserialize, Serialize};

/// The authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub name: String,
    pub email: String,
}

/// Payload for `POST auth/register`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload for `POST auth/login`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload for `PATCH user/current`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UpdateUserRequest {
    pub name: String,
}

/// Payload for `POST user/change-password`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}
