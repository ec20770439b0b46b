use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::{Role, User};

/// Request body for signup.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Request body for signin and google-sync.
#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// User as returned to clients. Keys match the stored document; the
/// password never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    #[serde(rename = "googleId", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            full_name: user.full_name,
            email: user.email,
            avatar: user.avatar,
            external_id: user.external_id,
            role: user.role,
            created_at: user.created_at.to_time_0_3(),
            updated_at: user.updated_at.to_time_0_3(),
        }
    }
}

/// Response for signup.
#[derive(Debug, Serialize)]
pub struct LinkedResponse {
    pub success: bool,
    pub message: String,
    pub data: PublicUser,
}

/// Response for signin; `token` is a session token, not a storage id.
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub data: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub data: PublicUser,
}

impl UserResponse {
    pub fn new(user: User) -> Self {
        Self {
            success: true,
            data: user.into(),
        }
    }
}
