use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

/// User document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>, // reserved for a credential flow, never set here
    #[serde(default)]
    pub avatar: String,
    /// Identity-provider subject id. Stored as `googleId` for existing documents.
    #[serde(rename = "googleId", default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Absent on documents written before roles existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Fields supplied by callers when creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub external_id: Option<String>,
    pub role: Role,
}

impl NewUser {
    pub(crate) fn into_user(self, now: DateTime) -> User {
        User {
            id: ObjectId::new(),
            full_name: self.full_name,
            email: self.email,
            password: None,
            avatar: self.avatar,
            external_id: self.external_id,
            role: Some(self.role),
            created_at: now,
            updated_at: now,
        }
    }
}
