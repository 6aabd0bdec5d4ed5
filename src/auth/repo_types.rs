use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Coarse authorization level carried by accounts and tokens.
///
/// Stored as plain `TEXT` in the `role` column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum Role {
    #[default]
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

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,        // stored lower-cased
    pub password_hash: String, // Argon2 PHC string
    pub role: Role,
    pub status: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Values needed to insert an account; the store assigns the rest.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
}

/// The only account shape that is ever serialized to a client.
#[derive(Debug, Clone, Serialize)]
pub struct PublicAccount {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Account> for PublicAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            role: a.role,
            created_at: a.created_at,
        }
    }
}
