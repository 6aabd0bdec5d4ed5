use serde::{Deserialize, Serialize};

use crate::auth::repo_types::Role;

/// JWT payload used for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,       // account ID
    pub role: Role,    // role at issuance time
    pub email: String, // login email
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
    pub iss: String,   // issuer
    pub aud: String,   // audience
}
