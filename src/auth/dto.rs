use serde::{Deserialize, Serialize};

use crate::{
    auth::repo_types::{PublicAccount, Role},
    error::AppError,
};

/// Request body for registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Trimmed, lower-cased email plus password; both must be non-empty.
pub(crate) fn credentials(
    email: Option<String>,
    password: Option<String>,
) -> Result<(String, String), AppError> {
    let email = email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());
    let password = password.filter(|p| !p.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::InvalidRequest("email & password required".into())),
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicAccount,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<PublicAccount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_normalize_email() {
        let (email, password) =
            credentials(Some("  Ada@Example.COM ".into()), Some("pw".into())).unwrap();
        assert_eq!(email, "ada@example.com");
        assert_eq!(password, "pw");
    }

    #[test]
    fn credentials_require_both_fields() {
        for (email, password) in [
            (None, Some("pw")),
            (Some("a@x.com"), None),
            (Some("   "), Some("pw")),
            (Some("a@x.com"), Some("")),
            (None, None),
        ] {
            let err = credentials(email.map(String::from), password.map(String::from)).unwrap_err();
            assert!(matches!(err, AppError::InvalidRequest(_)));
        }
    }
}
