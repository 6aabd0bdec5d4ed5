use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{
    auth::{claims::Claims, jwt::JwtKeys, repo_types::Role},
    error::AppError,
};

/// Authentication check: a verified bearer token, or `Unauthenticated`.
/// Missing, malformed and rejected tokens are indistinguishable to the caller.
pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<Claims, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            warn!("missing or malformed Authorization header");
            AppError::Unauthenticated
        })?;

    keys.verify(token).map_err(|_| {
        warn!("invalid or expired token");
        AppError::Unauthenticated
    })
}

/// Authorization check, run only on already-authenticated claims.
pub fn require_role(claims: &Claims, role: Role) -> Result<(), AppError> {
    if claims.role != role {
        warn!(account_id = claims.id, role = %claims.role, required = %role, "insufficient role");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Extracts and validates the bearer token.
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<JwtKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = Arc::<JwtKeys>::from_ref(state);
        authenticate(&parts.headers, &keys).map(AuthUser)
    }
}

/// `AuthUser` followed by an admin role check.
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<JwtKeys>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        require_role(&claims, Role::Admin)?;
        Ok(AdminUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::http::HeaderValue;

    fn keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "gate-secret".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
        })
    }

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn valid_bearer_token_authenticates() {
        let keys = keys();
        let token = keys.sign(3, Role::User, "u@x.com").unwrap();
        let claims = authenticate(&headers(&format!("Bearer {token}")), &keys).unwrap();
        assert_eq!(claims.id, 3);
    }

    #[test]
    fn missing_and_malformed_headers_are_unauthenticated() {
        let keys = keys();
        let token = keys.sign(3, Role::User, "u@x.com").unwrap();

        assert!(matches!(authenticate(&HeaderMap::new(), &keys), Err(AppError::Unauthenticated)));
        for value in [
            token.clone(),
            format!("bearer {token}"),
            format!("Basic {token}"),
            "Bearer ".to_string(),
            "Bearer not-a-jwt".to_string(),
        ] {
            assert!(
                matches!(authenticate(&headers(&value), &keys), Err(AppError::Unauthenticated)),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn missing_and_invalid_render_identically() {
        let keys = keys();
        let missing = authenticate(&HeaderMap::new(), &keys).unwrap_err();
        let invalid = authenticate(&headers("Bearer forged.token.value"), &keys).unwrap_err();
        assert_eq!(missing.status(), invalid.status());
        assert_eq!(missing.to_string(), invalid.to_string());
    }

    #[test]
    fn user_role_is_forbidden_for_admin_check() {
        let keys = keys();
        let token = keys.sign(3, Role::User, "u@x.com").unwrap();
        let claims = authenticate(&headers(&format!("Bearer {token}")), &keys).unwrap();
        assert!(matches!(require_role(&claims, Role::Admin), Err(AppError::Forbidden)));
        assert!(require_role(&claims, Role::User).is_ok());
    }
}
