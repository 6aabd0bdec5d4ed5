use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{claims::Claims, repo_types::Role},
    config::JwtConfig,
};

/// Tokens are valid for seven days from issuance.
pub const TOKEN_TTL: Duration = Duration::days(7);

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed payload, expired, or wrong issuer/audience.
    #[error("invalid token")]
    Invalid,

    #[error("jwt signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Holds JWT signing and verification keys, derived once from config.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn sign(&self, account_id: i64, role: Role, email: &str) -> Result<String, TokenError> {
        self.sign_at(account_id, role, email, OffsetDateTime::now_utc())
    }

    fn sign_at(
        &self,
        account_id: i64,
        role: Role,
        email: &str,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let exp = now + TOKEN_TTL;
        let claims = Claims {
            id: account_id,
            role,
            email: email.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(account_id, %role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            TokenError::Invalid
        })?;
        debug!(account_id = data.claims.id, role = %data.claims.role, "jwt verified");
        Ok(data.claims)
    }
}
