use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{credentials, LoginRequest, LoginResponse, RegisterRequest, UserResponse, UsersResponse},
        extractors::{AdminUser, AuthUser},
        repo_types::NewAccount,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(payload) = payload?;
    let (email, password) = credentials(payload.email, payload.password)?;

    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let password_hash = state.hasher.hash_blocking(password).await?;

    let account = state
        .accounts
        .insert_account(NewAccount {
            name,
            email,
            password_hash,
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "insert account failed");
            AppError::from(e)
        })?;

    info!(account_id = account.id, "account registered");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: account.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let (email, password) = credentials(payload.email, payload.password)?;

    let Some(account) = state.accounts.find_account_by_email(&email).await? else {
        // Burn the same hashing cost as a real comparison.
        state
            .hasher
            .verify_blocking(password, state.hasher.dummy_hash().to_string())
            .await?;
        warn!("login unknown email");
        return Err(AppError::Unauthenticated);
    };

    let ok = state
        .hasher
        .verify_blocking(password, account.password_hash.clone())
        .await?;
    if !ok {
        warn!(account_id = account.id, "login invalid password");
        return Err(AppError::Unauthenticated);
    }

    let token = state.jwt.sign(account.id, account.role, &account.email)?;

    info!(account_id = account.id, role = %account.role, "account logged in");
    Ok(Json(LoginResponse {
        token,
        role: account.role,
    }))
}

#[instrument(skip_all, fields(account_id = claims.id))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let account = state
        .accounts
        .find_account_by_id(claims.id)
        .await?
        .ok_or_else(|| {
            warn!(account_id = claims.id, "token names a missing account");
            AppError::Unauthenticated
        })?;

    Ok(Json(UserResponse {
        user: account.into(),
    }))
}

#[instrument(skip_all, fields(account_id = admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<UsersResponse>, AppError> {
    let accounts = state.accounts.list_accounts().await?;
    info!(count = accounts.len(), "listing accounts");
    Ok(Json(UsersResponse {
        users: accounts.into_iter().map(Into::into).collect(),
    }))
}
