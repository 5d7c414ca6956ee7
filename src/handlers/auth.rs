// handlers/auth.rs - POST /auth/signup, POST /auth/login

use axum::extract::State;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::api::{AccountView, AuthResponse};
use crate::app::AppState;
use crate::database::models::{NewUser, Role};
use crate::error::{ApiError, StoreResultExt};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation;

use super::utils::{conflict_or_internal, JsonBody};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /auth/signup - register a new account with the `user` role
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Credentials>,
) -> ApiResult<AuthResponse> {
    let username = validation::username(&req.username)?;
    validation::password(&req.password)?;

    let existing = state
        .store
        .find_user_by_username(&username)
        .await
        .or_internal("failed to check username")?;
    if existing.is_some() {
        return Err(ApiError::conflict("username already taken"));
    }

    let password_hash = state.passwords.hash(&req.password).await.map_err(|err| {
        error!(error = %err, "Password hashing failed");
        ApiError::internal_server_error("failed to hash password")
    })?;

    // The unique index still decides a race between two signups.
    let user = state
        .store
        .create_user(NewUser {
            username,
            password_hash,
            role: Role::User,
        })
        .await
        .map_err(|err| conflict_or_internal(err, "username already taken", "failed to create user"))?;

    info!(user_id = user.id, username = %user.username, "Registered user");
    Ok(ApiResponse::created(AuthResponse {
        message: "signup ok",
        user: AccountView::from(&user),
    }))
}

/// POST /auth/login - check a username/password pair
///
/// Unknown usernames, wrong passwords and unreadable stored hashes all get
/// the same `401 invalid credentials`.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Credentials>,
) -> ApiResult<AuthResponse> {
    let username = req.username.trim();
    if username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("username and password required"));
    }

    let user = state
        .store
        .find_user_by_username(username)
        .await
        .or_internal("failed to look up user")?;

    let Some(user) = user else {
        state.passwords.verify_dummy(&req.password).await;
        warn!(username, "Login failed: unknown user");
        return Err(ApiError::invalid_credentials());
    };

    let matched = match state.passwords.verify(&req.password, &user.password_hash).await {
        Ok(matched) => matched,
        Err(err) => {
            error!(user_id = user.id, error = %err, "Stored password hash is unusable");
            false
        }
    };
    if !matched {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::invalid_credentials());
    }

    info!(user_id = user.id, "User logged in");
    Ok(ApiResponse::ok(AuthResponse {
        message: "login ok",
        user: AccountView::from(&user),
    }))
}
