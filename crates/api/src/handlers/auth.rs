//! Handlers for the `/auth` resource (login, refresh, logout, me).
//!
//! Access tokens are short-lived JWTs. Refresh tokens are opaque and stored
//! only as a SHA-256 hash in `user_sessions`; every refresh rotates the row.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use marketplace_core::error::CoreError;
use marketplace_core::types::DbId;
use marketplace_db::models::session::CreateSession;
use marketplace_db::models::user::{User, UserResponse};
use marketplace_db::repositories::{RoleRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Consecutive bad passwords that trigger a lock.
const MAX_FAILED_ATTEMPTS: i32 = 5;

const LOCK_DURATION_MINS: i64 = 15;

const BAD_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

/// POST /api/auth/login
///
/// Deactivated or locked accounts get 403 before the password is checked.
/// Every bad password counts towards the lock.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| unauthorized(BAD_CREDENTIALS))?;

    ensure_active(&user)?;
    if user.locked_until.is_some_and(|until| until > Utc::now()) {
        return Err(forbidden("Account is temporarily locked. Try again later."));
    }

    let password_ok = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_ok {
        record_failure(&state, user.id).await?;
        return Err(unauthorized(BAD_CREDENTIALS));
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let info = user_info(&state, user).await?;
    tracing::info!(user_id = info.id, role = %info.role, "User logged in");
    Ok(Json(issue_tokens(&state, info).await?))
}

/// POST /api/auth/refresh
///
/// The presented refresh token is revoked whether or not the user may
/// still sign in.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);
    let session = SessionRepo::find_active_by_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| unauthorized("Invalid or expired refresh token"))?;
    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| unauthorized("User no longer exists"))?;
    ensure_active(&user)?;

    let info = user_info(&state, user).await?;
    Ok(Json(issue_tokens(&state, info).await?))
}

/// POST /api/auth/logout
///
/// Revokes every session of the caller, not just the current one.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_response_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth_user.user_id,
        }))?;

    Ok(Json(DataResponse { data: user }))
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

fn forbidden(message: &str) -> AppError {
    AppError::Core(CoreError::Forbidden(message.to_string()))
}

fn ensure_active(user: &User) -> AppResult<()> {
    if user.is_active {
        Ok(())
    } else {
        Err(forbidden("Account is deactivated"))
    }
}

async fn record_failure(state: &AppState, user_id: DbId) -> AppResult<()> {
    let failures = UserRepo::increment_failed_login(&state.pool, user_id).await?;
    if failures >= MAX_FAILED_ATTEMPTS {
        let until = Utc::now() + Duration::minutes(LOCK_DURATION_MINS);
        UserRepo::lock_account(&state.pool, user_id, until).await?;
        tracing::warn!(user_id, failures, "Account locked after failed logins");
    }
    Ok(())
}

async fn user_info(state: &AppState, user: User) -> AppResult<UserInfo> {
    let role = RoleRepo::resolve_name(&state.pool, user.role_id).await?;
    Ok(UserInfo {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role,
    })
}

/// Mint an access token and persist a fresh refresh session for `user`.
async fn issue_tokens(state: &AppState, user: UserInfo) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = generate_access_token(user.id, &user.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_token, refresh_token_hash) = generate_refresh_token();
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash,
            expires_at: Utc::now() + Duration::days(jwt.refresh_token_expiry_days),
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: jwt.access_token_expiry_mins * 60,
        user,
    })
}
