//! Handlers for the `/auth` resource (signup, login, verify).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use consulta_core::error::CoreError;
use consulta_core::roles::ROLE_USER;
use consulta_db::models::user::{CreateUser, UserResponse};
use consulta_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::{recipient, spawn_email};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Register a new account. Every signup gets the ordinary `user` role;
/// promotion to admin happens through the admin user-management routes.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Name must not be empty".into(),
        )));
    }
    if !input.email.validate_email() {
        return Err(AppError::Core(CoreError::Validation(
            "Provide a valid email address".into(),
        )));
    }
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        name: name.to_string(),
        email: input.email.clone(),
        password_hash,
        role: ROLE_USER.to_string(),
    };

    // A duplicate email trips uq_users_email and surfaces as 409.
    let user = UserRepo::create(&state.pool, &create).await?;
    tracing::info!(user_id = user.id, "New user registered");

    let to = recipient(&user);
    spawn_email(state.mailer.clone(), move |mailer| async move {
        mailer.send_welcome(&to).await
    });

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let expires_in = state.config.jwt.expiry_hours * 3600;

    Ok(Json(AuthResponse {
        access_token,
        expires_in,
        user: user.into(),
    }))
}

/// GET /api/v1/auth/verify
///
/// Echo the authenticated user, proving the presented token is valid.
pub async fn verify(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;

    Ok(Json(user.into()))
}
