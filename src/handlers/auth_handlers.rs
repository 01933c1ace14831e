use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::db::DbPool;
use crate::dto::{AuthResponseDto, SigninDto, SignupDto};
use crate::errors::{is_unique_violation, ApiError};
use crate::models::User;
use crate::repo;
use crate::AppState;

/// Emails are compared case-insensitively and without surrounding whitespace
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Handler for registering a new user
///
/// This function handles POST requests to `/auth/signup`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `payload` - The username, email and password of the new user
///
/// ### Returns
///
/// The newly created user as JSON
///
/// ### Errors
///
/// - `Validation` if a field is missing or malformed
/// - `Conflict` if the username or email is already registered
#[instrument(skip(pool, payload), fields(username = %payload.username))]
pub async fn signup_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<SignupDto>,
) -> Result<Json<User>, ApiError> {
    info!("Registering new user");

    payload.validate().map_err(ApiError::Validation)?;

    let user = repo::create_user(
        &pool,
        payload.username.trim().to_string(),
        normalize_email(&payload.email),
        hash_password(&payload.password),
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Username or email is already registered".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    info!("Successfully registered user with id: {}", user.get_id());

    Ok(Json(user))
}

/// Handler for signing in
///
/// This function handles POST requests to `/auth/signin`. Unknown emails and
/// wrong passwords produce the same error.
///
/// ### Arguments
///
/// * `state` - The application state, for the pool and the session lifetime
/// * `payload` - The email and password
///
/// ### Returns
///
/// A fresh bearer token together with the signed-in user
#[instrument(skip(state, payload))]
pub async fn signin_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<SigninDto>,
) -> Result<Json<AuthResponseDto>, ApiError> {
    debug!("Signing in");

    let user = repo::get_user_by_email(&state.pool, &normalize_email(&payload.email))
        .map_err(ApiError::Database)?
        .filter(|user| verify_password(&payload.password, user.get_password_hash()))
        .ok_or_else(|| {
            warn!("Failed sign-in attempt");
            ApiError::InvalidCredentials
        })?;

    let session = repo::create_session(&state.pool, &user.get_id(), state.session_ttl).await
        .map_err(ApiError::Database)?;

    info!("User {} signed in", user.get_id());

    Ok(Json(AuthResponseDto {
        token: session.get_token(),
        expires_at: session.get_expires_at(),
        user,
    }))
}

/// Handler for signing out
///
/// This function handles POST requests to `/auth/signout`. It ends the
/// session whose token authenticated the request.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id()))]
pub async fn signout_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
) -> Result<Json<()>, ApiError> {
    repo::delete_session(&pool, &auth.token).await
        .map_err(ApiError::Database)?;

    info!("User signed out");

    Ok(Json(()))
}

/// Handler for retrieving the signed-in user
///
/// This function handles GET requests to `/auth/me`.
#[instrument(skip(auth), fields(user_id = %auth.user.get_id()))]
pub async fn me_handler(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}
