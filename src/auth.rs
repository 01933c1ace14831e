//! Password hashing, session tokens and the request extractors that resolve
//! a bearer token to the signed-in user.

use std::fmt::Write;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::db::DbPool;
use crate::errors::ApiError;
use crate::models::User;
use crate::repo;

/// Separates the salt from the digest in a stored password hash
const HASH_SEPARATOR: char = '$';

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Generates a random 32-byte session token, hex encoded
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Hashes a password with a fresh random salt
///
/// The result has the form `salt$digest` and is what gets stored in
/// `users.password_hash`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = bytes_to_hex(&salt_bytes);
    let hash = digest(&salt, password);
    format!("{salt}{HASH_SEPARATOR}{hash}")
}

/// Checks a password against a hash produced by [`hash_password`]
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once(HASH_SEPARATOR) {
        Some((salt, hash)) if !salt.is_empty() => digest(salt, password) == hash,
        _ => false,
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

/// The signed-in user behind a request
///
/// Rejects with `401 Unauthorized` when the bearer token is missing, unknown
/// or expired.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<DbPool>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;

        let pool = Arc::<DbPool>::from_ref(state);
        let user = repo::find_session_user(&pool, &token)
            .map_err(ApiError::Database)?
            .ok_or_else(|| {
                debug!("Rejected unknown or expired session token");
                ApiError::Unauthorized
            })?;

        Ok(Self { user, token })
    }
}

/// A signed-in user with admin rights
///
/// Rejects with `401` like [`AuthUser`], and with `403 Forbidden` when the
/// user is not an admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl<S> FromRequestParts<S> for AdminUser
where
    Arc<DbPool>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser { user, .. } = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }
        Ok(Self(user))
    }
}
