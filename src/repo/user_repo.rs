use crate::auth::generate_token;
use crate::db::{unicode_lower, DbPool, ExecuteWithRetry};
use crate::models::{Session, User};
use crate::schema::{sessions, users};
use anyhow::Result;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{instrument, debug, info};

/// Creates a new user in the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `username` - The display name, unique across users ignoring case
/// * `email` - The sign-in address, unique across users
/// * `password_hash` - The already hashed password
///
/// ### Returns
///
/// A Result containing the newly created User if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The username or email is already taken (a unique violation)
/// - The database insert operation fails
#[instrument(skip(pool, email, password_hash), fields(username = %username))]
pub async fn create_user(pool: &DbPool, username: String, email: String, password_hash: String) -> Result<User> {
    debug!("Creating new user");

    let mut conn = pool.get()?;

    // The column constraint is case-sensitive
    let taken = users::table
        .filter(unicode_lower(users::username).eq(username.to_lowercase()))
        .count()
        .get_result::<i64>(&mut conn)?;
    if taken > 0 {
        debug!("Username is taken with different case");
        return Err(DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(format!("username {} is already taken", username)),
        ).into());
    }

    let new_user = User::new(username, email, password_hash);

    diesel::insert_into(users::table)
        .values(new_user.clone())
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created user with id: {}", new_user.get_id());

    Ok(new_user)
}

/// Inserts a fully specified user, keeping its id and timestamps
///
/// Used when loading sample data.
#[instrument(skip(pool, user), fields(user_id = %user.get_id()))]
pub async fn insert_user(pool: &DbPool, user: &User) -> Result<()> {
    let mut conn = pool.get()?;

    diesel::insert_into(users::table)
        .values(user.clone())
        .execute_with_retry(&mut conn).await?;

    Ok(())
}

/// Retrieves a user from the database by their ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the user to retrieve
///
/// ### Returns
///
/// A Result containing an Option with the User if found, or None if not found
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .find(user_id)
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Retrieves a user by their sign-in email address
///
/// The comparison is exact; callers normalize the address first.
#[instrument(skip(pool))]
pub fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .filter(users::email.eq(email))
        .first::<User>(conn)
        .optional()?;

    Ok(result)
}

/// Lists all users, oldest account first
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_users(pool: &DbPool) -> Result<Vec<User>> {
    let conn = &mut pool.get()?;

    let result = users::table
        .order((users::joined_at.asc(), users::username.asc()))
        .load::<User>(conn)?;

    debug!("Found {} users", result.len());

    Ok(result)
}

/// Returns the number of registered users
#[instrument(skip(pool))]
pub fn count_users(pool: &DbPool) -> Result<i64> {
    let conn = &mut pool.get()?;
    let count = users::table.count().get_result::<i64>(conn)?;
    Ok(count)
}

/// Opens a new session for a user
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the user signing in
/// * `ttl` - How long the session stays valid
///
/// ### Returns
///
/// A Result containing the new Session, whose token is the bearer credential
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The user does not exist (a foreign key violation)
/// - The database insert operation fails
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn create_session(pool: &DbPool, user_id: &str, ttl: Duration) -> Result<Session> {
    let mut conn = pool.get()?;

    let session = Session::new(generate_token(), user_id, ttl);

    diesel::insert_into(sessions::table)
        .values(session.clone())
        .execute_with_retry(&mut conn).await?;

    debug!("Opened session expiring at {}", session.get_expires_at());

    Ok(session)
}

/// Resolves a session token to its user
///
/// ### Returns
///
/// The user if the token belongs to a session that has not yet expired,
/// None otherwise
#[instrument(skip(pool, token))]
pub fn find_session_user(pool: &DbPool, token: &str) -> Result<Option<User>> {
    let conn = &mut pool.get()?;

    let result = sessions::table
        .inner_join(users::table)
        .filter(sessions::token.eq(token))
        .select((Session::as_select(), User::as_select()))
        .first::<(Session, User)>(conn)
        .optional()?;

    let Some((session, user)) = result else {
        return Ok(None);
    };

    if session.is_expired_at(Utc::now()) {
        debug!("Session expired at {}", session.get_expires_at());
        return Ok(None);
    }

    Ok(Some(user))
}

/// Deletes a session; deleting an unknown token is not an error
#[instrument(skip(pool, token))]
pub async fn delete_session(pool: &DbPool, token: &str) -> Result<()> {
    let mut conn = pool.get()?;

    let deleted = diesel::delete(sessions::table.find(token.to_string()))
        .execute_with_retry(&mut conn).await?;

    debug!("Deleted {} session(s)", deleted);

    Ok(())
}

/// Deletes every session that has expired
///
/// ### Returns
///
/// The number of sessions removed
#[instrument(skip(pool))]
pub async fn purge_expired_sessions(pool: &DbPool) -> Result<usize> {
    let mut conn = pool.get()?;

    let now = Utc::now().naive_utc();

    let purged = diesel::delete(sessions::table.filter(sessions::expires_at.le(now)))
        .execute_with_retry(&mut conn).await?;

    if purged > 0 {
        info!("Purged {} expired session(s)", purged);
    }

    Ok(purged)
}
