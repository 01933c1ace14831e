use crate::db::{transaction_with_retry, DbPool, ExecuteWithRetry};
use crate::dto::ExchangeDirection;
use crate::models::{ExchangeRequest, ExchangeStatus, User};
use crate::schema::{books, exchange_requests};
use anyhow::Result;
use chrono::Utc;
use diesel::prelude::*;
use tracing::{instrument, debug, info, warn};

use super::book_repo::get_book;
use super::user_repo::get_user;

/// Why an exchange request could not be created or moved to a new status
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Invalid(String),
    #[error("Only the owner of the requested book can respond to this exchange request")]
    NotOwner,
    #[error("Cannot change exchange request from {from} to {to}")]
    InvalidTransition { from: ExchangeStatus, to: ExchangeStatus },
    #[error("{0}")]
    Unavailable(String),
    #[error("database error: {0}")]
    Db(#[from] anyhow::Error),
}

/// Proposes trading one of the requester's books for another user's book
///
/// The owner of the request is the seller of the requested book. Display
/// names and titles are copied into the request.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `requester` - The user making the proposal
/// * `requested_book_id` - The book the requester wants
/// * `offered_book_id` - The requester's own book offered in return
/// * `message` - Optional note to the owner
///
/// ### Returns
///
/// The new request, in status `pending`
///
/// ### Errors
///
/// - `NotFound` if either book or the owner does not exist
/// - `Invalid` if the requester owns the requested book, does not own the
///   offered book, or the requested book is not listed for exchange
/// - `Unavailable` if either book is no longer available, or an identical
///   request is already pending
/// - `Db` if a database operation fails
#[instrument(skip(pool, requester, message), fields(requester_id = %requester.get_id(), requested_book_id = %requested_book_id, offered_book_id = %offered_book_id))]
pub async fn create_exchange(
    pool: &DbPool,
    requester: &User,
    requested_book_id: &str,
    offered_book_id: &str,
    message: Option<String>,
) -> Result<ExchangeRequest, ExchangeError> {
    debug!("Creating exchange request");

    let requester_id = requester.get_id();

    let requested = get_book(pool, requested_book_id)?
        .ok_or(ExchangeError::NotFound("Requested book"))?;
    let offered = get_book(pool, offered_book_id)?
        .ok_or(ExchangeError::NotFound("Offered book"))?;

    if requested.is_listed_by(&requester_id) {
        return Err(ExchangeError::Invalid("You cannot request an exchange for your own book".to_string()));
    }
    if !offered.is_listed_by(&requester_id) {
        return Err(ExchangeError::Invalid("The offered book must be one of your own listings".to_string()));
    }
    if !requested.is_for_exchange() {
        return Err(ExchangeError::Invalid(format!("'{}' is not listed for exchange", requested.get_title())));
    }
    if !requested.is_available() {
        return Err(ExchangeError::Unavailable(format!("'{}' is no longer available", requested.get_title())));
    }
    if !offered.is_available() {
        return Err(ExchangeError::Unavailable(format!("'{}' is no longer available", offered.get_title())));
    }

    if find_pending_duplicate(pool, &requester_id, requested_book_id, offered_book_id)? {
        return Err(ExchangeError::Unavailable("An identical exchange request is already pending".to_string()));
    }

    let owner = get_user(pool, &requested.get_seller_id())?
        .ok_or(ExchangeError::NotFound("Book owner"))?;

    let request = ExchangeRequest::new(requester, &owner, &requested, &offered, message);

    let mut conn = pool.get().map_err(anyhow::Error::from)?;

    diesel::insert_into(exchange_requests::table)
        .values(request.clone())
        .execute_with_retry(&mut conn).await
        .map_err(anyhow::Error::from)?;

    info!("Successfully created exchange request with id: {}", request.get_id());

    Ok(request)
}

/// Returns true if the same requester already has a pending request for the
/// same pair of books
fn find_pending_duplicate(pool: &DbPool, requester_id: &str, requested_book_id: &str, offered_book_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let count = exchange_requests::table
        .filter(exchange_requests::requester_id.eq(requester_id))
        .filter(exchange_requests::requested_book_id.eq(requested_book_id))
        .filter(exchange_requests::offered_book_id.eq(offered_book_id))
        .filter(exchange_requests::status.eq(ExchangeStatus::Pending))
        .count()
        .get_result::<i64>(conn)?;

    Ok(count > 0)
}

/// Retrieves an exchange request by its ID
///
/// ### Returns
///
/// A Result containing an Option with the request if found, or None if not found
#[instrument(skip(pool), fields(exchange_id = %exchange_id))]
pub fn get_exchange(pool: &DbPool, exchange_id: &str) -> Result<Option<ExchangeRequest>> {
    let conn = &mut pool.get()?;

    let result = exchange_requests::table
        .find(exchange_id)
        .first::<ExchangeRequest>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the exchange requests a user takes part in, newest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the user
/// * `direction` - Whether to list requests the user sent, received, or both
#[instrument(skip(pool), fields(user_id = %user_id, direction = ?direction))]
pub fn list_exchanges_for_user(pool: &DbPool, user_id: &str, direction: ExchangeDirection) -> Result<Vec<ExchangeRequest>> {
    let conn = &mut pool.get()?;

    let mut exchange_query = exchange_requests::table.into_boxed();

    exchange_query = match direction {
        ExchangeDirection::All => exchange_query.filter(
            exchange_requests::requester_id.eq(user_id.to_string())
                .or(exchange_requests::owner_id.eq(user_id.to_string()))
        ),
        ExchangeDirection::Sent => exchange_query.filter(exchange_requests::requester_id.eq(user_id.to_string())),
        ExchangeDirection::Received => exchange_query.filter(exchange_requests::owner_id.eq(user_id.to_string())),
    };

    let result = exchange_query
        .order((exchange_requests::created_at.desc(), exchange_requests::id.asc()))
        .load::<ExchangeRequest>(conn)?;

    debug!("Found {} exchange requests", result.len());

    Ok(result)
}

/// Lists every exchange request, newest first
#[instrument(skip(pool))]
pub fn list_all_exchanges(pool: &DbPool) -> Result<Vec<ExchangeRequest>> {
    let conn = &mut pool.get()?;

    let result = exchange_requests::table
        .order((exchange_requests::created_at.desc(), exchange_requests::id.asc()))
        .load::<ExchangeRequest>(conn)?;

    Ok(result)
}

/// Counts the exchange requests in the given status
#[instrument(skip(pool))]
pub fn count_exchanges_with_status(pool: &DbPool, status: ExchangeStatus) -> Result<i64> {
    let conn = &mut pool.get()?;

    let count = exchange_requests::table
        .filter(exchange_requests::status.eq(status))
        .count()
        .get_result::<i64>(conn)?;

    Ok(count)
}

/// Moves an exchange request to a new status
///
/// Allowed transitions are `pending → accepted | rejected` and
/// `accepted → completed`. Accepting requires both books to still be
/// available; completing marks both books unavailable in the same
/// transaction as the status change.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `exchange_id` - The ID of the request
/// * `actor` - The user making the change; must be the request's owner
/// * `next` - The target status
///
/// ### Returns
///
/// The updated request
///
/// ### Errors
///
/// - `NotFound` if the request does not exist
/// - `NotOwner` if `actor` is not the owner of the requested book
/// - `InvalidTransition` if the transition is not allowed, including when a
///   concurrent update changed the status first
/// - `Unavailable` when accepting and either book is gone or unavailable
/// - `Db` if a database operation fails
#[instrument(skip(pool, actor), fields(exchange_id = %exchange_id, actor_id = %actor.get_id(), next = %next))]
pub async fn update_exchange_status(
    pool: &DbPool,
    exchange_id: &str,
    actor: &User,
    next: ExchangeStatus,
) -> Result<ExchangeRequest, ExchangeError> {
    let request = get_exchange(pool, exchange_id)?
        .ok_or(ExchangeError::NotFound("Exchange request"))?;

    if request.get_owner_id() != actor.get_id() {
        return Err(ExchangeError::NotOwner);
    }

    apply_status_change(pool, &request, next).await
}

/// What happened inside the status change transaction
enum StatusChange {
    Applied,
    /// The stored status no longer matched; holds the status found instead
    Stale(Option<ExchangeStatus>),
    BookUnavailable,
}

/// Moves `request` to `next`, provided the stored status still equals the
/// status `request` was read with
///
/// The availability check and the writes share one immediate transaction,
/// retried while the database is busy.
async fn apply_status_change(
    pool: &DbPool,
    request: &ExchangeRequest,
    next: ExchangeStatus,
) -> Result<ExchangeRequest, ExchangeError> {
    let current = request.get_status();
    if !current.can_transition_to(next) {
        return Err(ExchangeError::InvalidTransition { from: current, to: next });
    }

    let exchange_id = request.get_id();
    let book_ids = vec![request.get_requested_book_id(), request.get_offered_book_id()];
    let conn = &mut pool.get().map_err(anyhow::Error::from)?;
    let now = Utc::now().naive_utc();

    let outcome = transaction_with_retry(conn, |conn| {
        if next == ExchangeStatus::Accepted {
            let available = books::table
                .filter(books::id.eq_any(&book_ids))
                .filter(books::is_available.eq(true))
                .count()
                .get_result::<i64>(conn)?;
            if available < 2 {
                return Ok(StatusChange::BookUnavailable);
            }
        }

        // Only move the request if nobody else moved it first
        let updated_rows = diesel::update(
            exchange_requests::table
                .find(&exchange_id)
                .filter(exchange_requests::status.eq(current)),
        )
        .set((
            exchange_requests::status.eq(next),
            exchange_requests::updated_at.eq(now),
        ))
        .execute(conn)?;

        if updated_rows == 0 {
            let latest = exchange_requests::table
                .find(&exchange_id)
                .select(exchange_requests::status)
                .first::<ExchangeStatus>(conn)
                .optional()?;
            return Ok(StatusChange::Stale(latest));
        }

        if next == ExchangeStatus::Completed {
            diesel::update(books::table.filter(books::id.eq_any(&book_ids)))
                .set((books::is_available.eq(false), books::updated_at.eq(now)))
                .execute(conn)?;
        }

        Ok(StatusChange::Applied)
    })
    .await
    .map_err(anyhow::Error::from)?;

    match outcome {
        StatusChange::Applied => {}
        StatusChange::BookUnavailable => {
            return Err(ExchangeError::Unavailable("A book in this exchange is no longer available".to_string()));
        }
        StatusChange::Stale(None) => return Err(ExchangeError::NotFound("Exchange request")),
        StatusChange::Stale(Some(latest)) => {
            warn!("Exchange request changed status concurrently, now {}", latest);
            return Err(ExchangeError::InvalidTransition { from: latest, to: next });
        }
    }

    let updated = get_exchange(pool, &exchange_id)?
        .ok_or(ExchangeError::NotFound("Exchange request"))?;

    info!("Exchange request {} moved from {} to {}", exchange_id, current, next);

    Ok(updated)
}
