use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{CreateExchangeDto, ExchangeDirection, UpdateExchangeStatusDto};
use crate::errors::ApiError;
use crate::models::ExchangeRequest;
use crate::repo;

fn list_for(pool: &DbPool, auth: &AuthUser, direction: ExchangeDirection) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    let requests = repo::list_exchanges_for_user(pool, &auth.user.get_id(), direction)
        .map_err(ApiError::Database)?;

    debug!("Found {} exchange requests", requests.len());

    Ok(Json(requests))
}

/// Handler for the exchange requests the signed-in user takes part in
///
/// This function handles GET requests to `/exchanges`.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id()))]
pub async fn list_exchanges_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    list_for(&pool, &auth, ExchangeDirection::All)
}

/// Handler for the exchange requests the signed-in user sent
///
/// This function handles GET requests to `/exchanges/sent`.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id()))]
pub async fn list_sent_exchanges_handler(
    State(pool): State<Arc<DbPool>>,
    auth: AuthUser,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    list_for(&pool, &auth, ExchangeDirection::Sent)
}

/// Handler for the exchange requests for the signed-in user's books
///
/// This function handles GET requests to `/exchanges/received`.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id()))]
pub async fn list_received_exchanges_handler(
    State(pool): State<Arc<DbPool>>,
    auth: AuthUser,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    list_for(&pool, &auth, ExchangeDirection::Received)
}

/// Handler for retrieving one exchange request
///
/// This function handles GET requests to `/exchanges/{id}`. Only the two
/// participants and admins may see a request.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - The signed-in user
/// * `exchange_id` - The ID of the request, extracted from the URL path
///
/// ### Returns
///
/// The request as JSON
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id(), exchange_id = %exchange_id))]
pub async fn get_exchange_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract the request ID from the URL path
    Path(exchange_id): Path<String>,
) -> Result<Json<ExchangeRequest>, ApiError> {
    let request = repo::get_exchange(&pool, &exchange_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::not_found("Exchange request"))?;

    if !request.involves(&auth.user.get_id()) && !auth.user.is_admin() {
        return Err(ApiError::Forbidden("You are not part of this exchange request".to_string()));
    }

    Ok(Json(request))
}

/// Handler for proposing an exchange
///
/// This function handles POST requests to `/exchanges`. The signed-in user
/// offers one of their own books for someone else's book.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - The signed-in user making the proposal
/// * `payload` - The requested book, the offered book and an optional message
///
/// ### Returns
///
/// The new pending request as JSON
#[instrument(skip(pool, auth, payload), fields(user_id = %auth.user.get_id(), requested_book_id = %payload.requested_book_id, offered_book_id = %payload.offered_book_id))]
pub async fn create_exchange_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateExchangeDto>,
) -> Result<Json<ExchangeRequest>, ApiError> {
    info!("Creating exchange request");

    let message = payload.message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    let request = repo::create_exchange(
        &pool,
        &auth.user,
        &payload.requested_book_id,
        &payload.offered_book_id,
        message,
    )
    .await?;

    info!("Successfully created exchange request with id: {}", request.get_id());

    Ok(Json(request))
}

/// Handler for accepting, rejecting or completing an exchange
///
/// This function handles PUT requests to `/exchanges/{id}/status`. Only the
/// owner of the requested book may respond.
#[instrument(skip(pool, auth, payload), fields(user_id = %auth.user.get_id(), exchange_id = %exchange_id, status = %payload.status))]
pub async fn update_exchange_status_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract the request ID from the URL path
    Path(exchange_id): Path<String>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<UpdateExchangeStatusDto>,
) -> Result<Json<ExchangeRequest>, ApiError> {
    let request = repo::update_exchange_status(&pool, &exchange_id, &auth.user, payload.status).await?;

    Ok(Json(request))
}
