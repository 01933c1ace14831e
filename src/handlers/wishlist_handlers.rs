use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{WishlistEntryDto, WishlistStatusDto};
use crate::errors::ApiError;
use crate::models::WishlistItem;
use crate::repo;

/// Handler for the signed-in user's wishlist
///
/// This function handles GET requests to `/wishlist`.
///
/// ### Returns
///
/// The wishlist entries with their books as JSON, most recently added first
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id()))]
pub async fn list_wishlist_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
) -> Result<Json<Vec<WishlistEntryDto>>, ApiError> {
    debug!("Listing wishlist");

    let entries = repo::list_wishlist(&pool, &auth.user.get_id())
        .map_err(ApiError::Database)?
        .into_iter()
        .map(WishlistEntryDto::from)
        .collect::<Vec<_>>();

    debug!("Found {} wishlist entries", entries.len());

    Ok(Json(entries))
}

/// Handler for checking whether a book is on the wishlist
///
/// This function handles GET requests to `/wishlist/{book_id}`.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id(), book_id = %book_id))]
pub async fn wishlist_status_handler(
    State(pool): State<Arc<DbPool>>,
    auth: AuthUser,
    Path(book_id): Path<String>,
) -> Result<Json<WishlistStatusDto>, ApiError> {
    let wishlisted = repo::get_wishlist_item(&pool, &auth.user.get_id(), &book_id)
        .map_err(ApiError::Database)?
        .is_some();

    Ok(Json(WishlistStatusDto { book_id, wishlisted }))
}

/// Handler for adding a book to the wishlist
///
/// This function handles POST requests to `/wishlist/{book_id}`. Adding a
/// book twice returns the existing entry.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - The signed-in user
/// * `book_id` - The ID of the book, extracted from the URL path
///
/// ### Returns
///
/// The wishlist entry as JSON, or a 404 error if the book does not exist
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id(), book_id = %book_id))]
pub async fn add_to_wishlist_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract the book ID from the URL path
    Path(book_id): Path<String>,
) -> Result<Json<WishlistItem>, ApiError> {
    info!("Adding book to wishlist");

    repo::get_book(&pool, &book_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::not_found("Book"))?;

    let item = repo::add_to_wishlist(&pool, &auth.user.get_id(), &book_id).await
        .map_err(ApiError::Database)?;

    Ok(Json(item))
}

/// Handler for removing a book from the wishlist
///
/// This function handles DELETE requests to `/wishlist/{book_id}`. Removing
/// a book that is not on the wishlist succeeds as well.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id(), book_id = %book_id))]
pub async fn remove_from_wishlist_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract the book ID from the URL path
    Path(book_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    let removed = repo::remove_from_wishlist(&pool, &auth.user.get_id(), &book_id).await
        .map_err(ApiError::Database)?;

    info!("Removed {} wishlist entries", removed);

    Ok(Json(()))
}
