use crate::db::{DbPool, ExecuteWithRetry};
use crate::errors::is_unique_violation;
use crate::models::{Book, WishlistItem};
use crate::schema::{books, wishlist_items};
use anyhow::{anyhow, Result};
use diesel::prelude::*;
use tracing::{instrument, debug, info};

/// Lists a user's wishlist with the wished-for books, most recently added first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the wishlist's owner
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(user_id = %user_id))]
pub fn list_wishlist(pool: &DbPool, user_id: &str) -> Result<Vec<(WishlistItem, Book)>> {
    let conn = &mut pool.get()?;

    let result = wishlist_items::table
        .inner_join(books::table)
        .filter(wishlist_items::user_id.eq(user_id))
        .order((wishlist_items::added_at.desc(), wishlist_items::id.asc()))
        .select((WishlistItem::as_select(), Book::as_select()))
        .load::<(WishlistItem, Book)>(conn)?;

    debug!("Found {} wishlist items", result.len());

    Ok(result)
}

/// Looks up the wishlist entry for a user and book, if any
#[instrument(skip(pool), fields(user_id = %user_id, book_id = %book_id))]
pub fn get_wishlist_item(pool: &DbPool, user_id: &str, book_id: &str) -> Result<Option<WishlistItem>> {
    let conn = &mut pool.get()?;

    let result = wishlist_items::table
        .filter(wishlist_items::user_id.eq(user_id))
        .filter(wishlist_items::book_id.eq(book_id))
        .first::<WishlistItem>(conn)
        .optional()?;

    Ok(result)
}

/// Adds a book to a user's wishlist
///
/// Adding a book that is already on the wishlist returns the existing entry
/// unchanged.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the wishlist's owner
/// * `book_id` - The ID of the book to add
///
/// ### Returns
///
/// A Result containing the wishlist entry for the pair
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The user or book does not exist (a foreign key violation)
/// - The database insert operation fails
#[instrument(skip(pool), fields(user_id = %user_id, book_id = %book_id))]
pub async fn add_to_wishlist(pool: &DbPool, user_id: &str, book_id: &str) -> Result<WishlistItem> {
    if let Some(existing) = get_wishlist_item(pool, user_id, book_id)? {
        debug!("Book already on wishlist");
        return Ok(existing);
    }

    let new_item = WishlistItem::new(user_id, book_id);

    let mut conn = pool.get()?;

    let inserted = diesel::insert_into(wishlist_items::table)
        .values(new_item.clone())
        .execute_with_retry(&mut conn).await;

    drop(conn);

    match inserted {
        Ok(_) => {
            info!("Added book to wishlist with id: {}", new_item.get_id());
            Ok(new_item)
        }
        Err(e) => {
            let err = anyhow::Error::from(e);
            if !is_unique_violation(&err) {
                return Err(err);
            }
            // A concurrent request inserted the same pair first
            get_wishlist_item(pool, user_id, book_id)?
                .ok_or_else(|| anyhow!("Wishlist item vanished after unique violation"))
        }
    }
}

/// Removes a book from a user's wishlist
///
/// Removing a book that is not on the wishlist is not an error.
///
/// ### Returns
///
/// A Result containing the number of removed entries (0 or 1)
#[instrument(skip(pool), fields(user_id = %user_id, book_id = %book_id))]
pub async fn remove_from_wishlist(pool: &DbPool, user_id: &str, book_id: &str) -> Result<usize> {
    let mut conn = pool.get()?;

    let removed = diesel::delete(
        wishlist_items::table
            .filter(wishlist_items::user_id.eq(user_id))
            .filter(wishlist_items::book_id.eq(book_id)),
    )
    .execute_with_retry(&mut conn).await?;

    debug!("Removed {} wishlist item(s)", removed);

    Ok(removed)
}
