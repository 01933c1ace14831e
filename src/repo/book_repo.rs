use crate::db::{unicode_lower, DbPool, ExecuteWithRetry};
use crate::dto::{BookQueryDto, ListingKind, RatingSummaryDto, UpdateBookDto};
use crate::models::{Book, BookCondition, ImageList};
use crate::schema::{books, reviews};
use anyhow::{anyhow, Result};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use tracing::{instrument, debug, info};

/// Escapes the LIKE wildcards in user input so they match literally
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Inserts a new listing into the database
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `book` - The listing to insert, usually built with `Book::new`
///
/// ### Returns
///
/// A Result containing the inserted Book
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The seller does not exist (a foreign key violation)
/// - The database insert operation fails
#[instrument(skip(pool, book), fields(book_id = %book.get_id(), seller_id = %book.get_seller_id()))]
pub async fn create_book(pool: &DbPool, book: Book) -> Result<Book> {
    debug!("Creating new book listing");

    let mut conn = pool.get()?;

    diesel::insert_into(books::table)
        .values(book.clone())
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created book with id: {}", book.get_id());

    Ok(book)
}

/// Retrieves a book from the database by its ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `book_id` - The ID of the book to retrieve
///
/// ### Returns
///
/// A Result containing an Option with the Book if found, or None if not found
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails for reasons other than the book not existing
#[instrument(skip(pool), fields(book_id = %book_id))]
pub fn get_book(pool: &DbPool, book_id: &str) -> Result<Option<Book>> {
    let conn = &mut pool.get()?;

    let result = books::table
        .find(book_id)
        .first::<Book>(conn)
        .optional()?;

    if result.is_none() {
        debug!("Book not found");
    }

    Ok(result)
}

/// Lists books matching a catalog filter, newest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `query` - The filter; the default filter returns every available book
///
/// ### Returns
///
/// A Result containing the matching books
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(query = %query))]
pub fn list_books(pool: &DbPool, query: &BookQueryDto) -> Result<Vec<Book>> {
    let conn = &mut pool.get()?;

    let mut book_query = books::table.into_boxed();

    if !query.include_unavailable {
        book_query = book_query.filter(books::is_available.eq(true));
    }

    // Both sides are lowercased; SQLite's LIKE only folds ASCII
    if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        debug!("Filtering by search text: {}", q);
        let pattern = format!("%{}%", escape_like(&q.to_lowercase()));
        book_query = book_query.filter(
            unicode_lower(books::title).like(pattern.clone()).escape('\\')
                .or(unicode_lower(books::author).like(pattern).escape('\\'))
        );
    }

    if let Some(genre) = &query.genre {
        debug!("Filtering by genre: {}", genre);
        book_query = book_query.filter(books::genre.eq(genre.clone()));
    }

    match query.listing {
        ListingKind::All => {}
        ListingKind::Sale => book_query = book_query.filter(books::for_sale.eq(true)),
        ListingKind::Exchange => book_query = book_query.filter(books::for_exchange.eq(true)),
    }

    if let Some(seller_id) = &query.seller_id {
        book_query = book_query.filter(books::seller_id.eq(seller_id.clone()));
    }

    let result = book_query
        .order((books::created_at.desc(), books::id.asc()))
        .load::<Book>(conn)?;

    debug!("Found {} books", result.len());

    Ok(result)
}

/// Applies a partial update to a listing
///
/// Only the fields present in `update` change; `updated_at` is always bumped.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `book_id` - The ID of the book to update
/// * `update` - The fields to change
///
/// ### Returns
///
/// A Result containing the updated Book
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The book is not found
/// - The database update operation fails
#[instrument(skip(pool, update), fields(book_id = %book_id))]
pub async fn update_book(pool: &DbPool, book_id: &str, update: UpdateBookDto) -> Result<Book> {
    debug!("Updating book");

    get_book(pool, book_id)?
        .ok_or_else(|| anyhow!("Book with id {} not found", book_id))?;

    // Only fields that are Some end up in the UPDATE statement
    #[derive(AsChangeset)]
    #[diesel(table_name = books)]
    struct BookChangeset {
        title: Option<String>,
        author: Option<String>,
        isbn: Option<String>,
        genre: Option<String>,
        condition: Option<BookCondition>,
        price: Option<f64>,
        description: Option<String>,
        images: Option<ImageList>,
        is_available: Option<bool>,
        for_sale: Option<bool>,
        for_exchange: Option<bool>,
        published_year: Option<i32>,
        language: Option<String>,
        page_count: Option<i32>,
        updated_at: NaiveDateTime,
    }

    let changeset = BookChangeset {
        title: update.title,
        author: update.author,
        isbn: update.isbn,
        genre: update.genre,
        condition: update.condition,
        price: update.price,
        description: update.description,
        images: update.images.map(ImageList),
        is_available: update.is_available,
        for_sale: update.for_sale,
        for_exchange: update.for_exchange,
        published_year: update.published_year,
        language: update.language,
        page_count: update.page_count,
        updated_at: Utc::now().naive_utc(),
    };

    let mut conn = pool.get()?;

    diesel::update(books::table.find(book_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn).await?;

    drop(conn);

    let updated = get_book(pool, book_id)?
        .ok_or_else(|| anyhow!("Book with id {} disappeared during update", book_id))?;

    info!("Successfully updated book with id: {}", book_id);

    Ok(updated)
}

/// Deletes a book from the database by its ID
///
/// Reviews, wishlist items and exchange requests referencing the book are
/// removed with it by the foreign keys.
///
/// ### Returns
///
/// A Result containing the number of deleted rows (0 or 1)
#[instrument(skip(pool), fields(book_id = %book_id))]
pub async fn delete_book(pool: &DbPool, book_id: &str) -> Result<usize> {
    debug!("Deleting book");

    let mut conn = pool.get()?;

    let deleted = diesel::delete(books::table.find(book_id.to_string()))
        .execute_with_retry(&mut conn).await?;

    info!("Deleted {} book(s) with id: {}", deleted, book_id);

    Ok(deleted)
}

/// Lists the distinct genres of available books, sorted alphabetically
#[instrument(skip(pool))]
pub fn list_genres(pool: &DbPool) -> Result<Vec<String>> {
    let conn = &mut pool.get()?;

    let result = books::table
        .filter(books::is_available.eq(true))
        .select(books::genre)
        .distinct()
        .order(books::genre.asc())
        .load::<String>(conn)?;

    Ok(result)
}

/// Computes the average review rating of a book
///
/// ### Returns
///
/// A summary whose average is 0.0 when the book has no reviews
#[instrument(skip(pool), fields(book_id = %book_id))]
pub fn get_rating_summary(pool: &DbPool, book_id: &str) -> Result<RatingSummaryDto> {
    let conn = &mut pool.get()?;

    let ratings = reviews::table
        .filter(reviews::book_id.eq(book_id))
        .select(reviews::rating)
        .load::<i32>(conn)?;

    Ok(RatingSummaryDto::from_ratings(book_id.to_string(), &ratings))
}

#[cfg(test)]
mod tests;
