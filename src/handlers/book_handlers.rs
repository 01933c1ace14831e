use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{instrument, debug, info, warn};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{
    BookQueryDto, BookQueryDtoBuilder, CreateBookDto, ListingKind, RatingSummaryDto, SearchQueryDto,
    UpdateBookDto,
};
use crate::errors::ApiError;
use crate::models::{Book, ImageList, User};
use crate::repo;

/// Loads a book or fails with `404`
fn find_book(pool: &DbPool, book_id: &str) -> Result<Book, ApiError> {
    repo::get_book(pool, book_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::not_found("Book"))
}

/// Only the seller of a listing and admins may change or remove it
fn ensure_can_modify(book: &Book, user: &User) -> Result<(), ApiError> {
    if book.is_listed_by(&user.get_id()) || user.is_admin() {
        Ok(())
    } else {
        warn!("User {} may not modify book {}", user.get_id(), book.get_id());
        Err(ApiError::Forbidden("Only the seller or an admin can modify this listing".to_string()))
    }
}

/// Handler for listing books
///
/// This function handles GET requests to `/books`. Without parameters it
/// returns every available book, newest first.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - Search text, genre, listing kind, seller and availability filters
///
/// ### Returns
///
/// The matching books as JSON
#[instrument(skip(pool), fields(query = %query))]
pub async fn list_books_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the filters from the query string
    Query(query): Query<BookQueryDto>,
) -> Result<Json<Vec<Book>>, ApiError> {
    debug!("Listing books");

    let books = repo::list_books(&pool, &query)
        .map_err(ApiError::Database)?;

    info!("Retrieved {} books", books.len());

    Ok(Json(books))
}

/// Handler for searching books by title or author
///
/// This function handles GET requests to `/books/search?q=`.
#[instrument(skip(pool), fields(q = %search.q))]
pub async fn search_books_handler(
    State(pool): State<Arc<DbPool>>,
    Query(search): Query<SearchQueryDto>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let query = BookQueryDtoBuilder::new().search(search.q).build();
    let books = repo::list_books(&pool, &query).map_err(ApiError::Database)?;
    Ok(Json(books))
}

/// Handler for listing the available books of one genre
///
/// This function handles GET requests to `/books/genre/{genre}`.
#[instrument(skip(pool), fields(genre = %genre))]
pub async fn list_books_by_genre_handler(
    State(pool): State<Arc<DbPool>>,
    Path(genre): Path<String>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let query = BookQueryDtoBuilder::new().genre(genre).build();
    let books = repo::list_books(&pool, &query).map_err(ApiError::Database)?;
    Ok(Json(books))
}

/// Handler for listing the available books offered for sale
///
/// This function handles GET requests to `/books/for-sale`.
#[instrument(skip(pool))]
pub async fn list_books_for_sale_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let query = BookQueryDtoBuilder::new().listing(ListingKind::Sale).build();
    let books = repo::list_books(&pool, &query).map_err(ApiError::Database)?;
    Ok(Json(books))
}

/// Handler for listing the available books offered for exchange
///
/// This function handles GET requests to `/books/for-exchange`.
#[instrument(skip(pool))]
pub async fn list_books_for_exchange_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let query = BookQueryDtoBuilder::new().listing(ListingKind::Exchange).build();
    let books = repo::list_books(&pool, &query).map_err(ApiError::Database)?;
    Ok(Json(books))
}

/// Handler for retrieving a specific book
///
/// This function handles GET requests to `/books/{id}`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `book_id` - The ID of the book to retrieve, extracted from the URL path
///
/// ### Returns
///
/// The requested book as JSON, or a 404 error if it does not exist
#[instrument(skip(pool), fields(book_id = %book_id))]
pub async fn get_book_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the book ID from the URL path
    Path(book_id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    debug!("Retrieving book");

    let book = find_book(&pool, &book_id)?;

    Ok(Json(book))
}

/// Handler for listing a new book
///
/// This function handles POST requests to `/books`. The signed-in user
/// becomes the seller.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - The signed-in user
/// * `payload` - The listing details
///
/// ### Returns
///
/// The newly created book as JSON
#[instrument(skip(pool, auth, payload), fields(seller_id = %auth.user.get_id(), title = %payload.title))]
pub async fn create_book_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateBookDto>,
) -> Result<Json<Book>, ApiError> {
    info!("Creating new book listing");

    payload.validate().map_err(ApiError::Validation)?;

    let mut book = Book::new(
        &auth.user.get_id(),
        payload.title.trim().to_string(),
        payload.author.trim().to_string(),
        payload.isbn.trim().to_string(),
        payload.genre.trim().to_string(),
        payload.condition,
        payload.price,
    );
    book.set_description(payload.description);
    book.set_images(ImageList(payload.images));
    if let Some(for_sale) = payload.for_sale {
        book.set_for_sale(for_sale);
    }
    if let Some(for_exchange) = payload.for_exchange {
        book.set_for_exchange(for_exchange);
    }
    book.set_metadata(payload.published_year, payload.language, payload.page_count);

    if !book.is_for_sale() && !book.is_for_exchange() {
        return Err(ApiError::Validation("A listing must be for sale, for exchange, or both".to_string()));
    }

    let book = repo::create_book(&pool, book).await
        .map_err(ApiError::Database)?;

    info!("Successfully created book with id: {}", book.get_id());

    Ok(Json(book))
}

/// Handler for editing a listing
///
/// This function handles PUT requests to `/books/{id}`. Only the fields
/// present in the body change.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - The signed-in user; must be the seller or an admin
/// * `book_id` - The ID of the book to update, extracted from the URL path
/// * `payload` - The fields to change
///
/// ### Returns
///
/// The updated book as JSON
#[instrument(skip(pool, auth, payload), fields(user_id = %auth.user.get_id(), book_id = %book_id))]
pub async fn update_book_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract the book ID from the URL path
    Path(book_id): Path<String>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<UpdateBookDto>,
) -> Result<Json<Book>, ApiError> {
    info!("Updating book");

    let book = find_book(&pool, &book_id)?;
    ensure_can_modify(&book, &auth.user)?;

    let payload = payload.trimmed();
    payload.validate().map_err(ApiError::Validation)?;

    if payload.is_empty() {
        debug!("Empty update, returning book unchanged");
        return Ok(Json(book));
    }

    let for_sale = payload.for_sale.unwrap_or(book.is_for_sale());
    let for_exchange = payload.for_exchange.unwrap_or(book.is_for_exchange());
    if !for_sale && !for_exchange {
        return Err(ApiError::Validation("A listing must be for sale, for exchange, or both".to_string()));
    }

    let updated = repo::update_book(&pool, &book_id, payload).await
        .map_err(ApiError::Database)?;

    Ok(Json(updated))
}

/// Handler for removing a listing
///
/// This function handles DELETE requests to `/books/{id}`. Reviews, wishlist
/// entries and exchange requests for the book go with it.
#[instrument(skip(pool, auth), fields(user_id = %auth.user.get_id(), book_id = %book_id))]
pub async fn delete_book_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract the book ID from the URL path
    Path(book_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting book with id: {}", book_id);

    let book = find_book(&pool, &book_id)?;
    ensure_can_modify(&book, &auth.user)?;

    repo::delete_book(&pool, &book_id).await
        .map_err(ApiError::Database)?;

    info!("Successfully deleted book with id: {}", book_id);

    Ok(Json(()))
}

/// Handler for a book's average rating
///
/// This function handles GET requests to `/books/{id}/rating`.
#[instrument(skip(pool), fields(book_id = %book_id))]
pub async fn get_book_rating_handler(
    State(pool): State<Arc<DbPool>>,
    Path(book_id): Path<String>,
) -> Result<Json<RatingSummaryDto>, ApiError> {
    find_book(&pool, &book_id)?;

    let summary = repo::get_rating_summary(&pool, &book_id)
        .map_err(ApiError::Database)?;

    Ok(Json(summary))
}

/// Handler for the genres of available books
///
/// This function handles GET requests to `/genres`.
#[instrument(skip(pool))]
pub async fn list_genres_handler(
    State(pool): State<Arc<DbPool>>,
) -> Result<Json<Vec<String>>, ApiError> {
    let genres = repo::list_genres(&pool).map_err(ApiError::Database)?;
    Ok(Json(genres))
}
