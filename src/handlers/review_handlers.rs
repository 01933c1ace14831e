use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::Query;
use std::sync::Arc;
use tracing::{instrument, debug, info};

use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::dto::{CreateReviewDto, ReviewQueryDto};
use crate::errors::ApiError;
use crate::models::Review;
use crate::repo;

/// Handler for listing reviews
///
/// This function handles GET requests to `/reviews`. The optional `book_id`
/// and `user_id` query parameters narrow the list and can be combined.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `query` - The book and author filters
///
/// ### Returns
///
/// The matching reviews as JSON, newest first
#[instrument(skip(pool), fields(book_id = ?query.book_id, user_id = ?query.user_id))]
pub async fn list_reviews_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Extract the filters from the query string
    Query(query): Query<ReviewQueryDto>,
) -> Result<Json<Vec<Review>>, ApiError> {
    debug!("Listing reviews");

    let reviews = repo::list_reviews(&pool, &query)
        .map_err(ApiError::Database)?;

    info!("Retrieved {} reviews", reviews.len());

    Ok(Json(reviews))
}

/// Handler for the reviews of one book
///
/// This function handles GET requests to `/reviews/book/{id}`.
#[instrument(skip(pool), fields(book_id = %book_id))]
pub async fn list_book_reviews_handler(
    State(pool): State<Arc<DbPool>>,
    Path(book_id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let query = ReviewQueryDto { book_id: Some(book_id), user_id: None };
    let reviews = repo::list_reviews(&pool, &query).map_err(ApiError::Database)?;
    Ok(Json(reviews))
}

/// Handler for the reviews written by one user
///
/// This function handles GET requests to `/reviews/user/{id}`.
#[instrument(skip(pool), fields(user_id = %user_id))]
pub async fn list_user_reviews_handler(
    State(pool): State<Arc<DbPool>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let query = ReviewQueryDto { book_id: None, user_id: Some(user_id) };
    let reviews = repo::list_reviews(&pool, &query).map_err(ApiError::Database)?;
    Ok(Json(reviews))
}

/// Handler for reviewing a book
///
/// This function handles POST requests to `/reviews`.
///
/// ### Arguments
///
/// * `pool` - The database connection pool
/// * `auth` - The signed-in user writing the review
/// * `payload` - The book, rating and comment
///
/// ### Returns
///
/// The newly created review as JSON
///
/// ### Errors
///
/// - `NotFound` if the book does not exist
/// - `InvalidRating` if the rating is outside 1 to 5
/// - `Validation` if the comment is blank or the book is the reviewer's own listing
#[instrument(skip(pool, auth, payload), fields(user_id = %auth.user.get_id(), book_id = %payload.book_id, rating = payload.rating))]
pub async fn create_review_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Resolve the bearer token to the signed-in user
    auth: AuthUser,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateReviewDto>,
) -> Result<Json<Review>, ApiError> {
    info!("Recording review");

    let book = repo::get_book(&pool, &payload.book_id)
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::not_found("Book"))?;

    Review::validate_rating(payload.rating).map_err(ApiError::InvalidRating)?;

    let comment = payload.comment.trim();
    if comment.is_empty() {
        return Err(ApiError::Validation("Comment must not be blank".to_string()));
    }

    if book.is_listed_by(&auth.user.get_id()) {
        return Err(ApiError::Validation("You cannot review your own listing".to_string()));
    }

    let review = repo::create_review(&pool, &auth.user.get_id(), &book.get_id(), payload.rating, comment.to_string()).await
        .map_err(ApiError::Database)?;

    info!("Successfully recorded review with id: {}", review.get_id());

    Ok(Json(review))
}
