use crate::db::{DbPool, ExecuteWithRetry};
use crate::dto::ReviewQueryDto;
use crate::models::Review;
use crate::schema::reviews;
use anyhow::{anyhow, Result};
use diesel::prelude::*;
use tracing::{instrument, debug, info};

/// Records a review of a book
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `user_id` - The ID of the reviewing user
/// * `book_id` - The ID of the reviewed book
/// * `rating` - The star rating (1-5)
/// * `comment` - The review text
///
/// ### Returns
///
/// A Result containing the newly created Review if successful
///
/// ### Errors
///
/// Returns an error if:
/// - The rating is invalid (not 1-5)
/// - Unable to get a connection from the pool
/// - The user or book does not exist (a foreign key violation)
/// - The database insert operation fails
#[instrument(skip(pool, comment), fields(user_id = %user_id, book_id = %book_id, rating = rating))]
pub async fn create_review(pool: &DbPool, user_id: &str, book_id: &str, rating: i32, comment: String) -> Result<Review> {
    Review::validate_rating(rating).map_err(|e| anyhow!(e))?;

    let mut conn = pool.get()?;

    let new_review = Review::new(user_id, book_id, rating, comment);

    diesel::insert_into(reviews::table)
        .values(new_review.clone())
        .execute_with_retry(&mut conn).await?;

    info!("Successfully created review with id: {}", new_review.get_id());

    Ok(new_review)
}

/// Lists reviews, newest first, optionally restricted to a book and/or author
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `query` - Optional book and user filters; both may be combined
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool), fields(book_id = ?query.book_id, user_id = ?query.user_id))]
pub fn list_reviews(pool: &DbPool, query: &ReviewQueryDto) -> Result<Vec<Review>> {
    let conn = &mut pool.get()?;

    let mut review_query = reviews::table.into_boxed();

    if let Some(book_id) = &query.book_id {
        review_query = review_query.filter(reviews::book_id.eq(book_id.clone()));
    }

    if let Some(user_id) = &query.user_id {
        review_query = review_query.filter(reviews::user_id.eq(user_id.clone()));
    }

    let result = review_query
        .order((reviews::created_at.desc(), reviews::id.asc()))
        .load::<Review>(conn)?;

    debug!("Found {} reviews", result.len());

    Ok(result)
}

/// Returns the total number of reviews
#[instrument(skip(pool))]
pub fn count_reviews(pool: &DbPool) -> Result<i64> {
    let conn = &mut pool.get()?;
    let count = reviews::table.count().get_result::<i64>(conn)?;
    Ok(count)
}
