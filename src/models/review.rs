use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest star rating a review may give
pub const MIN_RATING: i32 = 1;

/// Highest star rating a review may give
pub const MAX_RATING: i32 = 5;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::reviews)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Review {
    /// Unique identifier for the review (UUID v4 as string)
    id: String,

    /// The ID of the user who wrote the review
    user_id: String,

    /// The ID of the reviewed book
    book_id: String,

    /// Star rating between `MIN_RATING` and `MAX_RATING`
    rating: i32,

    comment: String,

    created_at: NaiveDateTime,
}

impl Review {
    /// Creates a new review
    ///
    /// The rating is not checked here; use [`Review::validate_rating`] before
    /// storing user input. The database rejects out-of-range ratings as well.
    ///
    /// ### Arguments
    ///
    /// * `user_id` - The ID of the reviewing user
    /// * `book_id` - The ID of the reviewed book
    /// * `rating` - The star rating
    /// * `comment` - Free-form review text
    pub fn new(user_id: &str, book_id: &str, rating: i32, comment: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            rating,
            comment,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Creates a review with all fields specified
    pub fn new_with_fields(
        id: String,
        user_id: String,
        book_id: String,
        rating: i32,
        comment: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            book_id,
            rating,
            comment,
            created_at: created_at.naive_utc(),
        }
    }

    /// Checks that a rating is within the accepted star range
    ///
    /// ### Returns
    ///
    /// `Ok(())` for ratings in `MIN_RATING..=MAX_RATING`, otherwise an error
    /// message suitable for the client
    pub fn validate_rating(rating: i32) -> Result<(), String> {
        if (MIN_RATING..=MAX_RATING).contains(&rating) {
            Ok(())
        } else {
            Err(format!("Rating must be between {} and {}, got {}", MIN_RATING, MAX_RATING, rating))
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_book_id(&self) -> String {
        self.book_id.clone()
    }

    pub fn get_rating(&self) -> i32 {
        self.rating
    }

    pub fn get_comment(&self) -> String {
        self.comment.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
