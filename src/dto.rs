use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Book, BookCondition, ExchangeStatus, User, WishlistItem};

/// Shortest accepted username
pub const MIN_USERNAME_LEN: usize = 3;

/// Longest accepted username
pub const MAX_USERNAME_LEN: usize = 50;

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Returns an error naming `field` if `value` is empty or whitespace only
fn require_non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be blank", field))
    } else {
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err(format!("Price must be a non-negative number, got {}", price));
    }
    Ok(())
}

fn validate_page_count(page_count: Option<i32>) -> Result<(), String> {
    match page_count {
        Some(count) if count <= 0 => Err(format!("Page count must be positive, got {}", count)),
        _ => Ok(()),
    }
}

/// Data transfer object for registering a new user
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SignupDto {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupDto {
    /// Checks the username length, email shape and password length
    pub fn validate(&self) -> Result<(), String> {
        let username_len = self.username.trim().chars().count();
        if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
            return Err(format!(
                "Username must be between {} and {} characters",
                MIN_USERNAME_LEN, MAX_USERNAME_LEN
            ));
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(format!("Invalid email address: {}", self.email)),
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
        }

        Ok(())
    }
}

/// Data transfer object for signing in
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SigninDto {
    pub email: String,
    pub password: String,
}

/// Response to a successful sign-in
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponseDto {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Data transfer object for listing a book
///
/// Only the bibliographic basics, condition and price are required; the
/// remaining fields fall back to the defaults of `Book::new`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub condition: BookCondition,
    pub price: f64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub for_sale: Option<bool>,

    #[serde(default)]
    pub for_exchange: Option<bool>,

    #[serde(default)]
    pub published_year: Option<i32>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub page_count: Option<i32>,
}

impl CreateBookDto {
    pub fn validate(&self) -> Result<(), String> {
        require_non_blank("Title", &self.title)?;
        require_non_blank("Author", &self.author)?;
        require_non_blank("ISBN", &self.isbn)?;
        require_non_blank("Genre", &self.genre)?;
        validate_price(self.price)?;
        validate_page_count(self.page_count)?;
        if self.for_sale == Some(false) && self.for_exchange == Some(false) {
            return Err("A listing must be for sale, for exchange, or both".to_string());
        }
        Ok(())
    }
}

/// Data transfer object for editing a listing
///
/// Every field is optional; only the fields present are changed.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UpdateBookDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<BookCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_sale: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub for_exchange: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<i32>,
}

impl UpdateBookDto {
    /// Trims the text fields that are stored trimmed when a listing is created
    pub fn trimmed(mut self) -> Self {
        for field in [&mut self.title, &mut self.author, &mut self.isbn, &mut self.genre] {
            if let Some(value) = field.as_mut() {
                *value = value.trim().to_string();
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("Title", &self.title),
            ("Author", &self.author),
            ("ISBN", &self.isbn),
            ("Genre", &self.genre),
        ];
        for (field, value) in required {
            if let Some(value) = value {
                require_non_blank(field, value)?;
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        validate_page_count(self.page_count)?;
        Ok(())
    }

    /// True if the update would not change anything
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.genre.is_none()
            && self.condition.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.images.is_none()
            && self.is_available.is_none()
            && self.for_sale.is_none()
            && self.for_exchange.is_none()
            && self.published_year.is_none()
            && self.language.is_none()
            && self.page_count.is_none()
    }
}

/// Which kind of listing a catalog query asks for
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    #[default]
    All,
    Sale,
    Exchange,
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingKind::All => f.write_str("all"),
            ListingKind::Sale => f.write_str("sale"),
            ListingKind::Exchange => f.write_str("exchange"),
        }
    }
}

/// Catalog filter, deserialized from the query string of `GET /books`
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BookQueryDto {
    /// Case-insensitive substring of the title or author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Exact genre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,

    pub listing: ListingKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,

    /// Also return listings that are no longer available
    pub include_unavailable: bool,
}

impl fmt::Display for BookQueryDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BookQueryDto {{ q: {:?}, genre: {:?}, listing: {}, seller_id: {:?}, include_unavailable: {} }}",
            self.q, self.genre, self.listing, self.seller_id, self.include_unavailable
        )
    }
}

/// Builder for [`BookQueryDto`]
#[derive(Debug, Default)]
pub struct BookQueryDtoBuilder {
    query: BookQueryDto,
}

impl BookQueryDtoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, q: impl Into<String>) -> Self {
        self.query.q = Some(q.into());
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.query.genre = Some(genre.into());
        self
    }

    pub fn listing(mut self, listing: ListingKind) -> Self {
        self.query.listing = listing;
        self
    }

    pub fn seller_id(mut self, seller_id: impl Into<String>) -> Self {
        self.query.seller_id = Some(seller_id.into());
        self
    }

    pub fn include_unavailable(mut self, include: bool) -> Self {
        self.query.include_unavailable = include;
        self
    }

    pub fn build(self) -> BookQueryDto {
        self.query
    }
}

/// Query string of `GET /books/search`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SearchQueryDto {
    pub q: String,
}

/// Average rating of a book
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RatingSummaryDto {
    pub book_id: String,
    /// Arithmetic mean of all ratings, 0.0 when there are none
    pub average: f64,
    pub count: usize,
}

impl RatingSummaryDto {
    /// Builds a summary from the ratings of one book
    pub fn from_ratings(book_id: String, ratings: &[i32]) -> Self {
        let count = ratings.len();
        let average = if count == 0 {
            0.0
        } else {
            ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / count as f64
        };
        Self { book_id, average, count }
    }
}

/// Data transfer object for writing a review
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateReviewDto {
    pub book_id: String,
    /// Star rating, 1 to 5
    pub rating: i32,
    pub comment: String,
}

/// Filter for `GET /reviews`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReviewQueryDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Whether a book is on the caller's wishlist
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WishlistStatusDto {
    pub book_id: String,
    pub wishlisted: bool,
}

/// A wishlist entry together with the wished-for book
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WishlistEntryDto {
    #[serde(flatten)]
    pub item: WishlistItem,
    pub book: Book,
}

impl From<(WishlistItem, Book)> for WishlistEntryDto {
    fn from((item, book): (WishlistItem, Book)) -> Self {
        Self { item, book }
    }
}

/// Which side of an exchange request the caller is on
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeDirection {
    /// Requests the caller sent or received
    #[default]
    All,
    /// Requests the caller made
    Sent,
    /// Requests for the caller's books
    Received,
}

/// Data transfer object for proposing an exchange
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateExchangeDto {
    /// The book the caller wants
    pub requested_book_id: String,
    /// The caller's own book offered in return
    pub offered_book_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Data transfer object for moving an exchange request to a new status
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UpdateExchangeStatusDto {
    pub status: ExchangeStatus,
}

/// Numbers shown on the admin dashboard
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AdminStatsDto {
    pub total_books: i64,
    pub total_users: i64,
    pub total_reviews: i64,
    pub pending_exchanges: i64,
    /// Sum of the prices of available listings offered for sale
    pub total_listing_value: f64,
}

#[cfg(test)]
mod tests;
