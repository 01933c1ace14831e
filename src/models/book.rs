use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ImageList;

/// Coarse grading of a book's physical state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(rename_all = "kebab-case")]
#[diesel(sql_type = Text)]
pub enum BookCondition {
    New,
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl BookCondition {
    pub const ALL: [BookCondition; 5] = [
        BookCondition::New,
        BookCondition::LikeNew,
        BookCondition::Good,
        BookCondition::Fair,
        BookCondition::Poor,
    ];

    /// The stored and serialized form of the condition
    pub fn as_str(&self) -> &'static str {
        match self {
            BookCondition::New => "new",
            BookCondition::LikeNew => "like-new",
            BookCondition::Good => "good",
            BookCondition::Fair => "fair",
            BookCondition::Poor => "poor",
        }
    }
}

impl fmt::Display for BookCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookCondition {
    type Err = String;

    /// Parses a condition, accepting `like-new`, `like_new` and `LIKE_NEW` alike
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        BookCondition::ALL
            .into_iter()
            .find(|condition| condition.as_str() == normalized)
            .ok_or_else(|| format!("Unknown book condition: {}", s))
    }
}

impl FromSql<Text, Sqlite> for BookCondition {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for BookCondition {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// A book listed on the marketplace
///
/// A listing can be offered for sale, for exchange, or both. Listings that are
/// no longer available stay in the database but are hidden from the catalog.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::books)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Book {
    /// Unique identifier for the book (UUID v4 as string)
    id: String,

    title: String,

    author: String,

    isbn: String,

    genre: String,

    condition: BookCondition,

    /// Asking price; zero is allowed for exchange-only listings
    price: f64,

    description: String,

    images: ImageList,

    /// The user who listed the book
    seller_id: String,

    /// Whether the listing is still shown in the catalog
    is_available: bool,

    for_sale: bool,

    for_exchange: bool,

    published_year: Option<i32>,

    language: Option<String>,

    page_count: Option<i32>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Book {
    /// Creates a new listing
    ///
    /// The listing starts out available and for sale, not for exchange, with
    /// no description, images or publication metadata.
    ///
    /// ### Arguments
    ///
    /// * `seller_id` - The ID of the listing user
    /// * `title` - The book title
    /// * `author` - The book author
    /// * `isbn` - The ISBN as printed on the book
    /// * `genre` - Free-form genre label
    /// * `condition` - The physical condition
    /// * `price` - The asking price
    pub fn new(
        seller_id: &str,
        title: String,
        author: String,
        isbn: String,
        genre: String,
        condition: BookCondition,
        price: f64,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            author,
            isbn,
            genre,
            condition,
            price,
            description: String::new(),
            images: ImageList::default(),
            seller_id: seller_id.to_string(),
            is_available: true,
            for_sale: true,
            for_exchange: false,
            published_year: None,
            language: None,
            page_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_author(&self) -> String {
        self.author.clone()
    }

    pub fn get_isbn(&self) -> String {
        self.isbn.clone()
    }

    pub fn get_genre(&self) -> String {
        self.genre.clone()
    }

    pub fn get_condition(&self) -> BookCondition {
        self.condition
    }

    pub fn get_price(&self) -> f64 {
        self.price
    }

    pub fn get_description(&self) -> String {
        self.description.clone()
    }

    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub fn get_images(&self) -> ImageList {
        self.images.clone()
    }

    pub fn set_images(&mut self, images: ImageList) {
        self.images = images;
    }

    pub fn get_seller_id(&self) -> String {
        self.seller_id.clone()
    }

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub fn set_available(&mut self, is_available: bool) {
        self.is_available = is_available;
    }

    pub fn is_for_sale(&self) -> bool {
        self.for_sale
    }

    pub fn set_for_sale(&mut self, for_sale: bool) {
        self.for_sale = for_sale;
    }

    pub fn is_for_exchange(&self) -> bool {
        self.for_exchange
    }

    pub fn set_for_exchange(&mut self, for_exchange: bool) {
        self.for_exchange = for_exchange;
    }

    pub fn get_published_year(&self) -> Option<i32> {
        self.published_year
    }

    pub fn get_language(&self) -> Option<String> {
        self.language.clone()
    }

    pub fn get_page_count(&self) -> Option<i32> {
        self.page_count
    }

    /// Sets the publication metadata in one go
    pub fn set_metadata(&mut self, published_year: Option<i32>, language: Option<String>, page_count: Option<i32>) {
        self.published_year = published_year;
        self.language = language;
        self.page_count = page_count;
    }

    /// Whether `user_id` is the seller of this listing
    pub fn is_listed_by(&self, user_id: &str) -> bool {
        self.seller_id == user_id
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Book {
        Book::new(
            "seller-1",
            "1984".to_string(),
            "George Orwell".to_string(),
            "9780451524935".to_string(),
            "Dystopian".to_string(),
            BookCondition::New,
            14.99,
        )
    }

    #[test]
    fn test_book_new_defaults() {
        let book = sample_book();

        assert!(Uuid::parse_str(&book.get_id()).is_ok());
        assert!(book.is_available());
        assert!(book.is_for_sale());
        assert!(!book.is_for_exchange());
        assert!(book.get_images().0.is_empty());
        assert_eq!(book.get_description(), "");
        assert_eq!(book.get_created_at(), book.get_updated_at());
        assert!(book.is_listed_by("seller-1"));
        assert!(!book.is_listed_by("seller-2"));
    }

    #[test]
    fn test_condition_serializes_kebab_case() {
        let json = serde_json::to_value(BookCondition::LikeNew).unwrap();
        assert_eq!(json, "like-new");

        let parsed: BookCondition = serde_json::from_str("\"poor\"").unwrap();
        assert_eq!(parsed, BookCondition::Poor);
    }

    #[test]
    fn test_condition_parses_legacy_spelling() {
        assert_eq!("LIKE_NEW".parse::<BookCondition>().unwrap(), BookCondition::LikeNew);
        assert_eq!(" Good ".parse::<BookCondition>().unwrap(), BookCondition::Good);
        assert!("mint".parse::<BookCondition>().is_err());
    }

    #[test]
    fn test_set_metadata() {
        let mut book = sample_book();
        book.set_metadata(Some(1949), Some("English".to_string()), Some(328));

        assert_eq!(book.get_published_year(), Some(1949));
        assert_eq!(book.get_language(), Some("English".to_string()));
        assert_eq!(book.get_page_count(), Some(328));
    }
}
