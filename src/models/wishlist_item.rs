use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's saved interest in a book
///
/// Independent of whether the book is later sold or exchanged. At most one
/// item exists per (user, book) pair.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::wishlist_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WishlistItem {
    id: String,
    user_id: String,
    book_id: String,
    added_at: NaiveDateTime,
}

impl WishlistItem {
    pub fn new(user_id: &str, book_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            added_at: Utc::now().naive_utc(),
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

    pub fn get_added_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.added_at, Utc)
    }
}
