use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered marketplace user
///
/// The password hash is stored with the user but never leaves the server: it
/// is skipped when the user is serialized.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    /// Unique identifier for the user (UUID v4 as string)
    id: String,

    /// Public display name, unique across users
    username: String,

    /// Sign-in address, unique across users
    email: String,

    /// Salted password hash, see `auth::hash_password`
    #[serde(skip_serializing, default)]
    password_hash: String,

    /// Whether the user may moderate any listing
    is_admin: bool,

    /// Optional avatar image URL
    avatar: Option<String>,

    /// When the user signed up
    joined_at: NaiveDateTime,
}

impl User {
    /// Creates a new, non-admin user
    ///
    /// ### Arguments
    ///
    /// * `username` - The display name
    /// * `email` - The sign-in address
    /// * `password_hash` - An already hashed password
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            email,
            password_hash,
            is_admin: false,
            avatar: None,
            joined_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_username(&self) -> String {
        self.username.clone()
    }

    pub fn get_email(&self) -> String {
        self.email.clone()
    }

    pub(crate) fn get_password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    pub fn set_admin(&mut self, is_admin: bool) {
        self.is_admin = is_admin;
    }

    pub fn get_avatar(&self) -> Option<String> {
        self.avatar.clone()
    }

    pub fn set_avatar(&mut self, avatar: Option<String>) {
        self.avatar = avatar;
    }

    /// Gets the sign-up timestamp as a DateTime<Utc>
    pub fn get_joined_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.joined_at, Utc)
    }
}
