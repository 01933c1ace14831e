/// Bookmarket: A Used-Book Marketplace Server
///
/// This library provides the core functionality for a marketplace where users
/// list books for sale or exchange, review them, keep wishlists and trade
/// books with each other.
///
/// ### Modules
///
/// - `auth`: Password hashing, session tokens and request extractors
/// - `config`: Layered server configuration
/// - `db`: Database connection management
/// - `dto`: Request and response bodies
/// - `errors`: The API error type
/// - `handlers`: HTTP handlers for every endpoint
/// - `models`: Data structures representing the stored records
/// - `repo`: Repository layer for database operations
/// - `schema`: Database schema definitions
/// - `seed`: Sample data for a fresh database
///
/// ### Web API
///
/// The library exposes a RESTful API using Axum, grouped as:
///
/// - `/auth/*`: sign up, sign in, sign out, current user
/// - `/books`, `/genres`: the catalog
/// - `/reviews`: book reviews
/// - `/wishlist`: the signed-in user's wishlist
/// - `/exchanges`: exchange requests between users
/// - `/admin/*`: dashboard numbers and full listings for admins

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod repo;
pub mod schema;
pub mod seed;

#[cfg(test)]
mod test_utils;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use handlers::*;
use std::sync::Arc;

/// Embedded migrations, applied at startup and in tests
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a session lasts unless configured otherwise
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    /// Lifetime of newly issued sessions
    pub session_ttl: chrono::Duration,
}

impl AppState {
    /// Creates the state with the default session lifetime
    pub fn new(pool: Arc<db::DbPool>) -> Self {
        Self {
            pool,
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: chrono::Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `pool` - The database connection pool to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and the default session lifetime
pub fn create_app(pool: Arc<db::DbPool>) -> Router {
    create_app_with_state(AppState::new(pool))
}

/// Creates the application router around an existing [`AppState`]
pub fn create_app_with_state(state: AppState) -> Router {
    Router::new()
        // Accounts and sessions
        .route("/auth/signup", post(signup_handler))
        .route("/auth/signin", post(signin_handler))
        .route("/auth/signout", post(signout_handler))
        .route("/auth/me", get(me_handler))
        // Catalog; the fixed paths are matched before `/books/{id}`
        .route("/books", get(list_books_handler).post(create_book_handler))
        .route("/books/search", get(search_books_handler))
        .route("/books/genre/{genre}", get(list_books_by_genre_handler))
        .route("/books/for-sale", get(list_books_for_sale_handler))
        .route("/books/for-exchange", get(list_books_for_exchange_handler))
        .route(
            "/books/{id}",
            get(get_book_handler).put(update_book_handler).delete(delete_book_handler),
        )
        .route("/books/{id}/rating", get(get_book_rating_handler))
        .route("/genres", get(list_genres_handler))
        // Reviews
        .route("/reviews", get(list_reviews_handler).post(create_review_handler))
        .route("/reviews/book/{id}", get(list_book_reviews_handler))
        .route("/reviews/user/{id}", get(list_user_reviews_handler))
        // Wishlist of the signed-in user
        .route("/wishlist", get(list_wishlist_handler))
        .route(
            "/wishlist/{book_id}",
            get(wishlist_status_handler)
                .post(add_to_wishlist_handler)
                .delete(remove_from_wishlist_handler),
        )
        // Exchange requests
        .route("/exchanges", get(list_exchanges_handler).post(create_exchange_handler))
        .route("/exchanges/sent", get(list_sent_exchanges_handler))
        .route("/exchanges/received", get(list_received_exchanges_handler))
        .route("/exchanges/{id}", get(get_exchange_handler))
        .route("/exchanges/{id}/status", put(update_exchange_status_handler))
        // Admin dashboard
        .route("/admin/stats", get(admin_stats_handler))
        .route("/admin/users", get(admin_list_users_handler))
        .route("/admin/exchanges", get(admin_list_exchanges_handler))
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Errors
///
/// Returns an error if any pending migration fails to apply
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    tracing::debug!("Applied {} migration(s)", applied.len());

    Ok(())
}
