/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database: users and their
/// sessions, book listings, reviews, wishlists, exchange requests and the
/// aggregate numbers shown to admins.
///
/// Reads are plain synchronous queries. Writes go through
/// [`ExecuteWithRetry`](crate::db::ExecuteWithRetry) so that a busy database
/// does not fail the request outright.

mod user_repo;
mod book_repo;
mod review_repo;
mod wishlist_repo;
mod exchange_repo;
mod stats_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use book_repo::*;
pub use review_repo::*;
pub use wishlist_repo::*;
pub use exchange_repo::*;
pub use stats_repo::*;
