/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler is responsible for processing a specific type of HTTP request,
/// extracting the necessary data, calling the appropriate repository functions,
/// and returning a properly formatted response.

mod auth_handlers;
mod book_handlers;
mod review_handlers;
mod wishlist_handlers;
mod exchange_handlers;
mod admin_handlers;

// Re-export all handlers
pub use auth_handlers::*;
pub use book_handlers::*;
pub use review_handlers::*;
pub use wishlist_handlers::*;
pub use exchange_handlers::*;
pub use admin_handlers::*;
