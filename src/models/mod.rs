/// Data models module
///
/// This module defines the records stored by the marketplace: users and their
/// sessions, book listings, reviews, wishlist entries and exchange requests.
/// Each model maps onto one database table.

mod image_list;
pub use image_list::ImageList;

mod user;
pub use user::User;

mod session;
pub use session::Session;

mod book;
pub use book::{Book, BookCondition};

mod review;
pub use review::{Review, MAX_RATING, MIN_RATING};

mod wishlist_item;
pub use wishlist_item::WishlistItem;

mod exchange_request;
pub use exchange_request::{ExchangeRequest, ExchangeStatus};
