pub mod admin;
pub mod auth;
pub mod book;
pub mod exchange;
pub mod review;
pub mod wishlist;
