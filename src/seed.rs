//! Sample data for a fresh database.

use anyhow::Result;
use tracing::{info, instrument};

use crate::auth::hash_password;
use crate::db::DbPool;
use crate::models::{Book, BookCondition, ImageList, User};
use crate::repo;

/// Password shared by all sample users
pub const SAMPLE_PASSWORD: &str = "password123";

struct SampleUser {
    username: &'static str,
    email: &'static str,
    is_admin: bool,
    avatar: &'static str,
}

struct SampleBook {
    seller: usize,
    title: &'static str,
    author: &'static str,
    isbn: &'static str,
    genre: &'static str,
    condition: BookCondition,
    price: f64,
    description: &'static str,
    published_year: i32,
    page_count: i32,
    image: &'static str,
}

const USERS: [SampleUser; 3] = [
    SampleUser {
        username: "john_doe",
        email: "john@example.com",
        is_admin: false,
        avatar: "https://images.pexels.com/photos/733872/pexels-photo-733872.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
    SampleUser {
        username: "jane_smith",
        email: "jane@example.com",
        is_admin: false,
        avatar: "https://images.pexels.com/photos/157661/young-woman-standing-in-front-of-window-157661.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
    SampleUser {
        username: "admin_user",
        email: "admin@bookapp.com",
        is_admin: true,
        avatar: "https://images.pexels.com/photos/157661/young-woman-standing-in-front-of-window-157661.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
];

const BOOKS: [SampleBook; 4] = [
    SampleBook {
        seller: 0,
        title: "The Great Gatsby",
        author: "F. Scott Fitzgerald",
        isbn: "9780743273565",
        genre: "Fiction",
        condition: BookCondition::Good,
        price: 12.99,
        description: "A story of decadence and excess in the Jazz Age",
        published_year: 1925,
        page_count: 180,
        image: "https://images.pexels.com/photos/462633/pexels-photo-462633.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
    SampleBook {
        seller: 0,
        title: "To Kill a Mockingbird",
        author: "Harper Lee",
        isbn: "9780061120084",
        genre: "Fiction",
        condition: BookCondition::LikeNew,
        price: 9.99,
        description: "A story of racial injustice in the American South",
        published_year: 1960,
        page_count: 281,
        image: "https://images.pexels.com/photos/1533264/pexels-photo-1533264.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
    SampleBook {
        seller: 1,
        title: "1984",
        author: "George Orwell",
        isbn: "9780451524935",
        genre: "Dystopian",
        condition: BookCondition::New,
        price: 14.99,
        description: "A dystopian novel about totalitarianism and surveillance",
        published_year: 1949,
        page_count: 328,
        image: "https://images.pexels.com/photos/1581384/pexels-photo-1581384.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
    SampleBook {
        seller: 1,
        title: "Pride and Prejudice",
        author: "Jane Austen",
        isbn: "9780141439518",
        genre: "Romance",
        condition: BookCondition::Fair,
        price: 7.99,
        description: "A classic romance novel exploring themes of class and marriage",
        published_year: 1813,
        page_count: 432,
        image: "https://images.pexels.com/photos/1181396/pexels-photo-1181396.jpeg?auto=compress&cs=tinysrgb&w=1260&h=750&dpr=1",
    },
];

/// (user, book, rating, comment), indexes into `USERS` and `BOOKS`
const REVIEWS: [(usize, usize, i32, &str); 4] = [
    (1, 0, 5, "A timeless classic that captures the essence of the American Dream"),
    (1, 1, 4, "Powerful storytelling that still resonates today"),
    (0, 2, 5, "Scarily prescient and still relevant in today's world"),
    (0, 3, 3, "A bit dated but still enjoyable romance"),
];

/// (user, book), indexes into `USERS` and `BOOKS`
const WISHLIST: [(usize, usize); 3] = [(0, 2), (1, 0), (0, 3)];

/// Loads the sample users, books, reviews and wishlist entries
///
/// Does nothing if the database already has users.
///
/// ### Returns
///
/// `true` if the sample data was inserted, `false` if it was skipped
#[instrument(skip(pool))]
pub async fn seed_sample_data(pool: &DbPool) -> Result<bool> {
    if repo::count_users(pool)? > 0 {
        info!("Database already has users, skipping sample data");
        return Ok(false);
    }

    let mut users = Vec::with_capacity(USERS.len());
    for sample in &USERS {
        let mut user = User::new(
            sample.username.to_string(),
            sample.email.to_string(),
            hash_password(SAMPLE_PASSWORD),
        );
        user.set_admin(sample.is_admin);
        user.set_avatar(Some(sample.avatar.to_string()));
        repo::insert_user(pool, &user).await?;
        users.push(user);
    }

    let mut books = Vec::with_capacity(BOOKS.len());
    for sample in &BOOKS {
        let mut book = Book::new(
            &users[sample.seller].get_id(),
            sample.title.to_string(),
            sample.author.to_string(),
            sample.isbn.to_string(),
            sample.genre.to_string(),
            sample.condition,
            sample.price,
        );
        book.set_description(sample.description.to_string());
        book.set_images(ImageList(vec![sample.image.to_string()]));
        book.set_metadata(Some(sample.published_year), Some("English".to_string()), Some(sample.page_count));
        books.push(repo::create_book(pool, book).await?);
    }

    for (user, book, rating, comment) in REVIEWS {
        repo::create_review(pool, &users[user].get_id(), &books[book].get_id(), rating, comment.to_string()).await?;
    }

    for (user, book) in WISHLIST {
        repo::add_to_wishlist(pool, &users[user].get_id(), &books[book].get_id()).await?;
    }

    info!(
        "Inserted sample data: {} users, {} books, {} reviews, {} wishlist items",
        users.len(),
        books.len(),
        REVIEWS.len(),
        WISHLIST.len()
    );

    Ok(true)
}
