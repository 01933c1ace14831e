use bookmarket::dto::{AdminStatsDto, AuthResponseDto, RatingSummaryDto, WishlistEntryDto, WishlistStatusDto};
use bookmarket::models::{Book, ExchangeRequest, Review, User, WishlistItem};
use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

/// Lays out rows in left-aligned columns sized to their widest cell
fn format_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    lines.extend(rows.iter().map(|row| format_row(row.iter().map(String::as_str).collect())));
    lines
}

/// Prints a list: a table for humans, one id per line when quiet
fn print_list<T: Serialize>(
    items: &[T],
    what: &str,
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
    id: impl Fn(&T) -> String,
    config: &OutputConfig,
) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                for item in items {
                    println!("{}", id(item));
                }
                return;
            }
            if items.is_empty() {
                println!("No {} found.", what);
                return;
            }
            let rows: Vec<Vec<String>> = items.iter().map(row).collect();
            for line in format_table(headers, &rows) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Prints one record: labelled fields for humans, the id when quiet
fn print_record<T: Serialize>(item: &T, id: String, fields: &[(&str, String)], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", id);
                return;
            }
            let label_width = fields.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
            for (label, value) in fields {
                println!("{:<width$} {}", format!("{}:", label), value, width = label_width);
            }
        }
        OutputFormat::Json => print_json(item),
    }
}

fn price(value: f64) -> String {
    format!("{:.2}", value)
}

fn listing_kind(book: &Book) -> &'static str {
    match (book.is_for_sale(), book.is_for_exchange()) {
        (true, true) => "sale+exchange",
        (true, false) => "sale",
        (false, true) => "exchange",
        (false, false) => "-",
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Prints a single user in the specified format
pub fn print_user(user: &User, config: &OutputConfig) {
    let fields = [
        ("ID", user.get_id()),
        ("Username", user.get_username()),
        ("Email", user.get_email()),
        ("Admin", user.is_admin().to_string()),
        ("Avatar", user.get_avatar().unwrap_or_else(|| "-".to_string())),
        ("Joined", user.get_joined_at().to_string()),
    ];
    print_record(user, user.get_id(), &fields, config);
}

/// Prints a list of users in the specified format
pub fn print_users(users: &[User], config: &OutputConfig) {
    print_list(
        users,
        "users",
        &["ID", "USERNAME", "EMAIL", "ADMIN"],
        |u| vec![u.get_id(), u.get_username(), u.get_email(), u.is_admin().to_string()],
        User::get_id,
        config,
    );
}

/// Prints the result of signing in
pub fn print_session(session: &AuthResponseDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if config.quiet => println!("{}", session.user.get_id()),
        OutputFormat::Human => {
            println!("Signed in as {} <{}>", session.user.get_username(), session.user.get_email());
            println!("Session expires {}", session.expires_at);
        }
        // The token itself is kept out of the output
        OutputFormat::Json => print_json(&serde_json::json!({
            "user": session.user,
            "expires_at": session.expires_at,
        })),
    }
}

/// Prints a list of books in the specified format
pub fn print_books(books: &[Book], config: &OutputConfig) {
    print_list(
        books,
        "books",
        &["ID", "TITLE", "AUTHOR", "GENRE", "CONDITION", "PRICE", "LISTING"],
        |b| vec![
            b.get_id(),
            b.get_title(),
            b.get_author(),
            b.get_genre(),
            b.get_condition().to_string(),
            price(b.get_price()),
            listing_kind(b).to_string(),
        ],
        Book::get_id,
        config,
    );
}

/// Prints a single book in the specified format
pub fn print_book(book: &Book, config: &OutputConfig) {
    let fields = [
        ("ID", book.get_id()),
        ("Title", book.get_title()),
        ("Author", book.get_author()),
        ("ISBN", book.get_isbn()),
        ("Genre", book.get_genre()),
        ("Condition", book.get_condition().to_string()),
        ("Price", price(book.get_price())),
        ("Listing", listing_kind(book).to_string()),
        ("Available", book.is_available().to_string()),
        ("Seller", book.get_seller_id()),
        ("Published", optional(book.get_published_year())),
        ("Language", optional(book.get_language())),
        ("Pages", optional(book.get_page_count())),
        ("Cover", optional(book.get_images().cover())),
        ("Description", book.get_description()),
        ("Created", book.get_created_at().to_string()),
        ("Updated", book.get_updated_at().to_string()),
    ];
    print_record(book, book.get_id(), &fields, config);
}

/// Prints a book's rating summary
pub fn print_rating(summary: &RatingSummaryDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if config.quiet => println!("{:.2}", summary.average),
        OutputFormat::Human => {
            println!("Average rating: {:.2} ({} review(s))", summary.average, summary.count);
        }
        OutputFormat::Json => print_json(summary),
    }
}

/// Prints genre names, one per line
pub fn print_genres(genres: &[String], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if genres.is_empty() && !config.quiet {
                println!("No genres found.");
            }
            for genre in genres {
                println!("{}", genre);
            }
        }
        OutputFormat::Json => print_json(genres),
    }
}

/// Prints a list of reviews in the specified format
pub fn print_reviews(reviews: &[Review], config: &OutputConfig) {
    print_list(
        reviews,
        "reviews",
        &["ID", "BOOK", "USER", "RATING", "COMMENT"],
        |r| vec![r.get_id(), r.get_book_id(), r.get_user_id(), r.get_rating().to_string(), r.get_comment()],
        Review::get_id,
        config,
    );
}

/// Prints a single review in the specified format
pub fn print_review(review: &Review, config: &OutputConfig) {
    let fields = [
        ("ID", review.get_id()),
        ("Book", review.get_book_id()),
        ("User", review.get_user_id()),
        ("Rating", review.get_rating().to_string()),
        ("Comment", review.get_comment()),
        ("Created", review.get_created_at().to_string()),
    ];
    print_record(review, review.get_id(), &fields, config);
}

/// Prints the wishlist with the title of each book
pub fn print_wishlist(entries: &[WishlistEntryDto], config: &OutputConfig) {
    print_list(
        entries,
        "wishlist entries",
        &["BOOK", "TITLE", "PRICE", "ADDED"],
        |e| vec![e.book.get_id(), e.book.get_title(), price(e.book.get_price()), e.item.get_added_at().to_string()],
        |e| e.book.get_id(),
        config,
    );
}

/// Prints a single wishlist entry
pub fn print_wishlist_item(item: &WishlistItem, config: &OutputConfig) {
    let fields = [
        ("ID", item.get_id()),
        ("Book", item.get_book_id()),
        ("Added", item.get_added_at().to_string()),
    ];
    print_record(item, item.get_id(), &fields, config);
}

/// Prints whether a book is on the wishlist
pub fn print_wishlist_status(status: &WishlistStatusDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if config.quiet => println!("{}", status.wishlisted),
        OutputFormat::Human if status.wishlisted => println!("Book {} is on your wishlist", status.book_id),
        OutputFormat::Human => println!("Book {} is not on your wishlist", status.book_id),
        OutputFormat::Json => print_json(status),
    }
}

/// Prints a list of exchange requests in the specified format
pub fn print_exchanges(requests: &[ExchangeRequest], config: &OutputConfig) {
    print_list(
        requests,
        "exchange requests",
        &["ID", "STATUS", "FROM", "TO", "WANTS", "OFFERS"],
        |x| vec![
            x.get_id(),
            x.get_status().to_string(),
            x.get_requester_name(),
            x.get_owner_name(),
            x.get_requested_book_title(),
            x.get_offered_book_title(),
        ],
        ExchangeRequest::get_id,
        config,
    );
}

/// Prints a single exchange request in the specified format
pub fn print_exchange(request: &ExchangeRequest, config: &OutputConfig) {
    let fields = [
        ("ID", request.get_id()),
        ("Status", request.get_status().to_string()),
        ("Requester", format!("{} ({})", request.get_requester_name(), request.get_requester_id())),
        ("Owner", format!("{} ({})", request.get_owner_name(), request.get_owner_id())),
        ("Wants", format!("{} ({})", request.get_requested_book_title(), request.get_requested_book_id())),
        ("Offers", format!("{} ({})", request.get_offered_book_title(), request.get_offered_book_id())),
        ("Message", optional(request.get_message())),
        ("Created", request.get_created_at().to_string()),
        ("Updated", request.get_updated_at().to_string()),
    ];
    print_record(request, request.get_id(), &fields, config);
}

/// Prints the admin dashboard numbers
pub fn print_stats(stats: &AdminStatsDto, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            println!("Books:             {}", stats.total_books);
            println!("Users:             {}", stats.total_users);
            println!("Reviews:           {}", stats.total_reviews);
            println!("Pending exchanges: {}", stats.pending_exchanges);
            println!("Listing value:     {}", price(stats.total_listing_value));
        }
        OutputFormat::Json => print_json(stats),
    }
}

/// Prints a success message
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"status": "ok", "message": message})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_table_aligns_columns() {
        let rows = vec![
            vec!["1".to_string(), "Dune".to_string()],
            vec!["22".to_string(), "Emma".to_string()],
        ];
        let lines = format_table(&["ID", "TITLE"], &rows);

        assert_eq!(lines, vec!["ID  TITLE", "1   Dune", "22  Emma"]);
    }

    #[test]
    fn test_format_table_counts_chars_not_bytes() {
        let rows = vec![vec!["Müller".to_string(), "x".to_string()]];
        let lines = format_table(&["AUTHOR", "X"], &rows);

        assert_eq!(lines[1], "Müller  x");
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(Some(1949)), "1949");
        assert_eq!(optional::<i32>(None), "-");
    }
}
