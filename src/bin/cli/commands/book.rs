use bookmarket::dto::{BookQueryDto, CreateBookDto, ListingKind, UpdateBookDto};
use bookmarket::models::BookCondition;
use clap::{Subcommand, ValueEnum};

use crate::client::BookmarketClient;
use crate::output::{self, OutputConfig};

/// Listing filter accepted by `book list`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListingArg {
    All,
    Sale,
    Exchange,
}

impl From<ListingArg> for ListingKind {
    fn from(arg: ListingArg) -> Self {
        match arg {
            ListingArg::All => ListingKind::All,
            ListingArg::Sale => ListingKind::Sale,
            ListingArg::Exchange => ListingKind::Exchange,
        }
    }
}

/// Book listing commands
#[derive(Subcommand, Debug)]
pub enum BookCommands {
    /// Browse the catalog
    List {
        /// Search titles and authors
        #[clap(long)]
        query: Option<String>,
        #[clap(long)]
        genre: Option<String>,
        #[clap(long, value_enum, default_value_t = ListingArg::All)]
        listing: ListingArg,
        /// Only books listed by this user
        #[clap(long)]
        seller: Option<String>,
        /// Include books that are no longer available
        #[clap(long)]
        all: bool,
    },
    /// Show one book
    Get {
        id: String,
    },
    /// List a book
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        author: String,
        #[clap(long)]
        isbn: String,
        #[clap(long)]
        genre: String,
        /// new, like-new, good, fair or poor
        #[clap(long)]
        condition: BookCondition,
        #[clap(long)]
        price: f64,
        #[clap(long, default_value = "")]
        description: String,
        /// Image URL; repeat for more, the first is the cover
        #[clap(long = "image")]
        images: Vec<String>,
        /// Also offer the book for exchange
        #[clap(long)]
        exchange: bool,
        /// Offer the book for exchange and not for sale
        #[clap(long, conflicts_with = "exchange")]
        exchange_only: bool,
        #[clap(long)]
        published_year: Option<i32>,
        #[clap(long)]
        language: Option<String>,
        #[clap(long)]
        page_count: Option<i32>,
    },
    /// Edit one of your listings
    Update {
        id: String,
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        author: Option<String>,
        #[clap(long)]
        isbn: Option<String>,
        #[clap(long)]
        genre: Option<String>,
        #[clap(long)]
        condition: Option<BookCondition>,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long)]
        description: Option<String>,
        /// Replace the images; repeat for more, the first is the cover
        #[clap(long = "image")]
        images: Vec<String>,
        #[clap(long)]
        available: Option<bool>,
        #[clap(long)]
        for_sale: Option<bool>,
        #[clap(long)]
        for_exchange: Option<bool>,
        #[clap(long)]
        published_year: Option<i32>,
        #[clap(long)]
        language: Option<String>,
        #[clap(long)]
        page_count: Option<i32>,
    },
    /// Remove one of your listings
    Delete {
        id: String,
    },
    /// Show the average rating of a book
    Rating {
        id: String,
    },
    /// List the genres in the catalog
    Genres,
}

/// Executes a book command
pub async fn execute(
    client: &BookmarketClient,
    cmd: BookCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        BookCommands::List { query, genre, listing, seller, all } => {
            let filter = BookQueryDto {
                q: query,
                genre,
                listing: listing.into(),
                seller_id: seller,
                include_unavailable: all,
            };
            let books = client.list_books(&filter).await?;
            output::print_books(&books, config);
        }
        BookCommands::Get { id } => {
            let book = client.get_book(&id).await?;
            output::print_book(&book, config);
        }
        BookCommands::Create {
            title,
            author,
            isbn,
            genre,
            condition,
            price,
            description,
            images,
            exchange,
            exchange_only,
            published_year,
            language,
            page_count,
        } => {
            let dto = CreateBookDto {
                title,
                author,
                isbn,
                genre,
                condition,
                price,
                description,
                images,
                for_sale: exchange_only.then_some(false),
                for_exchange: (exchange || exchange_only).then_some(true),
                published_year,
                language,
                page_count,
            };
            let book = client.create_book(&dto).await?;
            output::print_book(&book, config);
        }
        BookCommands::Update {
            id,
            title,
            author,
            isbn,
            genre,
            condition,
            price,
            description,
            images,
            available,
            for_sale,
            for_exchange,
            published_year,
            language,
            page_count,
        } => {
            let dto = UpdateBookDto {
                title,
                author,
                isbn,
                genre,
                condition,
                price,
                description,
                // No --image leaves the images as they are
                images: (!images.is_empty()).then_some(images),
                is_available: available,
                for_sale,
                for_exchange,
                published_year,
                language,
                page_count,
            };
            let book = client.update_book(&id, &dto).await?;
            output::print_book(&book, config);
        }
        BookCommands::Delete { id } => {
            client.delete_book(&id).await?;
            output::print_success(&format!("Deleted book {}", id), config);
        }
        BookCommands::Rating { id } => {
            let summary = client.book_rating(&id).await?;
            output::print_rating(&summary, config);
        }
        BookCommands::Genres => {
            let genres = client.list_genres().await?;
            output::print_genres(&genres, config);
        }
    }
    Ok(())
}
