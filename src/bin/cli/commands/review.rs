use bookmarket::dto::ReviewQueryDto;
use clap::Subcommand;

use crate::client::BookmarketClient;
use crate::output::{self, OutputConfig};

/// Review commands
#[derive(Subcommand, Debug)]
pub enum ReviewCommands {
    /// List reviews, optionally for one book or one reviewer
    List {
        #[clap(long)]
        book: Option<String>,
        #[clap(long)]
        user: Option<String>,
    },
    /// Review a book
    Create {
        book_id: String,
        /// 1 to 5 stars
        #[clap(long)]
        rating: i32,
        #[clap(long)]
        comment: String,
    },
}

/// Executes a review command
pub async fn execute(
    client: &BookmarketClient,
    cmd: ReviewCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ReviewCommands::List { book, user } => {
            let query = ReviewQueryDto { book_id: book, user_id: user };
            let reviews = client.list_reviews(&query).await?;
            output::print_reviews(&reviews, config);
        }
        ReviewCommands::Create { book_id, rating, comment } => {
            let review = client.create_review(book_id, rating, comment).await?;
            output::print_review(&review, config);
        }
    }
    Ok(())
}
