use clap::Subcommand;

use crate::client::BookmarketClient;
use crate::output::{self, OutputConfig};

/// Wishlist commands
#[derive(Subcommand, Debug)]
pub enum WishlistCommands {
    /// Show your wishlist
    List,
    /// Add a book to your wishlist
    Add {
        book_id: String,
    },
    /// Remove a book from your wishlist
    Remove {
        book_id: String,
    },
    /// Check whether a book is on your wishlist
    Status {
        book_id: String,
    },
}

/// Executes a wishlist command
pub async fn execute(
    client: &BookmarketClient,
    cmd: WishlistCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        WishlistCommands::List => {
            let entries = client.list_wishlist().await?;
            output::print_wishlist(&entries, config);
        }
        WishlistCommands::Add { book_id } => {
            let item = client.add_to_wishlist(&book_id).await?;
            output::print_wishlist_item(&item, config);
        }
        WishlistCommands::Remove { book_id } => {
            client.remove_from_wishlist(&book_id).await?;
            output::print_success(&format!("Removed book {} from your wishlist", book_id), config);
        }
        WishlistCommands::Status { book_id } => {
            let status = client.wishlist_status(&book_id).await?;
            output::print_wishlist_status(&status, config);
        }
    }
    Ok(())
}
