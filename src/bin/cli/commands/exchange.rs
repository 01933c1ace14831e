use bookmarket::dto::ExchangeDirection;
use bookmarket::models::ExchangeStatus;
use clap::Subcommand;

use crate::client::BookmarketClient;
use crate::output::{self, OutputConfig};

/// Exchange request commands
#[derive(Subcommand, Debug)]
pub enum ExchangeCommands {
    /// List the exchange requests you sent or received
    List {
        /// Only requests you sent
        #[clap(long, conflicts_with = "received")]
        sent: bool,
        /// Only requests for your books
        #[clap(long)]
        received: bool,
    },
    /// Show one exchange request
    Get {
        id: String,
    },
    /// Offer one of your books for someone else's
    Create {
        /// The book you want
        #[clap(long)]
        want: String,
        /// Your book offered in return
        #[clap(long)]
        offer: String,
        #[clap(long)]
        message: Option<String>,
    },
    /// Accept a request for one of your books
    Accept {
        id: String,
    },
    /// Reject a request for one of your books
    Reject {
        id: String,
    },
    /// Mark an accepted exchange as done
    Complete {
        id: String,
    },
}

impl ExchangeCommands {
    fn direction(sent: bool, received: bool) -> ExchangeDirection {
        match (sent, received) {
            (true, _) => ExchangeDirection::Sent,
            (_, true) => ExchangeDirection::Received,
            _ => ExchangeDirection::All,
        }
    }
}

/// Executes an exchange command
pub async fn execute(
    client: &BookmarketClient,
    cmd: ExchangeCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let (id, status) = match cmd {
        ExchangeCommands::List { sent, received } => {
            let requests = client.list_exchanges(ExchangeCommands::direction(sent, received)).await?;
            output::print_exchanges(&requests, config);
            return Ok(());
        }
        ExchangeCommands::Get { id } => {
            let request = client.get_exchange(&id).await?;
            output::print_exchange(&request, config);
            return Ok(());
        }
        ExchangeCommands::Create { want, offer, message } => {
            let request = client.create_exchange(want, offer, message).await?;
            output::print_exchange(&request, config);
            return Ok(());
        }
        ExchangeCommands::Accept { id } => (id, ExchangeStatus::Accepted),
        ExchangeCommands::Reject { id } => (id, ExchangeStatus::Rejected),
        ExchangeCommands::Complete { id } => (id, ExchangeStatus::Completed),
    };

    let request = client.update_exchange_status(&id, status).await?;
    output::print_exchange(&request, config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_flags() {
        assert_eq!(ExchangeCommands::direction(false, false), ExchangeDirection::All);
        assert_eq!(ExchangeCommands::direction(true, false), ExchangeDirection::Sent);
        assert_eq!(ExchangeCommands::direction(false, true), ExchangeDirection::Received);
    }
}
