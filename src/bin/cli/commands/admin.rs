use clap::Subcommand;

use crate::client::BookmarketClient;
use crate::output::{self, OutputConfig};

/// Administrator commands; the signed-in user must be an admin
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Show catalog and activity totals
    Stats,
    /// List every user
    Users,
    /// List every exchange request
    Exchanges,
}

/// Executes an admin command
pub async fn execute(
    client: &BookmarketClient,
    cmd: AdminCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AdminCommands::Stats => {
            let stats = client.admin_stats().await?;
            output::print_stats(&stats, config);
        }
        AdminCommands::Users => {
            let users = client.admin_users().await?;
            output::print_users(&users, config);
        }
        AdminCommands::Exchanges => {
            let requests = client.admin_exchanges().await?;
            output::print_exchanges(&requests, config);
        }
    }
    Ok(())
}
