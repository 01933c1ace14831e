mod client;
mod commands;
mod output;
mod session;

use std::path::PathBuf;
use std::process;

use bookmarket::config;
use clap::{Parser, Subcommand};
use client::BookmarketClient;
use output::{OutputConfig, OutputFormat};

/// CLI for the Bookmarket book exchange
#[derive(Parser, Debug)]
#[clap(name = "bookmarket-cli", about = "CLI for the Bookmarket book exchange")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "BOOKMARKET_URL", global = true)]
    server_url: Option<String>,

    /// File holding the token from `auth signin`
    #[clap(long, env = "BOOKMARKET_SESSION_FILE", global = true)]
    session_file: Option<PathBuf>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign up, sign in and out
    #[command(subcommand)]
    Auth(commands::auth::AuthCommands),
    /// Browse and manage book listings
    #[command(subcommand)]
    Book(commands::book::BookCommands),
    /// Read and write reviews
    #[command(subcommand)]
    Review(commands::review::ReviewCommands),
    /// Manage your wishlist
    #[command(subcommand)]
    Wishlist(commands::wishlist::WishlistCommands),
    /// Propose and answer book exchanges
    #[command(subcommand)]
    Exchange(commands::exchange::ExchangeCommands),
    /// Administrator views
    #[command(subcommand)]
    Admin(commands::admin::AdminCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > http://localhost:3000
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let config_path = config::get_config_dir_path().map(|dir| dir.join(config::CONFIG_FILE_NAME));
    if let Some(path) = config_path {
        if let Ok(update) = config::config_from_file(Some(path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is bookmarket running?\n  {}",
            err_string
        );
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let session_path = cli.session_file.or_else(session::default_session_path);
    let token = session_path
        .as_deref()
        .and_then(session::load)
        .map(|stored| stored.token);
    let client = BookmarketClient::new(server_url, token);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Auth(cmd) => {
            commands::auth::execute(&client, cmd, session_path.as_deref(), &output_config).await
        }
        Commands::Book(cmd) => commands::book::execute(&client, cmd, &output_config).await,
        Commands::Review(cmd) => commands::review::execute(&client, cmd, &output_config).await,
        Commands::Wishlist(cmd) => commands::wishlist::execute(&client, cmd, &output_config).await,
        Commands::Exchange(cmd) => commands::exchange::execute(&client, cmd, &output_config).await,
        Commands::Admin(cmd) => commands::admin::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
