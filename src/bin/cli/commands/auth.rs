use std::path::Path;

use clap::Subcommand;

use crate::client::BookmarketClient;
use crate::output::{self, OutputConfig};
use crate::session::{self, StoredSession};

/// Account commands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Create a new account
    Signup {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        /// At least 6 characters
        #[clap(long, env = "BOOKMARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and remember the session token
    Signin {
        #[clap(long)]
        email: String,
        #[clap(long, env = "BOOKMARKET_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the current session
    Signout,
    /// Show the signed-in user
    Me,
}

/// Executes an account command
///
/// `session_path` is where the token from `signin` is kept; with no path the
/// token is only printed.
pub async fn execute(
    client: &BookmarketClient,
    cmd: AuthCommands,
    session_path: Option<&Path>,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        AuthCommands::Signup { username, email, password } => {
            let user = client.signup(username, email, password).await?;
            output::print_user(&user, config);
        }
        AuthCommands::Signin { email, password } => {
            let response = client.signin(email, password).await?;
            match session_path {
                Some(path) => session::save(path, &StoredSession::from(&response))?,
                None => eprintln!("No session file available; token: {}", response.token),
            }
            output::print_session(&response, config);
        }
        AuthCommands::Signout => {
            client.signout().await?;
            if let Some(path) = session_path {
                session::clear(path)?;
            }
            output::print_success("Signed out", config);
        }
        AuthCommands::Me => {
            let user = client.me().await?;
            output::print_user(&user, config);
        }
    }
    Ok(())
}
