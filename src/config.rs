use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use tracing::{info, warn};

use crate::DEFAULT_SESSION_TTL_HOURS;

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Longest accepted session lifetime, ten years
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Configuration for the Bookmarket server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the server binds to
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// How long a sign-in session stays valid, in hours
    pub session_ttl_hours: i64,
    /// Duration between sweeps for expired sessions in minutes
    pub session_purge_interval_minutes: u64,
    /// Load the sample users and books into an empty database at startup
    pub seed_sample_data: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigUpdate {
    /// Optional update for database URL
    #[serde(default)]
    pub database_url: Option<String>,
    /// Optional update for the bind address
    #[serde(default)]
    pub host: Option<String>,
    /// Optional update for the port
    #[serde(default)]
    pub port: Option<u16>,
    /// Optional update for the session lifetime (in hours)
    #[serde(default)]
    pub session_ttl_hours: Option<i64>,
    /// Optional update for the session purge interval (in minutes)
    #[serde(default)]
    pub session_purge_interval_minutes: Option<u64>,
    /// Optional update for loading sample data
    #[serde(default)]
    pub seed_sample_data: Option<bool>,
    /// Server URL used by the CLI; the server itself ignores it
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug)]
#[clap(name = "bookmarket", about = "A marketplace for buying, selling and exchanging books")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind to
    #[clap(long, env = "BOOKMARKET_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[clap(long, env = "BOOKMARKET_PORT")]
    pub port: Option<u16>,

    /// Session lifetime in hours
    #[clap(long, env = "BOOKMARKET_SESSION_TTL_HOURS")]
    pub session_ttl_hours: Option<i64>,

    /// Minutes between sweeps for expired sessions
    #[clap(long, env = "BOOKMARKET_SESSION_PURGE_INTERVAL_MINUTES")]
    pub session_purge_interval_minutes: Option<u64>,

    /// Load sample data into an empty database
    #[clap(long, env = "BOOKMARKET_SEED_SAMPLE_DATA", default_value_t = false)]
    pub seed_sample_data: bool,

    /// Debug mode
    #[clap(long, env = "BOOKMARKET_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            host: update.host.unwrap_or(self.host),
            port: update.port.unwrap_or(self.port),
            session_ttl_hours: update.session_ttl_hours.unwrap_or(self.session_ttl_hours),
            session_purge_interval_minutes: update
                .session_purge_interval_minutes
                .unwrap_or(self.session_purge_interval_minutes),
            seed_sample_data: update.seed_sample_data.unwrap_or(self.seed_sample_data),
        }
    }

    /// Returns the session lifetime as a chrono Duration
    ///
    /// Clamped to between one hour and `MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }

    /// Returns the session purge interval as a Duration
    ///
    /// Never shorter than one minute.
    pub fn session_purge_interval(&self) -> Duration {
        Duration::from_secs(self.session_purge_interval_minutes.clamp(1, u64::MAX / 60) * 60)
    }

    /// The `host:port` pair to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Returns the base (default) configuration
///
/// The database file lives in `data_path` when one is given.
pub fn base_config(data_path: Option<PathBuf>) -> Config {
    let database_url = data_path.map_or("bookmarket.db".to_string(), |path| {
        path.join("bookmarket.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        host: "127.0.0.1".to_string(),
        port: 3000,
        session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        session_purge_interval_minutes: 60,
        seed_sample_data: false,
    }
}

/// Loads configuration from a TOML file
///
/// A missing path or file yields an empty update.
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
///
/// `--seed-sample-data` can only switch seeding on; leaving it off keeps the
/// value from the file.
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        host: args.host,
        port: args.port,
        session_ttl_hours: args.session_ttl_hours,
        session_purge_interval_minutes: args.session_purge_interval_minutes,
        seed_sample_data: args.seed_sample_data.then_some(true),
        server_url: None,
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "bookmarket", "bookmarket")
}

/// Returns the platform config directory, if one can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform data directory, if one can be determined
///
/// Holds the database file, the server logs and the CLI's saved session.
pub fn get_data_dir_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_path = match get_config_dir_path() {
        Some(path) => Some(path.join(CONFIG_FILE_NAME)),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    };

    let data_path = get_data_dir_path().filter(|path| {
        let exists = path.exists();
        if !exists {
            info!("Data directory not found at {:?}, using the working directory", path);
        }
        exists
    });

    let base = base_config(data_path);

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_path).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, bind={}, session_ttl={}h, purge_interval={}min, seed_sample_data={}",
        config.database_url,
        config.bind_address(),
        config.session_ttl_hours,
        config.session_purge_interval_minutes,
        config.seed_sample_data
    );

    config
}

#[cfg(test)]
mod tests;

#[cfg(test)]
mod prop_tests;
