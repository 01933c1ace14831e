use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bookmarket::config::{self, CliArgs, Config};
use bookmarket::{db, repo, seed, AppState};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Sets up logging to stdout and, when a data directory exists, to a daily
/// rolling JSON file inside it
///
/// The returned guard must be kept alive for the file writer to flush.
fn init_tracing(debug: bool) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bookmarket={default_level},tower_http={default_level}")));

    let log_dir: Option<PathBuf> = config::get_data_dir_path()
        .map(|dir| dir.join("logs"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, "bookmarket.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().json().with_writer(writer))
                .init();
            info!("Writing logs to {:?}", dir);
            Some(guard)
        }
        None => {
            registry.init();
            warn!("No data directory available, logging to stdout only");
            None
        }
    }
}

/// Periodically deletes sessions that have expired
fn spawn_session_purge(pool: Arc<db::DbPool>, config: &Config) {
    let period = config.session_purge_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            match repo::purge_expired_sessions(&pool).await {
                Ok(0) => {}
                Ok(purged) => info!("Purged {} expired session(s)", purged),
                Err(e) => error!("Failed to purge expired sessions: {:#}", e),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let _log_guard = init_tracing(args.debug);

    let config = config::get_config(args);

    // Initialize the database pool
    let pool = Arc::new(db::init_pool(&config.database_url)
        .with_context(|| format!("Failed to open database at {}", config.database_url))?);

    {
        let mut conn = pool.get().context("Failed to get a database connection")?;
        bookmarket::run_migrations(&mut conn)?;
    }

    if config.seed_sample_data && seed::seed_sample_data(&pool).await? {
        info!("Sample data loaded, sign in as john@example.com / {}", seed::SAMPLE_PASSWORD);
    }

    spawn_session_purge(pool.clone(), &config);

    let state = AppState::new(pool).with_session_ttl(config.session_ttl());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build our application with routes
    let app = bookmarket::create_app_with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");

    Ok(())
}
