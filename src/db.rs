use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use diesel::connection::SimpleConnection;
use diesel::query_dsl::methods::ExecuteDsl;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::{Error as DieselError, QueryResult};
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// How many times a write is re-attempted after SQLite reports the database as busy
const MAX_WRITE_RETRIES: u32 = 5;

/// Back-off before the first retry; doubled on every following attempt
const RETRY_BASE_DELAY: Duration = Duration::from_millis(25);

diesel::define_sql_function! {
    /// Lowercases text using Unicode case mapping
    ///
    /// SQLite's own `lower` and `LIKE` only fold ASCII letters. Registered on
    /// every pooled connection by [`ConnectionOptions`].
    fn unicode_lower(text: Text) -> Text;
}

/// Per-connection settings applied whenever the pool hands out a connection
///
/// SQLite only enforces foreign keys when asked to, and it has to be asked on
/// every connection. Custom SQL functions such as [`unicode_lower`] are
/// per-connection as well.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionOptions {
    pub enable_foreign_keys: bool,
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            enable_foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        let mut pragmas = String::new();
        if self.enable_foreign_keys {
            pragmas.push_str("PRAGMA foreign_keys = ON;");
        }
        if let Some(timeout) = self.busy_timeout {
            pragmas.push_str(&format!("PRAGMA busy_timeout = {};", timeout.as_millis()));
        }
        conn.batch_execute(&pragmas)
            .map_err(diesel::r2d2::Error::QueryError)?;

        unicode_lower_utils::register_impl(conn, |text: String| text.to_lowercase())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Creates a connection pool for the given SQLite database URL
///
/// Every connection handed out by the pool has foreign keys enabled and a
/// busy timeout set, see [`ConnectionOptions`].
pub fn init_pool(database_url: &str) -> Result<DbPool> {
    debug!("Creating connection pool for {}", database_url);
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)?;
    Ok(pool)
}

/// Returns true if the error is SQLite refusing a write because another
/// connection holds the lock
fn is_busy_error(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => {
            let message = info.message();
            message.contains("database is locked")
                || message.contains("database table is locked")
                || message.contains("database is busy")
        }
        _ => false,
    }
}

/// Runs `f` inside an immediate transaction, retrying the whole transaction
/// with exponential back-off while SQLite reports the database as locked
///
/// `BEGIN IMMEDIATE` takes the write lock up front, so reads made inside `f`
/// cannot go stale before its writes land.
pub async fn transaction_with_retry<T, F>(conn: &mut SqliteConnection, f: F) -> QueryResult<T>
where
    F: Fn(&mut SqliteConnection) -> QueryResult<T>,
{
    let mut attempt = 0;
    loop {
        match conn.immediate_transaction(|conn| f(conn)) {
            Err(err) if is_busy_error(&err) && attempt < MAX_WRITE_RETRIES => {
                let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                attempt += 1;
                warn!("Database busy, retrying transaction in {:?} (attempt {})", delay, attempt);
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}

/// Executes a write statement, retrying with exponential back-off while
/// SQLite reports the database as locked
pub trait ExecuteWithRetry: Sized {
    fn execute_with_retry(self, conn: &mut SqliteConnection) -> impl Future<Output = QueryResult<usize>> + Send;
}

impl<T> ExecuteWithRetry for T
where
    T: ExecuteDsl<SqliteConnection> + Clone + Send,
{
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let mut attempt = 0;
        loop {
            match ExecuteDsl::execute(self.clone(), conn) {
                Err(err) if is_busy_error(&err) && attempt < MAX_WRITE_RETRIES => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(attempt);
                    attempt += 1;
                    warn!("Database busy, retrying write in {:?} (attempt {})", delay, attempt);
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }
}
