use crate::db::DbPool;
use crate::dto::AdminStatsDto;
use crate::models::ExchangeStatus;
use crate::schema::books;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{instrument, debug};

use super::exchange_repo::count_exchanges_with_status;
use super::review_repo::count_reviews;
use super::user_repo::count_users;

/// Collects the numbers shown on the admin dashboard
///
/// The listing value is the sum of the prices of all available books
/// offered for sale.
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - Any of the underlying queries fails
#[instrument(skip(pool))]
pub fn get_admin_stats(pool: &DbPool) -> Result<AdminStatsDto> {
    let (total_books, prices) = {
        let conn = &mut pool.get()?;

        let total_books = books::table.count().get_result::<i64>(conn)?;

        let prices = books::table
            .filter(books::is_available.eq(true))
            .filter(books::for_sale.eq(true))
            .select(books::price)
            .load::<f64>(conn)?;

        (total_books, prices)
    };

    let stats = AdminStatsDto {
        total_books,
        total_users: count_users(pool)?,
        total_reviews: count_reviews(pool)?,
        pending_exchanges: count_exchanges_with_status(pool, ExchangeStatus::Pending)?,
        total_listing_value: prices.iter().sum(),
    };

    debug!("Admin stats: {:?}", stats);

    Ok(stats)
}
