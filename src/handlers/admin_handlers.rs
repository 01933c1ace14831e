use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{instrument, info};

use crate::auth::AdminUser;
use crate::db::DbPool;
use crate::dto::AdminStatsDto;
use crate::errors::ApiError;
use crate::models::{ExchangeRequest, User};
use crate::repo;

/// Handler for the admin dashboard numbers
///
/// This function handles GET requests to `/admin/stats`.
///
/// ### Returns
///
/// Book, user and review totals, the number of pending exchanges and the
/// combined price of all books for sale
#[instrument(skip(pool, admin), fields(admin_id = %admin.0.get_id()))]
pub async fn admin_stats_handler(
    // Extract the database pool from the application state
    State(pool): State<Arc<DbPool>>,
    // Only admins get past this extractor
    admin: AdminUser,
) -> Result<Json<AdminStatsDto>, ApiError> {
    let stats = repo::get_admin_stats(&pool).map_err(ApiError::Database)?;

    info!("Served admin stats");

    Ok(Json(stats))
}

/// Handler for listing every user
///
/// This function handles GET requests to `/admin/users`.
#[instrument(skip(pool, admin), fields(admin_id = %admin.0.get_id()))]
pub async fn admin_list_users_handler(
    State(pool): State<Arc<DbPool>>,
    admin: AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = repo::list_users(&pool).map_err(ApiError::Database)?;
    Ok(Json(users))
}

/// Handler for listing every exchange request
///
/// This function handles GET requests to `/admin/exchanges`.
#[instrument(skip(pool, admin), fields(admin_id = %admin.0.get_id()))]
pub async fn admin_list_exchanges_handler(
    State(pool): State<Arc<DbPool>>,
    admin: AdminUser,
) -> Result<Json<Vec<ExchangeRequest>>, ApiError> {
    let requests = repo::list_all_exchanges(&pool).map_err(ApiError::Database)?;
    Ok(Json(requests))
}
