use crate::*;
use crate::models::{BookCondition, ExchangeStatus};
use proptest::prelude::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Utc};
use diesel::RunQueryDsl;
use diesel::sql_types::Text;
use diesel::QueryableByName;
use tower::ServiceExt;

#[derive(QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Tests the shared test database setup
///
/// This test verifies that:
/// 1. The test database can be created and connected to
/// 2. Every table created by the migrations exists and can be queried
/// 3. The router can serve a request against it
#[tokio::test]
async fn test_setup_test_db() {
    let pool = repo::tests::setup_test_db();
    assert!(pool.get().is_ok());

    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    let expected_tables = vec![
        "users", "sessions", "books", "reviews", "wishlist_items", "exchange_requests",
        "__diesel_schema_migrations" // Diesel's migration tracking table
    ];

    for table in expected_tables {
        let exists = table_names.iter().any(|t| t.name == table);
        assert!(exists, "Table '{}' not found in database", table);

        let query = format!("SELECT COUNT(*) FROM {}", table);
        let result = diesel::sql_query(&query).execute(&mut conn);
        assert!(result.is_ok(), "Failed to query table '{}': {:?}", table, result.err());
    }

    drop(conn);

    let app = create_app(pool.clone());

    let request = Request::builder()
        .uri("/books")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Response status is not OK (err: {:?})", axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap());
}

/// Generates an arbitrary DateTime<Utc> within 2020-01-01 to 2030-01-01
pub fn arb_datetime_utc() -> impl Strategy<Value = DateTime<Utc>> {
    (1_577_836_800i64..1_893_456_000i64)
        .prop_map(|ts| DateTime::from_timestamp(ts, 0).unwrap())
}

/// Generates text that is awkward to handle: empty, whitespace only,
/// surrounded by whitespace, or arbitrary printable unicode
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t\n]{1,5}",
        "[ \t]{0,3}[a-zA-Z0-9_@.%-]{1,20}[ \t]{0,3}",
        "\\PC{0,40}",
    ]
}

/// Generates a star rating in the accepted range
pub fn arb_rating() -> impl Strategy<Value = i32> {
    models::MIN_RATING..=models::MAX_RATING
}

/// Generates a rating outside the accepted range
pub fn arb_invalid_rating() -> impl Strategy<Value = i32> {
    prop_oneof![
        (-100i32..models::MIN_RATING),
        ((models::MAX_RATING + 1)..100i32),
    ]
}

/// Generates a valid price with at most two decimals, up to 100 000
///
/// Uses integer cents so the values survive a trip through SQLite's REAL
/// column unchanged.
pub fn arb_price() -> impl Strategy<Value = f64> {
    (0u32..=10_000_000u32).prop_map(|cents| cents as f64 / 100.0)
}

/// Generates an arbitrary BookCondition variant
pub fn arb_condition() -> impl Strategy<Value = BookCondition> {
    prop_oneof![
        Just(BookCondition::New),
        Just(BookCondition::LikeNew),
        Just(BookCondition::Good),
        Just(BookCondition::Fair),
        Just(BookCondition::Poor),
    ]
}

/// Generates an arbitrary ExchangeStatus variant
pub fn arb_exchange_status() -> impl Strategy<Value = ExchangeStatus> {
    prop_oneof![
        Just(ExchangeStatus::Pending),
        Just(ExchangeStatus::Accepted),
        Just(ExchangeStatus::Rejected),
        Just(ExchangeStatus::Completed),
    ]
}
