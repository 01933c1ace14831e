use super::*;
use serde_json::json;

fn signup(username: &str, email: &str, password: &str) -> SignupDto {
    SignupDto {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn create_book_dto() -> CreateBookDto {
    serde_json::from_value(json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": "9780441013593",
        "genre": "Science Fiction",
        "condition": "good",
        "price": 9.5
    }))
    .unwrap()
}

#[test]
fn test_signup_validate_accepts_valid_input() {
    assert!(signup("reader", "reader@example.com", "secret1").validate().is_ok());
}

#[test]
fn test_signup_validate_username_bounds() {
    assert!(signup("ab", "a@b.c", "secret1").validate().is_err());
    assert!(signup("abc", "a@b.c", "secret1").validate().is_ok());
    assert!(signup(&"x".repeat(50), "a@b.c", "secret1").validate().is_ok());
    assert!(signup(&"x".repeat(51), "a@b.c", "secret1").validate().is_err());
}

#[test]
fn test_signup_validate_email() {
    assert!(signup("reader", "no-at-sign", "secret1").validate().is_err());
    assert!(signup("reader", "@example.com", "secret1").validate().is_err());
    assert!(signup("reader", "reader@", "secret1").validate().is_err());
}

#[test]
fn test_signup_validate_password_length() {
    let err = signup("reader", "reader@example.com", "12345").validate().unwrap_err();
    assert!(err.contains("at least 6"));
}

#[test]
fn test_create_book_dto_defaults() {
    let dto = create_book_dto();
    assert_eq!(dto.condition, BookCondition::Good);
    assert_eq!(dto.description, "");
    assert!(dto.images.is_empty());
    assert!(dto.for_sale.is_none());
    assert!(dto.for_exchange.is_none());
    assert!(dto.page_count.is_none());
    assert!(dto.validate().is_ok());
}

#[test]
fn test_create_book_dto_rejects_blank_title() {
    let mut dto = create_book_dto();
    dto.title = "   ".to_string();
    let err = dto.validate().unwrap_err();
    assert!(err.contains("Title"));
}

#[test]
fn test_create_book_dto_rejects_negative_price() {
    let mut dto = create_book_dto();
    dto.price = -1.0;
    assert!(dto.validate().is_err());

    dto.price = f64::NAN;
    assert!(dto.validate().is_err());

    dto.price = 0.0;
    assert!(dto.validate().is_ok());
}

#[test]
fn test_create_book_dto_requires_a_listing_kind() {
    let mut dto = create_book_dto();
    dto.for_sale = Some(false);
    dto.for_exchange = Some(false);
    assert!(dto.validate().is_err());

    dto.for_exchange = Some(true);
    assert!(dto.validate().is_ok());
}

#[test]
fn test_create_book_dto_rejects_unknown_condition() {
    let result = serde_json::from_value::<CreateBookDto>(json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": "9780441013593",
        "genre": "Science Fiction",
        "condition": "mint",
        "price": 9.5
    }));
    assert!(result.is_err());
}

#[test]
fn test_update_book_dto_empty() {
    let dto: UpdateBookDto = serde_json::from_value(json!({})).unwrap();
    assert!(dto.is_empty());
    assert!(dto.validate().is_ok());

    let dto: UpdateBookDto = serde_json::from_value(json!({"is_available": false})).unwrap();
    assert!(!dto.is_empty());
}

#[test]
fn test_update_book_dto_validates_present_fields() {
    let dto = UpdateBookDto {
        author: Some("".to_string()),
        ..Default::default()
    };
    assert!(dto.validate().is_err());

    let dto = UpdateBookDto {
        price: Some(-3.0),
        ..Default::default()
    };
    assert!(dto.validate().is_err());

    let dto = UpdateBookDto {
        page_count: Some(0),
        ..Default::default()
    };
    assert!(dto.validate().is_err());
}

#[test]
fn test_update_book_dto_skips_absent_fields() {
    let dto = UpdateBookDto {
        price: Some(5.0),
        ..Default::default()
    };
    let value = serde_json::to_value(&dto).unwrap();
    assert_eq!(value, json!({"price": 5.0}));
}

#[test]
fn test_book_query_dto_default() {
    let dto = BookQueryDto::default();
    assert!(dto.q.is_none());
    assert!(dto.genre.is_none());
    assert_eq!(dto.listing, ListingKind::All);
    assert!(dto.seller_id.is_none());
    assert!(!dto.include_unavailable);
}

#[test]
fn test_book_query_dto_from_query_string() {
    let dto: BookQueryDto = serde_html_form::from_str("q=dune&listing=exchange&include_unavailable=true").unwrap();
    assert_eq!(dto.q.as_deref(), Some("dune"));
    assert_eq!(dto.listing, ListingKind::Exchange);
    assert!(dto.include_unavailable);
}

#[test]
fn test_book_query_dto_display() {
    let dto = BookQueryDtoBuilder::new()
        .genre("Fantasy")
        .listing(ListingKind::Sale)
        .build();
    let display = format!("{}", dto);
    assert!(display.contains("genre: Some(\"Fantasy\")"));
    assert!(display.contains("listing: sale"));
    assert!(display.contains("q: None"));
}

#[test]
fn test_rating_summary_from_ratings() {
    let summary = RatingSummaryDto::from_ratings("book-1".to_string(), &[5, 4, 3]);
    assert_eq!(summary.count, 3);
    assert!((summary.average - 4.0).abs() < f64::EPSILON);

    let empty = RatingSummaryDto::from_ratings("book-1".to_string(), &[]);
    assert_eq!(empty.count, 0);
    assert_eq!(empty.average, 0.0);
}

#[test]
fn test_update_exchange_status_dto_parses_lowercase() {
    let dto: UpdateExchangeStatusDto = serde_json::from_value(json!({"status": "accepted"})).unwrap();
    assert_eq!(dto.status, ExchangeStatus::Accepted);

    assert!(serde_json::from_value::<UpdateExchangeStatusDto>(json!({"status": "cancelled"})).is_err());
}

#[test]
fn test_create_exchange_dto_message_optional() {
    let dto: CreateExchangeDto = serde_json::from_value(json!({
        "requested_book_id": "a",
        "offered_book_id": "b"
    }))
    .unwrap();
    assert!(dto.message.is_none());
}
