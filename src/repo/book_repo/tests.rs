use super::*;
use crate::dto::BookQueryDtoBuilder;
use crate::repo::tests::{create_test_book, create_test_user, setup_test_db};
use crate::repo::create_review;
use std::time::Duration;

fn new_book(seller_id: &str, title: &str, author: &str, genre: &str) -> Book {
    Book::new(
        seller_id,
        title.to_string(),
        author.to_string(),
        "9780000000001".to_string(),
        genre.to_string(),
        BookCondition::LikeNew,
        12.5,
    )
}

#[tokio::test]
async fn test_create_and_get_book() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    let mut book = new_book(&seller.get_id(), "Dune", "Frank Herbert", "Science Fiction");
    book.set_images(ImageList(vec!["https://img/1.jpg".to_string()]));
    book.set_metadata(Some(1965), Some("English".to_string()), Some(412));
    let created = create_book(&pool, book).await.unwrap();

    let retrieved = get_book(&pool, &created.get_id()).unwrap().unwrap();
    assert_eq!(retrieved, created);
    assert_eq!(retrieved.get_images().cover(), Some("https://img/1.jpg"));
    assert_eq!(retrieved.get_condition(), BookCondition::LikeNew);
    assert_eq!(retrieved.get_page_count(), Some(412));
}

#[tokio::test]
async fn test_get_book_not_found() {
    let pool = setup_test_db();
    assert!(get_book(&pool, "nonexistent-id").unwrap().is_none());
}

#[tokio::test]
async fn test_create_book_unknown_seller_fails() {
    let pool = setup_test_db();
    let book = new_book("nonexistent-seller", "Dune", "Frank Herbert", "Science Fiction");
    assert!(create_book(&pool, book).await.is_err());
}

#[tokio::test]
async fn test_list_books_hides_unavailable() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    let visible = create_test_book(&pool, &seller, "Visible").await;
    let mut hidden = new_book(&seller.get_id(), "Hidden", "Someone", "Fiction");
    hidden.set_available(false);
    let hidden = create_book(&pool, hidden).await.unwrap();

    let books = list_books(&pool, &BookQueryDto::default()).unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].get_id(), visible.get_id());

    let query = BookQueryDtoBuilder::new().include_unavailable(true).build();
    let books = list_books(&pool, &query).unwrap();
    assert_eq!(books.len(), 2);
    assert!(books.iter().any(|b| b.get_id() == hidden.get_id()));
}

#[tokio::test]
async fn test_list_books_newest_first() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    let first = create_test_book(&pool, &seller, "First").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = create_test_book(&pool, &seller, "Second").await;

    let books = list_books(&pool, &BookQueryDto::default()).unwrap();
    assert_eq!(books[0].get_id(), second.get_id());
    assert_eq!(books[1].get_id(), first.get_id());
}

#[tokio::test]
async fn test_list_books_search_title_or_author_case_insensitive() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    let dune = create_book(&pool, new_book(&seller.get_id(), "Dune", "Frank Herbert", "Science Fiction")).await.unwrap();
    let hobbit = create_book(&pool, new_book(&seller.get_id(), "The Hobbit", "J.R.R. Tolkien", "Fantasy")).await.unwrap();

    let by_title = list_books(&pool, &BookQueryDtoBuilder::new().search("dUNe").build()).unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].get_id(), dune.get_id());

    let by_author = list_books(&pool, &BookQueryDtoBuilder::new().search("tolkien").build()).unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].get_id(), hobbit.get_id());

    let blank = list_books(&pool, &BookQueryDtoBuilder::new().search("   ").build()).unwrap();
    assert_eq!(blank.len(), 2);
}

#[tokio::test]
async fn test_list_books_search_folds_non_ascii_case() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    let emile = create_book(&pool, new_book(&seller.get_id(), "Émile ou De l'éducation", "Jean-Jacques Rousseau", "Philosophy")).await.unwrap();
    let war = create_book(&pool, new_book(&seller.get_id(), "Война и мир", "Лев Толстой", "Fiction")).await.unwrap();

    for q in ["émile", "ÉMILE", "Émile"] {
        let result = list_books(&pool, &BookQueryDtoBuilder::new().search(q).build()).unwrap();
        assert_eq!(result.len(), 1, "search {q:?}");
        assert_eq!(result[0].get_id(), emile.get_id());
    }

    let by_title = list_books(&pool, &BookQueryDtoBuilder::new().search("война").build()).unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].get_id(), war.get_id());

    let by_author = list_books(&pool, &BookQueryDtoBuilder::new().search("ТОЛСТОЙ").build()).unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].get_id(), war.get_id());
}

#[tokio::test]
async fn test_list_books_search_treats_wildcards_literally() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    create_book(&pool, new_book(&seller.get_id(), "100% Fun", "A", "Humor")).await.unwrap();
    create_book(&pool, new_book(&seller.get_id(), "100 Ways", "B", "Humor")).await.unwrap();

    let result = list_books(&pool, &BookQueryDtoBuilder::new().search("100%").build()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].get_title(), "100% Fun");

    let result = list_books(&pool, &BookQueryDtoBuilder::new().search("_").build()).unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_list_books_by_genre_listing_and_seller() {
    let pool = setup_test_db();
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;

    let mut sale_only = new_book(&alice.get_id(), "Sale", "A", "Fantasy");
    sale_only.set_for_exchange(false);
    let sale_only = create_book(&pool, sale_only).await.unwrap();

    let mut exchange_only = new_book(&bob.get_id(), "Exchange", "B", "Fantasy");
    exchange_only.set_for_sale(false);
    exchange_only.set_for_exchange(true);
    let exchange_only = create_book(&pool, exchange_only).await.unwrap();

    let other_genre = create_book(&pool, new_book(&bob.get_id(), "Other", "C", "Horror")).await.unwrap();

    let fantasy = list_books(&pool, &BookQueryDtoBuilder::new().genre("Fantasy").build()).unwrap();
    assert_eq!(fantasy.len(), 2);
    assert!(fantasy.iter().all(|b| b.get_genre() == "Fantasy"));

    let for_sale = list_books(&pool, &BookQueryDtoBuilder::new().listing(ListingKind::Sale).build()).unwrap();
    assert!(for_sale.iter().any(|b| b.get_id() == sale_only.get_id()));
    assert!(for_sale.iter().any(|b| b.get_id() == other_genre.get_id()));
    assert!(!for_sale.iter().any(|b| b.get_id() == exchange_only.get_id()));

    let for_exchange = list_books(&pool, &BookQueryDtoBuilder::new().listing(ListingKind::Exchange).build()).unwrap();
    assert_eq!(for_exchange.len(), 1);
    assert_eq!(for_exchange[0].get_id(), exchange_only.get_id());

    let bobs = list_books(&pool, &BookQueryDtoBuilder::new().seller_id(bob.get_id()).build()).unwrap();
    assert_eq!(bobs.len(), 2);
    assert!(bobs.iter().all(|b| b.is_listed_by(&bob.get_id())));
}

#[tokio::test]
async fn test_update_book_partial() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;
    let book = create_test_book(&pool, &seller, "Original").await;

    let update = UpdateBookDto {
        title: Some("Renamed".to_string()),
        price: Some(3.25),
        condition: Some(BookCondition::Fair),
        images: Some(vec!["a.jpg".to_string(), "b.jpg".to_string()]),
        ..Default::default()
    };
    let updated = update_book(&pool, &book.get_id(), update).await.unwrap();

    assert_eq!(updated.get_title(), "Renamed");
    assert_eq!(updated.get_price(), 3.25);
    assert_eq!(updated.get_condition(), BookCondition::Fair);
    assert_eq!(updated.get_images().0.len(), 2);
    // Untouched fields keep their values
    assert_eq!(updated.get_author(), book.get_author());
    assert_eq!(updated.get_genre(), book.get_genre());
    assert!(updated.get_updated_at() >= book.get_updated_at());
    assert_eq!(updated.get_created_at(), book.get_created_at());
}

#[tokio::test]
async fn test_update_book_not_found() {
    let pool = setup_test_db();
    let result = update_book(&pool, "nonexistent-id", UpdateBookDto::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete_book() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;
    let book = create_test_book(&pool, &seller, "Doomed").await;

    assert_eq!(delete_book(&pool, &book.get_id()).await.unwrap(), 1);
    assert!(get_book(&pool, &book.get_id()).unwrap().is_none());
    assert!(list_books(&pool, &BookQueryDto::default()).unwrap().is_empty());

    assert_eq!(delete_book(&pool, &book.get_id()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_book_removes_its_reviews() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;
    let reader = create_test_user(&pool, "reader").await;
    let doomed = create_test_book(&pool, &seller, "Doomed").await;
    let kept = create_test_book(&pool, &seller, "Kept").await;

    create_review(&pool, &reader.get_id(), &doomed.get_id(), 4, "Fine".to_string()).await.unwrap();
    create_review(&pool, &reader.get_id(), &kept.get_id(), 5, "Great".to_string()).await.unwrap();

    delete_book(&pool, &doomed.get_id()).await.unwrap();

    let conn = &mut pool.get().unwrap();
    let remaining: Vec<String> = reviews::table
        .select(reviews::book_id)
        .load(conn)
        .unwrap();
    assert_eq!(remaining, vec![kept.get_id()]);
}

#[tokio::test]
async fn test_list_genres_distinct_sorted() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;

    create_book(&pool, new_book(&seller.get_id(), "A", "A", "Horror")).await.unwrap();
    create_book(&pool, new_book(&seller.get_id(), "B", "B", "Fantasy")).await.unwrap();
    create_book(&pool, new_book(&seller.get_id(), "C", "C", "Horror")).await.unwrap();
    let mut hidden = new_book(&seller.get_id(), "D", "D", "Romance");
    hidden.set_available(false);
    create_book(&pool, hidden).await.unwrap();

    let genres = list_genres(&pool).unwrap();
    assert_eq!(genres, vec!["Fantasy".to_string(), "Horror".to_string()]);
}

#[tokio::test]
async fn test_rating_summary() {
    let pool = setup_test_db();
    let seller = create_test_user(&pool, "seller").await;
    let reader1 = create_test_user(&pool, "reader1").await;
    let reader2 = create_test_user(&pool, "reader2").await;
    let book = create_test_book(&pool, &seller, "Rated").await;

    let empty = get_rating_summary(&pool, &book.get_id()).unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.average, 0.0);

    create_review(&pool, &reader1.get_id(), &book.get_id(), 5, "Great".to_string()).await.unwrap();
    create_review(&pool, &reader2.get_id(), &book.get_id(), 2, "Meh".to_string()).await.unwrap();

    let summary = get_rating_summary(&pool, &book.get_id()).unwrap();
    assert_eq!(summary.book_id, book.get_id());
    assert_eq!(summary.count, 2);
    assert!((summary.average - 3.5).abs() < f64::EPSILON);
}

#[test]
fn test_escape_like() {
    assert_eq!(escape_like("plain"), "plain");
    assert_eq!(escape_like("100%"), "100\\%");
    assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
}
