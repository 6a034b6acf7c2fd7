//! HTTP-level tests for the `/books` and `/authors` endpoints: open reads,
//! authenticated writes, filtering, search, ordering and validation.

mod common;

use axum::http::StatusCode;
use chrono::Datelike;
use common::{
    body_json, delete, expect_json, get, patch_json, post_json, put_json, seed_catalog, titles,
    TestApp,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// List, filter, search, ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_list_books_anonymous_returns_all() {
    let t = TestApp::new();
    seed_catalog(&t).await;

    let json = expect_json(get(t.app(), "/api/v1/books", None).await, StatusCode::OK).await;
    assert_eq!(json.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_list_books_default_order_is_title() {
    let t = TestApp::new();
    seed_catalog(&t).await;
    let (_, token) = t.member("reader").await;

    let json = expect_json(get(t.app(), "/api/v1/books", Some(&token)).await, StatusCode::OK).await;
    assert_eq!(
        titles(&json),
        vec![
            "Adventures in the North",
            "Another Journey",
            "Mysteries of the Deep",
            "The First Journey",
        ]
    );
}

#[tokio::test]
async fn test_filter_by_publication_year() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?publication_year=2020", None).await,
        StatusCode::OK,
    )
    .await;
    let found = titles(&json);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&c.first_journey.title));
    assert!(found.contains(&c.another_journey.title));
}

#[tokio::test]
async fn test_filter_by_author_name() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?author__name=Jane%20Doe", None).await,
        StatusCode::OK,
    )
    .await;
    let found = titles(&json);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&c.first_journey.title));
    assert!(found.contains(&c.adventures.title));
}

#[tokio::test]
async fn test_filters_combine_with_and() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let uri = format!("/api/v1/books?publication_year=2020&author={}", c.john.id);
    let json = expect_json(get(t.app(), &uri, None).await, StatusCode::OK).await;
    assert_eq!(titles(&json), vec![c.another_journey.title.clone()]);
}

#[tokio::test]
async fn test_non_numeric_integer_filter_is_400() {
    let t = TestApp::new();
    seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?publication_year=soon", None).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["fields"]["publication_year"].is_array());
}

#[tokio::test]
async fn test_search_matches_title() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?search=Journey", None).await,
        StatusCode::OK,
    )
    .await;
    let found = titles(&json);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&c.first_journey.title));
    assert!(found.contains(&c.another_journey.title));
}

#[tokio::test]
async fn test_search_matches_author_name_case_insensitively() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?search=smith", None).await,
        StatusCode::OK,
    )
    .await;
    let found = titles(&json);
    assert_eq!(found.len(), 2);
    assert!(found.contains(&c.mysteries.title));
    assert!(found.contains(&c.another_journey.title));
}

#[tokio::test]
async fn test_order_by_publication_year_descending() {
    let t = TestApp::new();
    seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?ordering=-publication_year", None).await,
        StatusCode::OK,
    )
    .await;
    let years: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["publication_year"].as_i64().unwrap())
        .collect();
    assert_eq!(years, vec![2022, 2021, 2020, 2020]);
}

#[tokio::test]
async fn test_unknown_ordering_field_falls_back_to_default() {
    let t = TestApp::new();
    seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/books?ordering=isbn", None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(titles(&json)[0], "Adventures in the North");
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_book_authenticated_returns_201() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;

    let response = post_json(
        t.app(),
        "/api/v1/books/create",
        Some(&token),
        json!({"title": "New Book Title", "publication_year": 2023, "author": c.jane.id}),
    )
    .await;
    let json = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(json["title"], "New Book Title");
    assert_eq!(json["author"], c.jane.id);
    assert!(json["id"].is_number());
    assert!(json.get("author_name").is_none());
    assert_eq!(t.book_count().await, 5);
}

#[tokio::test]
async fn test_create_book_anonymous_returns_401() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let response = post_json(
        t.app(),
        "/api/v1/books",
        None,
        json!({"title": "Unauthorized Book", "publication_year": 2023, "author": c.jane.id}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(t.book_count().await, 4);
}

#[tokio::test]
async fn test_create_book_with_future_year_returns_400() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;
    let next_year = chrono::Utc::now().year() + 1;

    let response = post_json(
        t.app(),
        "/api/v1/books",
        Some(&token),
        json!({"title": "Future Book", "publication_year": next_year, "author": c.jane.id}),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["fields"]["publication_year"][0],
        "Publication year cannot be in the future."
    );
    assert_eq!(t.book_count().await, 4);
}

#[tokio::test]
async fn test_create_book_with_unknown_author_returns_400() {
    let t = TestApp::new();
    seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;

    let response = post_json(
        t.app(),
        "/api/v1/books",
        Some(&token),
        json!({"title": "Book with Invalid Author", "publication_year": 2023, "author": 9999}),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"]["author"][0], "Invalid pk \"9999\" - object does not exist.");
    assert_eq!(t.book_count().await, 4);
}

#[tokio::test]
async fn test_create_book_missing_fields_reports_each() {
    let t = TestApp::new();
    let (_, token) = t.member("writer").await;

    let response = post_json(t.app(), "/api/v1/books", Some(&token), json!({"title": "  "})).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"]["title"][0], "This field may not be blank.");
    assert_eq!(json["fields"]["publication_year"][0], "This field is required.");
    assert_eq!(json["fields"]["author"][0], "This field is required.");
}

#[tokio::test]
async fn test_duplicate_title_for_author_returns_non_field_error() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;

    let response = post_json(
        t.app(),
        "/api/v1/books",
        Some(&token),
        json!({"title": "The First Journey", "publication_year": 2019, "author": c.jane.id}),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert!(json["fields"]["non_field_errors"].is_array());
}

// ---------------------------------------------------------------------------
// Retrieve, update, delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_retrieve_book_anonymous() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let uri = format!("/api/v1/books/{}", c.mysteries.id);
    let json = expect_json(get(t.app(), &uri, None).await, StatusCode::OK).await;
    assert_eq!(json["title"], "Mysteries of the Deep");
    assert_eq!(json["publication_year"], 2021);
    assert_eq!(json["author"], c.john.id);
}

#[tokio::test]
async fn test_retrieve_missing_book_returns_404() {
    let t = TestApp::new();
    seed_catalog(&t).await;

    let response = get(t.app(), "/api/v1/books/99999", None).await;
    let json = expect_json(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_put_replaces_book() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;

    let uri = format!("/api/v1/books/{}/update", c.first_journey.id);
    let response = put_json(
        t.app(),
        &uri,
        Some(&token),
        json!({"title": "The Second Journey", "publication_year": 2021, "author": c.john.id}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["title"], "The Second Journey");
    assert_eq!(json["author"], c.john.id);
}

#[tokio::test]
async fn test_put_requires_every_field() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;

    let uri = format!("/api/v1/books/{}", c.first_journey.id);
    let response = put_json(t.app(), &uri, Some(&token), json!({"title": "Only Title"})).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert!(json["fields"]["publication_year"].is_array());
}

#[tokio::test]
async fn test_patch_changes_only_supplied_fields() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;

    let uri = format!("/api/v1/books/{}", c.adventures.id);
    let response = patch_json(t.app(), &uri, Some(&token), json!({"publication_year": 2018})).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["publication_year"], 2018);
    assert_eq!(json["title"], "Adventures in the North");
    assert_eq!(json["author"], c.jane.id);
}

#[tokio::test]
async fn test_update_anonymous_returns_401() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let uri = format!("/api/v1/books/{}", c.adventures.id);
    let response = patch_json(t.app(), &uri, None, json!({"title": "Nope"})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_with_future_year_returns_400_and_keeps_book() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;
    let next_year = chrono::Utc::now().year() + 1;
    let id = c.first_journey.id;

    let replace = json!({
        "title": "The First Journey",
        "publication_year": next_year,
        "author": c.jane.id,
    });
    let responses = [
        put_json(t.app(), &format!("/api/v1/books/{id}"), Some(&token), replace.clone()).await,
        put_json(t.app(), &format!("/api/v1/books/{id}/update"), Some(&token), replace).await,
        patch_json(
            t.app(),
            &format!("/api/v1/books/{id}"),
            Some(&token),
            json!({"publication_year": next_year}),
        )
        .await,
        patch_json(
            t.app(),
            &format!("/api/v1/books/{id}/update"),
            Some(&token),
            json!({"publication_year": next_year}),
        )
        .await,
    ];
    for response in responses {
        let json = expect_json(response, StatusCode::BAD_REQUEST).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(
            json["fields"]["publication_year"][0],
            "Publication year cannot be in the future."
        );
    }

    let uri = format!("/api/v1/books/{id}");
    let json = expect_json(get(t.app(), &uri, None).await, StatusCode::OK).await;
    assert_eq!(json["publication_year"], 2020);
    assert_eq!(json["title"], "The First Journey");
}

#[tokio::test]
async fn test_year_outside_integer_range_returns_400() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;

    let response = post_json(
        t.app(),
        "/api/v1/books",
        Some(&token),
        json!({"title": "Ancient", "publication_year": -3_000_000_000_i64, "author": c.jane.id}),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["fields"]["publication_year"][0],
        "Ensure this value is greater than or equal to -2147483648."
    );
    assert_eq!(t.book_count().await, 4);

    let uri = format!("/api/v1/books/{}", c.mysteries.id);
    let response = patch_json(
        t.app(),
        &uri,
        Some(&token),
        json!({"publication_year": -3_000_000_000_i64}),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert!(json["fields"]["publication_year"].is_array());

    let json = expect_json(get(t.app(), &uri, None).await, StatusCode::OK).await;
    assert_eq!(json["publication_year"], 2021);
}

#[tokio::test]
async fn test_delete_book() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;

    let uri = format!("/api/v1/books/{}/delete", c.mysteries.id);
    let response = delete(t.app(), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(t.book_count().await, 3);

    let response = get(t.app(), &format!("/api/v1/books/{}", c.mysteries.id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_anonymous_and_missing() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("editor").await;

    let uri = format!("/api/v1/books/{}", c.mysteries.id);
    assert_eq!(delete(t.app(), &uri, None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        delete(t.app(), "/api/v1/books/99999", Some(&token)).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(t.book_count().await, 4);
}

#[tokio::test]
async fn test_created_book_round_trips_through_retrieve() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;

    let created = body_json(
        post_json(
            t.app(),
            "/api/v1/books",
            Some(&token),
            json!({"title": "Round Trip", "publication_year": 1999, "author": c.john.id}),
        )
        .await,
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let fetched = body_json(get(t.app(), &format!("/api/v1/books/{id}"), None).await).await;
    assert_eq!(created, fetched);
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_author_nests_books() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;

    let uri = format!("/api/v1/authors/{}", c.jane.id);
    let json = expect_json(get(t.app(), &uri, None).await, StatusCode::OK).await;
    assert_eq!(json["name"], "Jane Doe");
    let books = json["books"].as_array().unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0]["author"], c.jane.id);
}

#[tokio::test]
async fn test_author_books_are_read_only() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;

    let uri = format!("/api/v1/authors/{}", c.john.id);
    let response = put_json(
        t.app(),
        &uri,
        Some(&token),
        json!({"name": "J. Smith", "books": []}),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["name"], "J. Smith");
    assert_eq!(json["books"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_deleting_author_removes_books() {
    let t = TestApp::new();
    let c = seed_catalog(&t).await;
    let (_, token) = t.member("writer").await;

    let uri = format!("/api/v1/authors/{}", c.jane.id);
    assert_eq!(delete(t.app(), &uri, Some(&token)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(t.book_count().await, 2);
}

#[tokio::test]
async fn test_search_authors_by_name() {
    let t = TestApp::new();
    seed_catalog(&t).await;

    let json = expect_json(
        get(t.app(), "/api/v1/authors?search=jane", None).await,
        StatusCode::OK,
    )
    .await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Jane Doe"]);
}
