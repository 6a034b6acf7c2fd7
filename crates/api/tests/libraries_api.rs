//! Role-gated `/libraries` endpoints and shelving.

mod common;

use axum::http::StatusCode;
use common::{delete, expect_json, get, patch_json, post_json, seed_catalog, titles, TestApp};
use folio_core::roles::Role;
use folio_db::models::user::CreateUser;
use serde_json::{json, Value};

async fn create_library(t: &TestApp, token: &str, name: &str) -> Value {
    let response = post_json(
        t.app(),
        "/api/v1/libraries",
        Some(token),
        json!({"name": name}),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await
}

#[tokio::test]
async fn test_librarian_and_admin_can_create() {
    let t = TestApp::new();
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    let (_, admin) = t.with_role("ada", Role::Admin).await;

    let json = create_library(&t, &librarian, "Central").await;
    assert_eq!(json["name"], "Central");
    assert_eq!(json["books"], json!([]));

    create_library(&t, &admin, "Branch").await;

    let list = expect_json(get(t.app(), "/api/v1/libraries", None).await, StatusCode::OK).await;
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Branch", "Central"]);
}

#[tokio::test]
async fn test_member_cannot_create() {
    let t = TestApp::new();
    let (_, member) = t.member("mia").await;

    let response = post_json(
        t.app(),
        "/api/v1/libraries",
        Some(&member),
        json!({"name": "Mine"}),
    )
    .await;
    let json = expect_json(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_user_without_role_is_forbidden_not_500() {
    let t = TestApp::new();
    let (_, bare) = t.user(CreateUser::new("nobody")).await;

    let response = post_json(t.app(), "/api/v1/libraries", Some(&bare), json!({"name": "X"})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_anonymous_write_is_401() {
    let t = TestApp::new();

    let response = post_json(t.app(), "/api/v1/libraries", None, json!({"name": "X"})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_library_name() {
    let t = TestApp::new();
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    create_library(&t, &librarian, "Central").await;

    let response = post_json(
        t.app(),
        "/api/v1/libraries",
        Some(&librarian),
        json!({"name": "Central"}),
    )
    .await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["fields"]["name"][0], "library with this name already exists.");
}

#[tokio::test]
async fn test_rename_library() {
    let t = TestApp::new();
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    let library = create_library(&t, &librarian, "Central").await;
    let uri = format!("/api/v1/libraries/{}", library["id"]);

    let json = expect_json(
        patch_json(t.app(), &uri, Some(&librarian), json!({"name": "Main"})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["name"], "Main");
}

#[tokio::test]
async fn test_shelve_and_unshelve_books() {
    let t = TestApp::new();
    let catalog = seed_catalog(&t).await;
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    let library = create_library(&t, &librarian, "Central").await;
    let id = &library["id"];

    let uri = format!("/api/v1/libraries/{id}/books/{}", catalog.mysteries.id);
    let json = expect_json(
        post_json(t.app(), &uri, Some(&librarian), json!({})).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["books"], json!([catalog.mysteries.id]));

    // Shelving again changes nothing.
    let json = expect_json(
        post_json(t.app(), &uri, Some(&librarian), json!({})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["books"], json!([catalog.mysteries.id]));

    let other = format!("/api/v1/libraries/{id}/books/{}", catalog.adventures.id);
    post_json(t.app(), &other, Some(&librarian), json!({})).await;

    let books = expect_json(
        get(t.app(), &format!("/api/v1/libraries/{id}/books"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(titles(&books), vec!["Adventures in the North", "Mysteries of the Deep"]);

    assert_eq!(delete(t.app(), &uri, Some(&librarian)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete(t.app(), &uri, Some(&librarian)).await.status(), StatusCode::NOT_FOUND);

    let json = expect_json(
        get(t.app(), &format!("/api/v1/libraries/{id}"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["books"], json!([catalog.adventures.id]));
}

#[tokio::test]
async fn test_shelving_requires_role() {
    let t = TestApp::new();
    let catalog = seed_catalog(&t).await;
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    let (_, member) = t.member("mia").await;
    let library = create_library(&t, &librarian, "Central").await;

    let uri = format!("/api/v1/libraries/{}/books/{}", library["id"], catalog.mysteries.id);
    let response = post_json(t.app(), &uri, Some(&member), json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = post_json(t.app(), &uri, None, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_shelving_unknown_book_or_library_is_404() {
    let t = TestApp::new();
    let catalog = seed_catalog(&t).await;
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    let library = create_library(&t, &librarian, "Central").await;

    let uri = format!("/api/v1/libraries/{}/books/9999", library["id"]);
    assert_eq!(
        post_json(t.app(), &uri, Some(&librarian), json!({})).await.status(),
        StatusCode::NOT_FOUND
    );

    let uri = format!("/api/v1/libraries/9999/books/{}", catalog.mysteries.id);
    assert_eq!(
        post_json(t.app(), &uri, Some(&librarian), json!({})).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_deleting_book_removes_it_from_shelves() {
    let t = TestApp::new();
    let catalog = seed_catalog(&t).await;
    let (_, librarian) = t.with_role("lena", Role::Librarian).await;
    let library = create_library(&t, &librarian, "Central").await;
    let id = &library["id"];
    let uri = format!("/api/v1/libraries/{id}/books/{}", catalog.mysteries.id);
    post_json(t.app(), &uri, Some(&librarian), json!({})).await;

    let book_uri = format!("/api/v1/books/{}", catalog.mysteries.id);
    assert_eq!(
        delete(t.app(), &book_uri, Some(&librarian)).await.status(),
        StatusCode::NO_CONTENT
    );

    let json = expect_json(
        get(t.app(), &format!("/api/v1/libraries/{id}"), None).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["books"], json!([]));
}
