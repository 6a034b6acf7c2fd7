//! Authentication edge cases, malformed requests and store outages.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, expect_json, get, post_json, seed_catalog, TestApp};
use folio_api::auth::jwt::generate_access_token;
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_token_scheme_is_accepted() {
    let t = TestApp::new();
    let (_, token) = t.member("mia").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/authors")
        .header("authorization", format!("Token {token}"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"name":"Jane Doe"}"#))
        .unwrap();
    let response = t.app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unknown_scheme_is_401() {
    let t = TestApp::new();

    let request = Request::builder()
        .uri("/api/v1/books")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = t.app().oneshot(request).await.unwrap();
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_bad_token_is_401_even_on_open_reads() {
    let t = TestApp::new();

    let response = get(t.app(), "/api/v1/books", Some("not-a-jwt")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_for_deleted_or_unknown_user_is_401() {
    let t = TestApp::new();
    let token = generate_access_token(4242, &t.config.jwt).unwrap();

    let response = get(t.app(), "/api/v1/books", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_object_body_is_400() {
    let t = TestApp::new();
    let (_, token) = t.member("mia").await;

    let response = post_json(t.app(), "/api/v1/authors", Some(&token), json!(["Jane"])).await;
    let json = expect_json(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let t = TestApp::new();
    let (_, token) = t.member("mia").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/authors")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = t.app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_non_numeric_id_is_rejected() {
    let t = TestApp::new();

    let response = get(t.app(), "/api/v1/books/abc", None).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_trailing_slash_is_equivalent() {
    let t = TestApp::new();
    let catalog = seed_catalog(&t).await;

    let response = get(t.app(), "/api/v1/books/", None).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json.as_array().unwrap().len(), 4);

    let uri = format!("/api/v1/books/{}/", catalog.mysteries.id);
    let json = expect_json(get(t.app(), &uri, None).await, StatusCode::OK).await;
    assert_eq!(json["title"], "Mysteries of the Deep");
}

#[tokio::test]
async fn test_store_outage_is_503_without_details() {
    let t = TestApp::new();
    seed_catalog(&t).await;
    t.store.set_offline(true);

    let response = get(t.app(), "/api/v1/books", None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SERVICE_UNAVAILABLE");

    t.store.set_offline(false);
    let response = get(t.app(), "/api/v1/books", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let t = TestApp::new();

    let response = get(t.app(), "/api/v1/nothing-here", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
