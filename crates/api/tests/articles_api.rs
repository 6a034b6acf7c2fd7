//! Capability-gated `/articles`.

mod common;

use axum::http::StatusCode;
use common::{delete, expect_json, get, patch_json, post_json, titles, TestApp};
use folio_api::policies::CAN_VIEW_ARTICLES;
use folio_db::models::user::CreateUser;
use serde_json::json;

#[tokio::test]
async fn test_anonymous_cannot_even_list() {
    let t = TestApp::new();

    let response = get(t.app(), "/api/v1/articles", None).await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_user_without_capability_is_forbidden() {
    let t = TestApp::new();
    let (_, member) = t.member("mia").await;

    let response = get(t.app(), "/api/v1/articles", Some(&member)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_editor_lifecycle() {
    let t = TestApp::new();
    let (editor_id, editor) = t.editor("eddie").await;

    let created = expect_json(
        post_json(
            t.app(),
            "/api/v1/articles",
            Some(&editor),
            json!({"title": "Launch", "content": "We are live"}),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["author"], editor_id);

    let uri = format!("/api/v1/articles/{}", created["id"]);
    let json = expect_json(
        patch_json(t.app(), &uri, Some(&editor), json!({"title": "Relaunch"})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["title"], "Relaunch");

    let list = expect_json(
        get(t.app(), "/api/v1/articles", Some(&editor)).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(titles(&list), vec!["Relaunch"]);

    assert_eq!(delete(t.app(), &uri, Some(&editor)).await.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_viewer_can_read_but_not_write() {
    let t = TestApp::new();
    let (_, editor) = t.editor("eddie").await;
    let (_, viewer) = t
        .user(CreateUser::new("val").with_capability(CAN_VIEW_ARTICLES))
        .await;
    let created = expect_json(
        post_json(
            t.app(),
            "/api/v1/articles",
            Some(&editor),
            json!({"title": "Launch", "content": "We are live"}),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let uri = format!("/api/v1/articles/{}", created["id"]);

    let json = expect_json(get(t.app(), &uri, Some(&viewer)).await, StatusCode::OK).await;
    assert_eq!(json["title"], "Launch");

    let response = post_json(
        t.app(),
        "/api/v1/articles",
        Some(&viewer),
        json!({"title": "Mine", "content": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(delete(t.app(), &uri, Some(&viewer)).await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_superuser_passes_every_capability() {
    let t = TestApp::new();
    let (_, root) = t.user(CreateUser::new("root").superuser()).await;

    let response = post_json(
        t.app(),
        "/api/v1/articles",
        Some(&root),
        json!({"title": "From root", "content": "x"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(t.app(), "/api/v1/articles", Some(&root)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_permission_is_checked_before_existence() {
    let t = TestApp::new();
    let (_, member) = t.member("mia").await;

    let response = get(t.app(), "/api/v1/articles/4242", Some(&member)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
