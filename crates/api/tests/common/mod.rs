#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use folio_core::roles::Role;
use folio_core::types::DbId;
use folio_db::models::author::{Author, CreateAuthor};
use folio_db::models::book::{Book, CreateBook};
use folio_db::models::user::CreateUser;
use folio_db::{Directory, MemoryStore, Repository};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use folio_api::auth::jwt::{generate_access_token, JwtConfig};
use folio_api::config::ServerConfig;
use folio_api::policies::{
    default_policies, CAN_CREATE_ARTICLES, CAN_DELETE_ARTICLES, CAN_EDIT_ARTICLES,
    CAN_VIEW_ARTICLES,
};
use folio_api::router::{build_app_router, App};
use folio_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        db_max_connections: 1,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// A running application over a fresh in-memory store.
///
/// The store is shared with the router, so fixtures created through it are
/// visible to requests and request side effects can be inspected directly.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config: test_config(),
        }
    }

    /// Build the full router (same middleware stack as production).
    pub fn app(&self) -> App {
        let state = AppState {
            store: self.store.clone(),
            policies: Arc::new(default_policies()),
            config: Arc::new(self.config.clone()),
        };
        build_app_router(state, &self.config)
    }

    /// Create a user and return `(id, bearer token)`.
    pub async fn user(&self, input: CreateUser) -> (DbId, String) {
        let user = self.store.create_user(input).await.unwrap();
        let token = generate_access_token(user.id, &self.config.jwt).unwrap();
        (user.id, token)
    }

    pub async fn member(&self, username: &str) -> (DbId, String) {
        self.user(CreateUser::new(username).with_role(Role::Member)).await
    }

    pub async fn with_role(&self, username: &str, role: Role) -> (DbId, String) {
        self.user(CreateUser::new(username).with_role(role)).await
    }

    /// A user holding every `articles.*` capability.
    pub async fn editor(&self, username: &str) -> (DbId, String) {
        self.user(
            CreateUser::new(username)
                .with_capability(CAN_VIEW_ARTICLES)
                .with_capability(CAN_CREATE_ARTICLES)
                .with_capability(CAN_EDIT_ARTICLES)
                .with_capability(CAN_DELETE_ARTICLES),
        )
        .await
    }

    pub async fn author(&self, name: &str) -> Author {
        Repository::<Author>::create(self.store.as_ref(), CreateAuthor { name: name.into() })
            .await
            .unwrap()
    }

    pub async fn book(&self, title: &str, publication_year: i32, author_id: DbId) -> Book {
        Repository::<Book>::create(
            self.store.as_ref(),
            CreateBook {
                title: title.into(),
                publication_year,
                author_id,
            },
        )
        .await
        .unwrap()
    }

    pub async fn book_count(&self) -> usize {
        Repository::<Book>::list(self.store.as_ref(), folio_db::Scope::All)
            .await
            .unwrap()
            .len()
    }
}

/// Two authors and four books used across the book tests.
pub struct Catalog {
    pub jane: Author,
    pub john: Author,
    pub first_journey: Book,
    pub adventures: Book,
    pub mysteries: Book,
    pub another_journey: Book,
}

pub async fn seed_catalog(t: &TestApp) -> Catalog {
    let jane = t.author("Jane Doe").await;
    let john = t.author("John Smith").await;
    let first_journey = t.book("The First Journey", 2020, jane.id).await;
    let adventures = t.book("Adventures in the North", 2022, jane.id).await;
    let mysteries = t.book("Mysteries of the Deep", 2021, john.id).await;
    let another_journey = t.book("Another Journey", 2020, john.id).await;
    Catalog {
        jane,
        john,
        first_journey,
        adventures,
        mysteries,
        another_journey,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: App,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: App, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(app: App, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(app: App, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn patch_json(app: App, uri: &str, token: Option<&str>, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: App, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, Method::DELETE, uri, token, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the decoded body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// Titles of a list response, in order.
pub fn titles(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}
