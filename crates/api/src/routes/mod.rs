pub mod articles;
pub mod authors;
pub mod books;
pub mod dashboards;
pub mod health;
pub mod libraries;
pub mod posts;
pub mod social;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /authors                                 list, create (+ legacy /create)
/// /authors/{id}                            get, put, patch, delete
///
/// /books                                   list, create (+ legacy /create)
/// /books/{id}                              get, put, patch, delete
///
/// /libraries                               list, create
/// /libraries/{id}                          get, put, patch, delete
/// /libraries/{id}/books                    shelved books
/// /libraries/{id}/books/{book_id}          shelve (POST), unshelve (DELETE)
///
/// /posts                                   list, create
/// /posts/{id}                              get, put, patch, delete
/// /posts/{post_id}/comments                list, create
/// /posts/{post_id}/comments/{id}           get, put, patch, delete
///
/// /articles                                list, create
/// /articles/{id}                           get, put, patch, delete
///
/// /feed                                    posts of followed users
/// /users/{id}/follow                       follow (POST)
/// /users/{id}/unfollow                     unfollow (POST)
///
/// /dashboards/{admin|librarian|member}     role dashboards
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/authors", authors::router())
        .nest("/books", books::router())
        .nest("/libraries", libraries::router())
        .nest("/posts", posts::router())
        .nest("/articles", articles::router())
        .nest("/dashboards", dashboards::router())
        .merge(social::router())
}
