//! Shared response envelope for non-resource endpoints.
//!
//! Resource endpoints return the entity (or list of entities) as the body.
//! Aggregate endpoints such as dashboards wrap their payload in
//! `{ "data": ... }` via [`DataResponse`].

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
