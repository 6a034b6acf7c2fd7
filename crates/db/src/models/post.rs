//! Post entity model and DTOs.

use folio_core::error::CoreError;
use folio_core::permissions::Owned;
use folio_core::resource::{decode, FromPayload, Resource, WriteContext};
use folio_core::shaping::{FieldValue, Fields, FilterKind, ListShape};
use folio_core::types::{DbId, Timestamp};
use folio_core::validation::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A post row from the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Post {
    pub id: DbId,
    pub title: String,
    pub content: String,
    #[serde(rename = "author")]
    pub author_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new post. The author is the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    #[serde(skip)]
    pub author_id: DbId,
}

/// DTO for updating an existing post. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl FromPayload for CreatePost {
    fn from_payload(record: Map<String, Value>, ctx: &WriteContext) -> Result<Self, CoreError> {
        let mut draft: CreatePost = decode(record)?;
        draft.author_id = ctx.require_actor()?;
        Ok(draft)
    }
}

impl FromPayload for UpdatePost {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl Fields for Post {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "content" => Some(self.content.as_str().into()),
            "author" => Some(self.author_id.into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Owned for Post {
    fn owner_id(&self) -> Option<DbId> {
        Some(self.author_id)
    }
}

impl Resource for Post {
    const NAME: &'static str = "Post";
    const KIND: &'static str = "post";
    const SCHEMA: Schema = Schema {
        entity: "Post",
        fields: &[
            FieldSpec::read_only("id"),
            FieldSpec::text("title", 200),
            FieldSpec::long_text("content"),
            FieldSpec::read_only("author"),
            FieldSpec::read_only("created_at"),
            FieldSpec::read_only("updated_at"),
        ],
    };
    const SHAPE: ListShape = ListShape {
        filters: &[("author", FilterKind::Integer)],
        search: &["title", "content"],
        ordering: &["title", "created_at"],
        default_ordering: "title",
    };

    type Draft = CreatePost;
    type Changes = UpdatePost;

    fn id(&self) -> DbId {
        self.id
    }
}
