//! Comment entity model and DTOs. Comments are nested under a post.

use folio_core::error::CoreError;
use folio_core::permissions::Owned;
use folio_core::resource::{decode, FromPayload, Resource, WriteContext};
use folio_core::shaping::{FieldValue, Fields, FilterKind, ListShape};
use folio_core::types::{DbId, Timestamp};
use folio_core::validation::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A comment row from the `comments` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    #[serde(rename = "post")]
    pub post_id: DbId,
    #[serde(rename = "author")]
    pub author_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a comment. Post and author come from the request, not
/// the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateComment {
    pub content: String,
    #[serde(skip)]
    pub post_id: DbId,
    #[serde(skip)]
    pub author_id: DbId,
}

/// DTO for updating an existing comment. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComment {
    pub content: Option<String>,
}

impl FromPayload for CreateComment {
    fn from_payload(record: Map<String, Value>, ctx: &WriteContext) -> Result<Self, CoreError> {
        let mut draft: CreateComment = decode(record)?;
        draft.post_id = ctx.require_parent()?;
        draft.author_id = ctx.require_actor()?;
        Ok(draft)
    }
}

impl FromPayload for UpdateComment {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl Fields for Comment {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "post" => Some(self.post_id.into()),
            "author" => Some(self.author_id.into()),
            "content" => Some(self.content.as_str().into()),
            "created_at" => Some(self.created_at.into()),
            "updated_at" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Option<DbId> {
        Some(self.author_id)
    }
}

impl Resource for Comment {
    const NAME: &'static str = "Comment";
    const KIND: &'static str = "comment";
    const SCHEMA: Schema = Schema {
        entity: "Comment",
        fields: &[
            FieldSpec::read_only("id"),
            FieldSpec::read_only("post"),
            FieldSpec::read_only("author"),
            FieldSpec::long_text("content"),
            FieldSpec::read_only("created_at"),
            FieldSpec::read_only("updated_at"),
        ],
    };
    const SHAPE: ListShape = ListShape {
        filters: &[("author", FilterKind::Integer)],
        search: &["content"],
        ordering: &["created_at"],
        default_ordering: "created_at",
    };

    type Draft = CreateComment;
    type Changes = UpdateComment;

    fn id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        Some(self.post_id)
    }
}
