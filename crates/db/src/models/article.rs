//! Article entity model and DTOs.
//!
//! Articles are gated by named capabilities rather than ownership.

use folio_core::error::CoreError;
use folio_core::permissions::Owned;
use folio_core::resource::{decode, FromPayload, Resource, WriteContext};
use folio_core::shaping::{FieldValue, Fields, FilterKind, ListShape};
use folio_core::types::{DbId, Timestamp};
use folio_core::validation::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// An article row from the `articles` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Article {
    pub id: DbId,
    pub title: String,
    pub content: String,
    #[serde(rename = "author")]
    pub author_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a new article. The author is the authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArticle {
    pub title: String,
    pub content: String,
    #[serde(skip)]
    pub author_id: DbId,
}

/// DTO for updating an existing article. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateArticle {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl FromPayload for CreateArticle {
    fn from_payload(record: Map<String, Value>, ctx: &WriteContext) -> Result<Self, CoreError> {
        let mut draft: CreateArticle = decode(record)?;
        draft.author_id = ctx.require_actor()?;
        Ok(draft)
    }
}

impl FromPayload for UpdateArticle {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl Fields for Article {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "content" => Some(self.content.as_str().into()),
            "author" => Some(self.author_id.into()),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

impl Owned for Article {
    fn owner_id(&self) -> Option<DbId> {
        Some(self.author_id)
    }
}

impl Resource for Article {
    const NAME: &'static str = "Article";
    const KIND: &'static str = "article";
    const SCHEMA: Schema = Schema {
        entity: "Article",
        fields: &[
            FieldSpec::read_only("id"),
            FieldSpec::text("title", 200),
            FieldSpec::long_text("content"),
            FieldSpec::read_only("author"),
            FieldSpec::read_only("created_at"),
        ],
    };
    const SHAPE: ListShape = ListShape {
        filters: &[("author", FilterKind::Integer)],
        search: &["title", "content"],
        ordering: &["title", "created_at"],
        default_ordering: "title",
    };

    type Draft = CreateArticle;
    type Changes = UpdateArticle;

    fn id(&self) -> DbId {
        self.id
    }
}
