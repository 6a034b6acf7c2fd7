//! Author entity model and DTOs.

use folio_core::error::CoreError;
use folio_core::permissions::Owned;
use folio_core::resource::{decode, FromPayload, Resource, WriteContext};
use folio_core::shaping::{FieldValue, Fields, FilterKind, ListShape};
use folio_core::types::DbId;
use folio_core::validation::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

use crate::models::book::Book;

/// An author row from the `authors` table, with its books nested.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Author {
    pub id: DbId,
    pub name: String,
    /// Filled by a second query; read-only in payloads.
    #[sqlx(skip)]
    pub books: Vec<Book>,
}

/// DTO for creating a new author.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAuthor {
    pub name: String,
}

/// DTO for updating an existing author. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAuthor {
    pub name: Option<String>,
}

impl FromPayload for CreateAuthor {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl FromPayload for UpdateAuthor {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl Fields for Author {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }
}

impl Owned for Author {
    fn owner_id(&self) -> Option<DbId> {
        None
    }
}

impl Resource for Author {
    const NAME: &'static str = "Author";
    const KIND: &'static str = "author";
    const SCHEMA: Schema = Schema {
        entity: "Author",
        fields: &[
            FieldSpec::read_only("id"),
            FieldSpec::text("name", 255),
            FieldSpec::read_only("books"),
        ],
    };
    const SHAPE: ListShape = ListShape {
        filters: &[("name", FilterKind::Text)],
        search: &["name"],
        ordering: &["name"],
        default_ordering: "name",
    };

    type Draft = CreateAuthor;
    type Changes = UpdateAuthor;

    fn id(&self) -> DbId {
        self.id
    }
}
