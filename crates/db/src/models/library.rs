//! Library entity model and DTOs.
//!
//! Books are attached to libraries through the `library_books` join table
//! (see [`Shelves`](crate::store::Shelves)), never through the payload.

use folio_core::error::CoreError;
use folio_core::permissions::Owned;
use folio_core::resource::{decode, FromPayload, Resource, WriteContext};
use folio_core::shaping::{FieldValue, Fields, FilterKind, ListShape};
use folio_core::types::DbId;
use folio_core::validation::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// A library row from the `libraries` table plus the ids of shelved books.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Library {
    pub id: DbId,
    pub name: String,
    #[sqlx(skip)]
    pub books: Vec<DbId>,
}

/// DTO for creating a new library.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLibrary {
    pub name: String,
}

/// DTO for updating an existing library. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLibrary {
    pub name: Option<String>,
}

impl FromPayload for CreateLibrary {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl FromPayload for UpdateLibrary {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl Fields for Library {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            _ => None,
        }
    }
}

impl Owned for Library {
    fn owner_id(&self) -> Option<DbId> {
        None
    }
}

impl Resource for Library {
    const NAME: &'static str = "Library";
    const KIND: &'static str = "library";
    const SCHEMA: Schema = Schema {
        entity: "Library",
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

    type Draft = CreateLibrary;
    type Changes = UpdateLibrary;

    fn id(&self) -> DbId {
        self.id
    }
}
