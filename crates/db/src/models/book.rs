//! Book entity model and DTOs.

use folio_core::error::CoreError;
use folio_core::permissions::Owned;
use folio_core::resource::{decode, FromPayload, Resource, WriteContext};
use folio_core::shaping::{FieldValue, Fields, FilterKind, ListShape};
use folio_core::types::DbId;
use folio_core::validation::{Check, FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

pub const PUBLICATION_YEAR_IN_FUTURE: &str = "Publication year cannot be in the future.";

/// A book row from the `books` table joined with its author's name.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub publication_year: i32,
    #[serde(rename = "author")]
    pub author_id: DbId,
    /// Joined from `authors.name`; used for filtering and search only.
    #[serde(skip_serializing)]
    pub author_name: String,
}

/// DTO for creating a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub publication_year: i32,
    #[serde(rename = "author")]
    pub author_id: DbId,
}

/// DTO for updating an existing book. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub publication_year: Option<i32>,
    #[serde(rename = "author")]
    pub author_id: Option<DbId>,
}

impl FromPayload for CreateBook {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl FromPayload for UpdateBook {
    fn from_payload(record: Map<String, Value>, _ctx: &WriteContext) -> Result<Self, CoreError> {
        decode(record)
    }
}

impl Fields for Book {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "title" => Some(self.title.as_str().into()),
            "publication_year" => Some(self.publication_year.into()),
            "author" => Some(self.author_id.into()),
            "author__name" => Some(self.author_name.as_str().into()),
            _ => None,
        }
    }
}

impl Owned for Book {
    fn owner_id(&self) -> Option<DbId> {
        None
    }
}

impl Resource for Book {
    const NAME: &'static str = "Book";
    const KIND: &'static str = "book";
    const SCHEMA: Schema = Schema {
        entity: "Book",
        fields: &[
            FieldSpec::read_only("id"),
            FieldSpec::text("title", 255),
            FieldSpec::integer("publication_year").with_checks(&[Check::NotAfterCurrentYear {
                message: PUBLICATION_YEAR_IN_FUTURE,
            }]),
            FieldSpec::reference("author"),
        ],
    };
    const SHAPE: ListShape = ListShape {
        filters: &[
            ("title", FilterKind::Text),
            ("publication_year", FilterKind::Integer),
            ("author", FilterKind::Integer),
            ("author__name", FilterKind::Text),
        ],
        search: &["title", "author__name"],
        ordering: &["title", "publication_year"],
        default_ordering: "title",
    };

    type Draft = CreateBook;
    type Changes = UpdateBook;

    fn id(&self) -> DbId {
        self.id
    }
}
