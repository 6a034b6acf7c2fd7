//! The contract every gateway-managed entity fulfils.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::permissions::Owned;
use crate::shaping::{Fields, ListShape};
use crate::types::DbId;
use crate::validation::Schema;

/// An entity exposed through list/create/retrieve/update/delete.
pub trait Resource: Fields + Owned + Serialize + Clone + Send + Sync + 'static {
    /// Human-readable name for error messages, e.g. `"Book"`.
    const NAME: &'static str;
    /// Key into the permission table, e.g. `"book"`.
    const KIND: &'static str;
    const SCHEMA: Schema;
    const SHAPE: ListShape;

    /// Input for inserting a new row.
    type Draft: FromPayload + Send;
    /// Input for updating a row; `None` fields are left unchanged.
    type Changes: FromPayload + Send;

    fn id(&self) -> DbId;

    /// Id of the enclosing entity for nested resources.
    fn parent_id(&self) -> Option<DbId> {
        None
    }
}

/// Request facts that are not part of the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteContext {
    /// Authenticated caller, recorded as owner where the entity has one.
    pub actor_id: Option<DbId>,
    /// Enclosing entity from the path, for nested resources.
    pub parent_id: Option<DbId>,
}

impl WriteContext {
    pub fn require_actor(&self) -> Result<DbId, CoreError> {
        self.actor_id
            .ok_or_else(|| CoreError::Internal("write requires an authenticated actor".into()))
    }

    pub fn require_parent(&self) -> Result<DbId, CoreError> {
        self.parent_id
            .ok_or_else(|| CoreError::Internal("write requires a parent id".into()))
    }
}

/// Build a store input from a validated record.
pub trait FromPayload: Sized {
    fn from_payload(record: Map<String, Value>, ctx: &WriteContext) -> Result<Self, CoreError>;
}

/// Deserialize a validated record into `T`.
///
/// The record has already passed schema validation, so a failure here is a
/// mismatch between schema and DTO, not bad input.
pub fn decode<T: DeserializeOwned>(record: Map<String, Value>) -> Result<T, CoreError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| CoreError::Internal(format!("validated record did not decode: {e}")))
}
