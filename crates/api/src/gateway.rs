//! Resource access gateway.
//!
//! Composes the permission evaluator, validator, query shaper and entity
//! store into the list / create / retrieve / update / delete flows. Every
//! flow runs its gates in the same order and stops at the first failure:
//!
//! ```text
//! authorize (coarse) -> lookup (404) -> authorize (object) -> validate -> execute
//! ```
//!
//! Handlers stay thin: they extract path, query and body, call one gateway
//! method and wrap the result in a response.

use folio_core::actor::Actor;
use folio_core::error::CoreError;
use folio_core::permissions::{Action, Owned, Policies};
use folio_core::resource::{FromPayload, Resource, WriteContext};
use folio_core::shaping::ListQuery;
use folio_core::types::DbId;
use folio_core::validation::{ValidationContext, WriteMode};
use folio_db::{Repository, Scope, Store};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Per-request view of the store on behalf of one actor.
pub struct Gateway<'a, S: ?Sized> {
    store: &'a S,
    policies: &'a Policies,
    actor: &'a Actor,
}

impl<'a, S: Store + ?Sized> Gateway<'a, S> {
    pub fn new(store: &'a S, policies: &'a Policies, actor: &'a Actor) -> Self {
        Self {
            store,
            policies,
            actor,
        }
    }

    pub fn actor(&self) -> &Actor {
        self.actor
    }

    pub fn store(&self) -> &S {
        self.store
    }

    /// Check `action` against the rules for `kind`.
    pub fn authorize_kind(
        &self,
        action: Action,
        kind: &str,
        instance: Option<&dyn Owned>,
    ) -> AppResult<()> {
        self.policies
            .authorize(self.actor, action, kind, instance)
            .map_err(|denial| {
                tracing::debug!(
                    entity = kind,
                    action = %action,
                    user_id = ?self.actor.id(),
                    reason = %denial,
                    "Permission denied"
                );
                AppError::from(denial)
            })
    }

    /// Check `action` against the rules for `E`.
    pub fn authorize<E: Resource>(&self, action: Action, instance: Option<&E>) -> AppResult<()> {
        self.authorize_kind(action, E::KIND, instance.map(|e| e as &dyn Owned))
    }

    /// Look up an entity without any permission check. Used to resolve
    /// parents of nested resources and targets of side actions.
    pub async fn fetch<E: Resource>(&self, id: DbId) -> AppResult<E>
    where
        S: Repository<E>,
    {
        Repository::<E>::find(self.store, id)
            .await?
            .ok_or(AppError::not_found(E::NAME, id))
    }

    /// List entities visible in `scope`, filtered, searched and ordered per
    /// `E::SHAPE`.
    pub async fn list<E: Resource>(&self, scope: Scope, query: &ListQuery) -> AppResult<Vec<E>>
    where
        S: Repository<E>,
    {
        self.authorize::<E>(Action::List, None)?;
        let items = Repository::<E>::list(self.store, scope).await?;
        let items = E::SHAPE.apply(items, query).map_err(CoreError::Validation)?;
        Ok(items)
    }

    /// Validate `payload` and insert a new entity.
    ///
    /// The actor is recorded as owner and the scope's parent as the enclosing
    /// entity where `E` has them.
    pub async fn create<E: Resource>(&self, scope: Scope, payload: Value) -> AppResult<E>
    where
        S: Repository<E>,
    {
        self.authorize::<E>(Action::Create, None)?;
        let payload = into_object(payload)?;
        let record = E::SCHEMA
            .validate(&payload, WriteMode::Create, &ValidationContext::now())
            .map_err(CoreError::Validation)?;
        let draft = E::Draft::from_payload(record, &self.write_context(scope))?;

        let created = Repository::<E>::create(self.store, draft).await?;
        tracing::info!(
            entity = E::KIND,
            id = created.id(),
            user_id = ?self.actor.id(),
            "Created"
        );
        Ok(created)
    }

    /// Fetch one entity, applying object-level permissions.
    pub async fn retrieve<E: Resource>(&self, scope: Scope, id: DbId) -> AppResult<E>
    where
        S: Repository<E>,
    {
        self.load::<E>(Action::Retrieve, scope, id).await
    }

    /// Replace (`WriteMode::Replace`) or patch (`WriteMode::Partial`) an
    /// entity. Permissions are re-checked against the stored instance.
    pub async fn update<E: Resource>(
        &self,
        scope: Scope,
        id: DbId,
        payload: Value,
        mode: WriteMode,
    ) -> AppResult<E>
    where
        S: Repository<E>,
    {
        let action = match mode {
            WriteMode::Partial => Action::PartialUpdate,
            WriteMode::Create | WriteMode::Replace => Action::Update,
        };
        self.load::<E>(action, scope, id).await?;

        let payload = into_object(payload)?;
        let record = E::SCHEMA
            .validate(&payload, mode, &ValidationContext::now())
            .map_err(CoreError::Validation)?;
        let changes = E::Changes::from_payload(record, &self.write_context(scope))?;

        let updated = Repository::<E>::update(self.store, id, changes)
            .await?
            .ok_or(AppError::not_found(E::NAME, id))?;
        tracing::info!(
            entity = E::KIND,
            id,
            user_id = ?self.actor.id(),
            action = %action,
            "Updated"
        );
        Ok(updated)
    }

    /// Remove an entity and whatever the store cascades from it.
    pub async fn delete<E: Resource>(&self, scope: Scope, id: DbId) -> AppResult<()>
    where
        S: Repository<E>,
    {
        self.load::<E>(Action::Delete, scope, id).await?;

        if !Repository::<E>::delete(self.store, id).await? {
            return Err(AppError::not_found(E::NAME, id));
        }
        tracing::info!(entity = E::KIND, id, user_id = ?self.actor.id(), "Deleted");
        Ok(())
    }

    /// Coarse check, lookup within `scope`, then object-level check.
    async fn load<E: Resource>(&self, action: Action, scope: Scope, id: DbId) -> AppResult<E>
    where
        S: Repository<E>,
    {
        self.authorize::<E>(action, None)?;
        let entity = Repository::<E>::find(self.store, id)
            .await?
            .filter(|e| scope.admits(e.parent_id()))
            .ok_or(AppError::not_found(E::NAME, id))?;
        self.authorize(action, Some(&entity))?;
        Ok(entity)
    }

    fn write_context(&self, scope: Scope) -> WriteContext {
        WriteContext {
            actor_id: self.actor.id(),
            parent_id: scope.parent(),
        }
    }
}

fn into_object(payload: Value) -> AppResult<Map<String, Value>> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}
