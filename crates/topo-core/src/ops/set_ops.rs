//! Set lifecycle operations
//!
//! Each operation takes the caller's context, the owning business id and the
//! already resolved Set schema, validates its input and then talks to the
//! backend. Errors propagate unchanged; nothing is retried.

use serde::Serialize;
use serde_json::{Map, Value};
use topo_core_types::RequestContext;

use super::params::ensure_biz_id;
use crate::backend::{InstanceBackend, Mutation, WriteOutcome};
use crate::errors::{Result, TopoError};
use crate::model::{
    ObjectSchema, SetInstance, FIELD_BIZ_ID, FIELD_DEFAULT, FIELD_PARENT_ID, FIELD_SET_ID,
    FIELD_SET_NAME, FIELD_SUPPLIER_ACCOUNT,
};
use crate::query::{
    scope_condition, set_identity_condition, Condition, DeleteCondition, QueryInput, SearchParams,
};

/// Search response: total matches plus the requested page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub count: u64,
    pub info: Vec<SetInstance>,
}

/// Create a set under a business
///
/// The payload is stored as given plus the business id, the caller's
/// supplier account, and `default = 0` when the payload has no `default`.
/// Sibling name uniqueness is left to the backend.
///
/// # Errors
/// * `InvalidParameter` - business id is not positive
/// * `InvalidPayload` - payload is not a JSON object, lacks a required field
///   (name, parent), or carries a non-integer in an integer field
/// * `NameConflict` - a sibling under the same parent already has the name
/// * `Backend` - storage failure
pub fn create_set<B: InstanceBackend + ?Sized>(
    backend: &mut B,
    ctx: &RequestContext,
    biz_id: i64,
    schema: &ObjectSchema,
    payload: Value,
) -> Result<SetInstance> {
    ensure_biz_id(biz_id)?;
    let mut data = into_object(payload)?;

    data.insert(FIELD_BIZ_ID.to_string(), Value::from(biz_id));
    data.insert(
        FIELD_SUPPLIER_ACCOUNT.to_string(),
        Value::from(ctx.supplier_account.as_str()),
    );
    data.entry(FIELD_DEFAULT.to_string())
        .or_insert_with(|| Value::from(0));
    schema.check_new_record(&data)?;

    match backend.write(ctx, schema, Mutation::Create { data })? {
        WriteOutcome::Created(set) => Ok(set),
        other => Err(TopoError::backend(
            "create",
            format!("unexpected write outcome {:?}", other),
        )),
    }
}

/// Delete sets by id, as one request
///
/// Only sets inside the caller's business are touched. Ids that match
/// nothing are not an error; the number actually removed is returned.
///
/// # Errors
/// * `InvalidParameter` - business id is not positive
/// * `InvalidPayload` - `set_ids` is empty
/// * `Backend` - storage failure
pub fn delete_set<B: InstanceBackend + ?Sized>(
    backend: &mut B,
    ctx: &RequestContext,
    biz_id: i64,
    schema: &ObjectSchema,
    set_ids: &[i64],
) -> Result<u64> {
    ensure_biz_id(biz_id)?;
    if set_ids.is_empty() {
        return Err(TopoError::invalid_payload("no set ids to delete"));
    }

    let mut ids = set_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mutation = Mutation::Delete {
        condition: scope_condition(ctx, biz_id),
        set_ids: ids,
    };
    match backend.write(ctx, schema, mutation)? {
        WriteOutcome::Deleted(count) => Ok(count),
        other => Err(TopoError::backend(
            "delete",
            format!("unexpected write outcome {:?}", other),
        )),
    }
}

/// Batch delete from a `{"delete": {"inst_ids": [...]}}` body
///
/// # Errors
/// * `InvalidPayload` - body has the wrong shape or lists no ids
/// * everything `delete_set` returns
pub fn delete_sets<B: InstanceBackend + ?Sized>(
    backend: &mut B,
    ctx: &RequestContext,
    biz_id: i64,
    schema: &ObjectSchema,
    payload: Value,
) -> Result<u64> {
    let ids = DeleteCondition::from_payload(payload)?.into_ids();
    delete_set(backend, ctx, biz_id, schema, &ids)
}

/// Update one set
///
/// The set must match exactly once inside the business. A rename is checked
/// against the other sets under the same parent first. Identity, scope and
/// relocation fields are dropped from the payload before writing.
///
/// # Errors
/// * `InvalidParameter` - business id is not positive
/// * `InvalidPayload` - payload is not a JSON object
/// * `NotFound` - no set with this id in the business
/// * `AmbiguousIdentity` - more than one record carries the id
/// * `FieldConversion` - stored parent reference is not an integer
/// * `NameConflict` - a sibling already has the new name
/// * `Backend` - storage failure
pub fn update_set<B: InstanceBackend + ?Sized>(
    backend: &mut B,
    ctx: &RequestContext,
    biz_id: i64,
    schema: &ObjectSchema,
    set_id: i64,
    payload: Value,
) -> Result<()> {
    ensure_biz_id(biz_id)?;
    let data = into_object(payload)?;

    let identity = set_identity_condition(ctx, biz_id, set_id);
    let (count, mut found) = backend.find(ctx, schema, &QueryInput::by_condition(identity.clone()))?;
    let current = match count {
        0 => return Err(TopoError::NotFound { set_id }),
        1 => found.pop().ok_or(TopoError::NotFound { set_id })?,
        n => return Err(TopoError::AmbiguousIdentity { set_id, count: n }),
    };

    if let Some(new_name) = data.get(FIELD_SET_NAME) {
        let parent_id = current.parent_id()?;
        let siblings = Condition::new()
            .eq(FIELD_BIZ_ID, biz_id)
            .eq(FIELD_PARENT_ID, parent_id)
            .eq(FIELD_SET_NAME, new_name.clone())
            .not_eq(FIELD_SET_ID, set_id);
        let (taken, _) = backend.find(ctx, schema, &QueryInput::by_condition(siblings))?;
        if taken > 0 {
            return Err(TopoError::NameConflict {
                biz_id,
                name: new_name
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| new_name.to_string()),
            });
        }
    }

    let data: Map<String, Value> = data
        .into_iter()
        .filter(|(field, _)| {
            let keep = schema.is_editable(field);
            if !keep {
                tracing::debug!(set_id, field = field.as_str(), "dropping read-only field from update");
            }
            keep
        })
        .collect();

    backend.write(
        ctx,
        schema,
        Mutation::Update {
            condition: identity,
            data,
        },
    )?;
    Ok(())
}

/// Search sets in a business
///
/// The business and account terms always come from the request scope.
///
/// # Errors
/// * `InvalidParameter` - business id is not positive
/// * `InvalidPayload` - body is not a search request
/// * `Backend` - storage failure
pub fn search_set<B: InstanceBackend + ?Sized>(
    backend: &B,
    ctx: &RequestContext,
    biz_id: i64,
    schema: &ObjectSchema,
    payload: Value,
) -> Result<SearchResult> {
    ensure_biz_id(biz_id)?;
    let query = SearchParams::from_payload(payload)?.into_query(ctx, biz_id)?;
    let (count, info) = backend.find(ctx, schema, &query)?;
    Ok(SearchResult { count, info })
}

/// Fetch one set by id inside the business, if present
///
/// # Errors
/// * `InvalidParameter` - business id is not positive
/// * `AmbiguousIdentity` - more than one record carries the id
/// * `Backend` - storage failure
pub fn find_set<B: InstanceBackend + ?Sized>(
    backend: &B,
    ctx: &RequestContext,
    biz_id: i64,
    schema: &ObjectSchema,
    set_id: i64,
) -> Result<Option<SetInstance>> {
    ensure_biz_id(biz_id)?;
    let identity = set_identity_condition(ctx, biz_id, set_id);
    let (count, mut found) = backend.find(ctx, schema, &QueryInput::by_condition(identity))?;
    match count {
        0 => Ok(None),
        1 => Ok(found.pop()),
        n => Err(TopoError::AmbiguousIdentity { set_id, count: n }),
    }
}

fn into_object(payload: Value) -> Result<Map<String, Value>> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(TopoError::invalid_payload(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
