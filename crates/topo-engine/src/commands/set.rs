//! Set command handlers with boundary logging
//!
//! ## Logging Ownership
//!
//! The engine layer owns lifecycle logging for set operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.
//!
//! Every handler resolves the Set schema from the backend first, then runs
//! the core operation against the same backend.

#![allow(clippy::result_large_err)]

use serde_json::Value;
use topo_core::errors::Result;
use topo_core::model::{ObjectSchema, SetInstance, OBJ_ID_SET};
use topo_core::ops::{set_ops, SearchResult};
use topo_core::TopoBackend;
use topo_core::{log_op_end, log_op_error, log_op_start};
use topo_core_types::RequestContext;

fn resolve_set_schema(ctx: &RequestContext, backend: &dyn TopoBackend) -> Result<ObjectSchema> {
    backend.find_single_object(ctx, OBJ_ID_SET)
}

fn elapsed_ms(start: std::time::Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Create a set in a business
///
/// ## Errors
///
/// - `SchemaResolutionFailure`: Set object is not defined
/// - `InvalidPayload`: body is not a JSON object
/// - `NameConflict`: a sibling already has the name
/// - `Backend`: storage failure
pub fn set_create(
    ctx: &RequestContext,
    backend: &mut dyn TopoBackend,
    biz_id: i64,
    data: Value,
) -> Result<SetInstance> {
    log_op_start!("set_create", biz_id = biz_id, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let result = resolve_set_schema(ctx, backend)
        .and_then(|schema| set_ops::create_set(backend, ctx, biz_id, &schema, data))
        .map_err(|e| {
            log_op_error!("set_create", e.clone(), duration_ms = elapsed_ms(start), biz_id = biz_id);
            e
        })?;

    log_op_end!(
        "set_create",
        duration_ms = elapsed_ms(start),
        biz_id = biz_id,
        set_id = result.set_id().unwrap_or_default()
    );

    Ok(result)
}

/// Update one set
///
/// ## Errors
///
/// - `SchemaResolutionFailure`: Set object is not defined
/// - `InvalidPayload`: body is not a JSON object
/// - `NotFound` / `AmbiguousIdentity`: the id does not match exactly one set
/// - `FieldConversion`: stored parent reference is corrupt
/// - `NameConflict`: a sibling already has the new name
/// - `Backend`: storage failure
pub fn set_update(
    ctx: &RequestContext,
    backend: &mut dyn TopoBackend,
    biz_id: i64,
    set_id: i64,
    data: Value,
) -> Result<()> {
    log_op_start!("set_update", biz_id = biz_id, set_id = set_id, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    resolve_set_schema(ctx, backend)
        .and_then(|schema| set_ops::update_set(backend, ctx, biz_id, &schema, set_id, data))
        .map_err(|e| {
            log_op_error!(
                "set_update",
                e.clone(),
                duration_ms = elapsed_ms(start),
                biz_id = biz_id,
                set_id = set_id
            );
            e
        })?;

    log_op_end!(
        "set_update",
        duration_ms = elapsed_ms(start),
        biz_id = biz_id,
        set_id = set_id
    );

    Ok(())
}

/// Delete one set; returns the number of records removed
///
/// ## Errors
///
/// - `SchemaResolutionFailure`: Set object is not defined
/// - `Backend`: storage failure
pub fn set_delete(
    ctx: &RequestContext,
    backend: &mut dyn TopoBackend,
    biz_id: i64,
    set_id: i64,
) -> Result<u64> {
    log_op_start!("set_delete", biz_id = biz_id, set_id = set_id, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let affected = resolve_set_schema(ctx, backend)
        .and_then(|schema| set_ops::delete_set(backend, ctx, biz_id, &schema, &[set_id]))
        .map_err(|e| {
            log_op_error!(
                "set_delete",
                e.clone(),
                duration_ms = elapsed_ms(start),
                biz_id = biz_id,
                set_id = set_id
            );
            e
        })?;

    log_op_end!(
        "set_delete",
        duration_ms = elapsed_ms(start),
        biz_id = biz_id,
        affected = affected
    );

    Ok(affected)
}

/// Delete the sets listed in a `{"delete": {"inst_ids": [...]}}` body
///
/// ## Errors
///
/// - `SchemaResolutionFailure`: Set object is not defined
/// - `InvalidPayload`: body has the wrong shape or lists no ids
/// - `Backend`: storage failure
pub fn set_delete_batch(
    ctx: &RequestContext,
    backend: &mut dyn TopoBackend,
    biz_id: i64,
    condition: Value,
) -> Result<u64> {
    log_op_start!("set_delete_batch", biz_id = biz_id, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let affected = resolve_set_schema(ctx, backend)
        .and_then(|schema| set_ops::delete_sets(backend, ctx, biz_id, &schema, condition))
        .map_err(|e| {
            log_op_error!(
                "set_delete_batch",
                e.clone(),
                duration_ms = elapsed_ms(start),
                biz_id = biz_id
            );
            e
        })?;

    log_op_end!(
        "set_delete_batch",
        duration_ms = elapsed_ms(start),
        biz_id = biz_id,
        affected = affected
    );

    Ok(affected)
}

/// Search sets in a business
///
/// ## Errors
///
/// - `SchemaResolutionFailure`: Set object is not defined
/// - `InvalidPayload`: body is not a search request
/// - `Backend`: storage failure
pub fn set_search(
    ctx: &RequestContext,
    backend: &dyn TopoBackend,
    biz_id: i64,
    params: Value,
) -> Result<SearchResult> {
    log_op_start!("set_search", biz_id = biz_id, request_id = %ctx.request_id);
    let start = std::time::Instant::now();

    let result = resolve_set_schema(ctx, backend)
        .and_then(|schema| set_ops::search_set(backend, ctx, biz_id, &schema, params))
        .map_err(|e| {
            log_op_error!("set_search", e.clone(), duration_ms = elapsed_ms(start), biz_id = biz_id);
            e
        })?;

    log_op_end!(
        "set_search",
        duration_ms = elapsed_ms(start),
        biz_id = biz_id,
        count = result.count
    );

    Ok(result)
}
