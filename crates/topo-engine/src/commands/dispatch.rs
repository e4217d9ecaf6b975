//! Request entry point: route, parse, apply, render

#![allow(clippy::result_large_err)]

use serde_json::Value;
use topo_core::errors::ExError;
use topo_core::TopoBackend;
use topo_core_types::RequestContext;

use super::set_command::apply_set_command;
use crate::routes::{Method, Route};

/// Handle one request against a backend
///
/// Path identities are parsed before the schema is resolved or the backend
/// is touched. Failures come back as `ExError` carrying the request's
/// correlation ids and, once routed, the operation name and business id.
///
/// ```
/// use serde_json::json;
/// use topo_core::Store;
/// use topo_core_types::RequestContext;
///
/// let mut store = Store::new();
/// let ctx = RequestContext::new("0");
/// let created = topo_engine::handle(
///     &ctx,
///     &mut store,
///     "POST",
///     "/set/10",
///     json!({"bk_set_name": "web", "bk_parent_id": 1}),
/// )
/// .unwrap();
/// assert_eq!(created["bk_set_name"], "web");
/// ```
pub fn handle(
    ctx: &RequestContext,
    backend: &mut dyn TopoBackend,
    method: &str,
    path: &str,
    body: Value,
) -> Result<Value, ExError> {
    let route = method
        .parse::<Method>()
        .and_then(|method| Route::resolve(method, path))
        .map_err(|e| with_correlation(ctx, e.into()))?;
    let op = route.op();

    let cmd = route
        .into_command(body)
        .map_err(|e| with_correlation(ctx, ExError::from(e).with_op(op)))?;
    let biz_id = cmd.biz_id();

    apply_set_command(ctx, backend, cmd)
        .and_then(|result| result.into_response())
        .map_err(|e| {
            with_correlation(ctx, ExError::from(e).with_op(op).with_biz_id(biz_id))
        })
}

fn with_correlation(ctx: &RequestContext, err: ExError) -> ExError {
    let err = err.with_request_id(ctx.request_id.clone());
    match &ctx.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}
