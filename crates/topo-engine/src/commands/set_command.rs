//! Typed set commands and their results

#![allow(clippy::result_large_err)]

use serde_json::Value;
use topo_core::errors::{Result, TopoError};
use topo_core::model::SetInstance;
use topo_core::ops::SearchResult;
use topo_core::TopoBackend;
use topo_core_types::RequestContext;

use super::set;

/// A lifecycle request with its identities already parsed
#[derive(Debug, Clone, PartialEq)]
pub enum SetCommand {
    Create { biz_id: i64, data: Value },
    Update { biz_id: i64, set_id: i64, data: Value },
    Delete { biz_id: i64, set_id: i64 },
    DeleteBatch { biz_id: i64, condition: Value },
    Search { biz_id: i64, params: Value },
}

impl SetCommand {
    pub fn biz_id(&self) -> i64 {
        match self {
            SetCommand::Create { biz_id, .. }
            | SetCommand::Update { biz_id, .. }
            | SetCommand::Delete { biz_id, .. }
            | SetCommand::DeleteBatch { biz_id, .. }
            | SetCommand::Search { biz_id, .. } => *biz_id,
        }
    }
}

/// Result of applying a set command
#[derive(Debug, Clone, PartialEq)]
pub enum SetCommandResult {
    Created(SetInstance),
    Updated,
    Deleted(u64),
    Searched(SearchResult),
}

impl SetCommandResult {
    /// Response body: the created record, `{count, info}` for a search,
    /// null otherwise
    ///
    /// # Errors
    ///
    /// `Backend` if a search result cannot be rendered as JSON.
    pub fn into_response(self) -> Result<Value> {
        match self {
            SetCommandResult::Created(set) => Ok(Value::Object(set.into_map())),
            SetCommandResult::Updated | SetCommandResult::Deleted(_) => Ok(Value::Null),
            SetCommandResult::Searched(result) => serde_json::to_value(result)
                .map_err(|e| TopoError::backend("render_search", e.to_string())),
        }
    }
}

/// Apply a set command against a backend
pub fn apply_set_command(
    ctx: &RequestContext,
    backend: &mut dyn TopoBackend,
    cmd: SetCommand,
) -> Result<SetCommandResult> {
    match cmd {
        SetCommand::Create { biz_id, data } => {
            set::set_create(ctx, backend, biz_id, data).map(SetCommandResult::Created)
        }
        SetCommand::Update {
            biz_id,
            set_id,
            data,
        } => set::set_update(ctx, backend, biz_id, set_id, data).map(|()| SetCommandResult::Updated),
        SetCommand::Delete { biz_id, set_id } => {
            set::set_delete(ctx, backend, biz_id, set_id).map(SetCommandResult::Deleted)
        }
        SetCommand::DeleteBatch { biz_id, condition } => {
            set::set_delete_batch(ctx, backend, biz_id, condition).map(SetCommandResult::Deleted)
        }
        SetCommand::Search { biz_id, params } => {
            set::set_search(ctx, backend, biz_id, params).map(SetCommandResult::Searched)
        }
    }
}
