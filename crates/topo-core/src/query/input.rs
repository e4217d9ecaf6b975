//! Canonical query form and the request payloads that feed it

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use topo_core_types::RequestContext;

use super::condition::Condition;
use super::page::Page;
use crate::errors::{Result, TopoError};
use crate::model::{FIELD_BIZ_ID, FIELD_SET_ID, FIELD_SUPPLIER_ACCOUNT};

/// What the query executor consumes: filter, projection, pagination
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryInput {
    pub condition: Condition,
    /// Fields to return; empty means whole records
    pub fields: Vec<String>,
    pub page: Page,
}

impl QueryInput {
    /// Unpaged, unprojected query over a condition
    pub fn by_condition(condition: Condition) -> Self {
        Self {
            condition,
            ..Self::default()
        }
    }
}

/// Filter that scopes every query to the caller's business and account
///
/// Both values come from the request scope, never from a payload.
pub fn scope_condition(ctx: &RequestContext, biz_id: i64) -> Condition {
    Condition::new()
        .eq(FIELD_BIZ_ID, biz_id)
        .eq(FIELD_SUPPLIER_ACCOUNT, ctx.supplier_account.as_str())
}

/// Search request body
///
/// ```json
/// {"condition": {"bk_set_name": "web"}, "fields": ["bk_set_id"], "page": {"start": 0, "limit": 10}}
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchParams {
    #[serde(default)]
    pub condition: Map<String, Value>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub page: Option<Value>,
}

impl SearchParams {
    /// Decode a search body; `null` is an empty search
    ///
    /// # Errors
    ///
    /// `InvalidPayload` if the body is not a search object.
    pub fn from_payload(payload: Value) -> Result<Self> {
        if payload.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(payload)?)
    }

    /// Normalize into the executor's query form
    ///
    /// The business and account scope terms are written last, so they replace
    /// any value the payload supplied for those fields.
    ///
    /// # Errors
    ///
    /// `InvalidPayload` if the condition uses an unsupported operator.
    pub fn into_query(self, ctx: &RequestContext, biz_id: i64) -> Result<QueryInput> {
        let mut condition = Condition::from_json_map(&self.condition)?;
        for (field, predicate) in scope_condition(ctx, biz_id).iter() {
            condition.set(field, predicate.clone());
        }

        let fields = self
            .fields
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();

        Ok(QueryInput {
            condition,
            fields,
            page: Page::parse(self.page.as_ref()),
        })
    }
}

/// Batch delete request body: `{"delete": {"inst_ids": [1, 2]}}`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeleteCondition {
    pub delete: DeleteTargets,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeleteTargets {
    pub inst_ids: Vec<i64>,
}

impl DeleteCondition {
    /// # Errors
    ///
    /// `InvalidPayload` if the body does not have the batch delete shape.
    pub fn from_payload(payload: Value) -> Result<Self> {
        serde_json::from_value(payload).map_err(|e| {
            TopoError::invalid_payload(format!("expected a delete condition: {}", e))
        })
    }

    pub fn into_ids(self) -> Vec<i64> {
        self.delete.inst_ids
    }
}

/// Condition selecting one set inside the caller's scope
pub fn set_identity_condition(ctx: &RequestContext, biz_id: i64, set_id: i64) -> Condition {
    scope_condition(ctx, biz_id).eq(FIELD_SET_ID, set_id)
}
