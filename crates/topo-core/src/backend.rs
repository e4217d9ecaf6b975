//! Interfaces to the external collaborators of the lifecycle operations
//!
//! Schema resolution and query/write execution live behind these traits.
//! `ops::Store` implements both in memory; `topo-store` implements both on
//! SQLite.

use serde_json::{Map, Value};
use topo_core_types::RequestContext;

use crate::errors::Result;
use crate::model::{ObjectSchema, SetInstance};
use crate::query::{Condition, QueryInput};

/// Resolve object definitions by object id
pub trait SchemaResolver {
    /// Look up exactly one object definition
    ///
    /// # Errors
    ///
    /// `SchemaResolutionFailure` if the object is unknown or the lookup fails.
    fn find_single_object(&self, ctx: &RequestContext, obj_id: &str) -> Result<ObjectSchema>;
}

/// A write against the instance collection of one object
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert a record; the backend assigns `bk_set_id`
    Create { data: Map<String, Value> },
    /// Merge `data` into every record matching `condition`
    Update {
        condition: Condition,
        data: Map<String, Value>,
    },
    /// Remove records matching `condition` whose id is in `set_ids`, all or nothing
    Delete {
        condition: Condition,
        set_ids: Vec<i64>,
    },
}

impl Mutation {
    /// Short name used in logs and backend error context
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Create { .. } => "create",
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
        }
    }
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Created(SetInstance),
    Updated(u64),
    Deleted(u64),
}

/// Filtered reads and writes over stored instances
///
/// Implementations must reject any write that would leave two records with
/// the same `(bk_biz_id, bk_parent_id, bk_set_name)`, reporting
/// `NameConflict`. Lifecycle operations check this too, but only as an early
/// exit; the backend check is the one that holds under concurrency.
pub trait InstanceBackend {
    /// Count all matches and return the requested page of them
    ///
    /// # Errors
    ///
    /// `Backend` on storage failure.
    fn find(
        &self,
        ctx: &RequestContext,
        schema: &ObjectSchema,
        input: &QueryInput,
    ) -> Result<(u64, Vec<SetInstance>)>;

    /// Apply one mutation atomically
    ///
    /// # Errors
    ///
    /// `NameConflict` when the scoped unique constraint would be violated,
    /// `Backend` on storage failure.
    fn write(
        &mut self,
        ctx: &RequestContext,
        schema: &ObjectSchema,
        mutation: Mutation,
    ) -> Result<WriteOutcome>;
}

/// A backend that also resolves schemas, as both implementations do
pub trait TopoBackend: SchemaResolver + InstanceBackend {}

impl<T: SchemaResolver + InstanceBackend> TopoBackend for T {}
