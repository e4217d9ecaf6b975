use std::collections::HashMap;

use chrono::Utc;
use serde_json::{Map, Value};
use topo_core_types::RequestContext;

use crate::backend::{InstanceBackend, Mutation, SchemaResolver, WriteOutcome};
use crate::errors::{Result, TopoError};
use crate::model::{
    value_as_i64, ObjectSchema, SetInstance, FIELD_BIZ_ID, FIELD_CREATE_TIME, FIELD_LAST_TIME,
    FIELD_PARENT_ID, FIELD_SET_ID, FIELD_SET_NAME,
};
use crate::query::{Condition, QueryInput};

#[derive(Debug, Clone)]
struct StoredInstance {
    obj_id: String,
    data: Map<String, Value>,
}

/// In-memory backend and schema resolver
///
/// HashMap/Vec storage with no locking; writes take `&mut self`, which is
/// what makes the scoped name check inside `write` atomic.
#[derive(Debug, Clone)]
pub struct Store {
    schemas: HashMap<String, ObjectSchema>,
    instances: Vec<StoredInstance>,
    next_id: i64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store that knows the builtin Set object
    pub fn new() -> Self {
        let mut store = Self::without_schemas();
        store.register_schema(ObjectSchema::builtin_set("0"));
        store
    }

    /// Create a store with no object definitions at all
    pub fn without_schemas() -> Self {
        Self {
            schemas: HashMap::new(),
            instances: Vec::new(),
            next_id: 1,
        }
    }

    pub fn register_schema(&mut self, schema: ObjectSchema) {
        self.schemas.insert(schema.obj_id.clone(), schema);
    }

    /// Insert a record verbatim, bypassing id assignment and constraints
    ///
    /// This is a public method to enable test helpers that need states the
    /// lifecycle operations refuse to create (duplicate ids, bad parents).
    pub fn insert_raw(&mut self, obj_id: &str, data: Map<String, Value>) {
        if let Some(id) = data.get(FIELD_SET_ID).and_then(value_as_i64) {
            self.next_id = self.next_id.max(id + 1);
        }
        self.instances.push(StoredInstance {
            obj_id: obj_id.to_string(),
            data,
        });
    }

    /// Number of stored records of an object, across all businesses
    pub fn instance_count(&self, obj_id: &str) -> usize {
        self.instances.iter().filter(|i| i.obj_id == obj_id).count()
    }
}

/// Find a record other than `skip` that already holds `record`'s name in its scope
///
/// Records missing any of business, parent or name are unconstrained.
fn sibling_name_conflict(
    instances: &[StoredInstance],
    obj_id: &str,
    record: &Map<String, Value>,
    skip: Option<usize>,
) -> Option<TopoError> {
    let biz = record.get(FIELD_BIZ_ID).filter(|v| !v.is_null())?;
    let parent = record.get(FIELD_PARENT_ID).filter(|v| !v.is_null())?;
    let name = record.get(FIELD_SET_NAME).filter(|v| !v.is_null())?;

    let siblings = Condition::new()
        .eq(FIELD_BIZ_ID, biz.clone())
        .eq(FIELD_PARENT_ID, parent.clone())
        .eq(FIELD_SET_NAME, name.clone());

    let taken = instances
        .iter()
        .enumerate()
        .any(|(idx, i)| Some(idx) != skip && i.obj_id == obj_id && siblings.matches(&i.data));

    taken.then(|| TopoError::NameConflict {
        biz_id: value_as_i64(biz).unwrap_or_default(),
        name: name.as_str().map(str::to_string).unwrap_or_else(|| name.to_string()),
    })
}

impl SchemaResolver for Store {
    fn find_single_object(&self, _ctx: &RequestContext, obj_id: &str) -> Result<ObjectSchema> {
        self.schemas
            .get(obj_id)
            .cloned()
            .ok_or_else(|| TopoError::SchemaResolutionFailure {
                obj_id: obj_id.to_string(),
                reason: "object is not defined".to_string(),
            })
    }
}

impl InstanceBackend for Store {
    fn find(
        &self,
        _ctx: &RequestContext,
        schema: &ObjectSchema,
        input: &QueryInput,
    ) -> Result<(u64, Vec<SetInstance>)> {
        let matched: Vec<Map<String, Value>> = self
            .instances
            .iter()
            .filter(|i| i.obj_id == schema.obj_id && input.condition.matches(&i.data))
            .map(|i| i.data.clone())
            .collect();

        let count = matched.len() as u64;
        let info = input
            .page
            .apply(matched)
            .into_iter()
            .map(|data| SetInstance::from_map(data).project(&input.fields))
            .collect();

        Ok((count, info))
    }

    fn write(
        &mut self,
        _ctx: &RequestContext,
        schema: &ObjectSchema,
        mutation: Mutation,
    ) -> Result<WriteOutcome> {
        let obj_id = schema.obj_id.as_str();
        let now = Value::String(Utc::now().to_rfc3339());

        match mutation {
            Mutation::Create { mut data } => {
                let set_id = self.next_id;
                data.insert(FIELD_SET_ID.to_string(), Value::from(set_id));
                data.insert(FIELD_CREATE_TIME.to_string(), now.clone());
                data.insert(FIELD_LAST_TIME.to_string(), now);

                if let Some(conflict) = sibling_name_conflict(&self.instances, obj_id, &data, None)
                {
                    return Err(conflict);
                }

                self.next_id += 1;
                self.instances.push(StoredInstance {
                    obj_id: obj_id.to_string(),
                    data: data.clone(),
                });
                tracing::debug!(obj_id, set_id, "created instance");
                Ok(WriteOutcome::Created(SetInstance::from_map(data)))
            }
            Mutation::Update { condition, data } => {
                // apply to a working copy so a conflict halfway leaves nothing changed
                let mut working = self.instances.clone();
                let mut updated = 0u64;
                for idx in 0..working.len() {
                    if working[idx].obj_id != obj_id || !condition.matches(&working[idx].data) {
                        continue;
                    }
                    for (k, v) in &data {
                        working[idx].data.insert(k.clone(), v.clone());
                    }
                    working[idx]
                        .data
                        .insert(FIELD_LAST_TIME.to_string(), now.clone());
                    if let Some(conflict) =
                        sibling_name_conflict(&working, obj_id, &working[idx].data, Some(idx))
                    {
                        return Err(conflict);
                    }
                    updated += 1;
                }
                self.instances = working;
                tracing::debug!(obj_id, updated, "updated instances");
                Ok(WriteOutcome::Updated(updated))
            }
            Mutation::Delete { condition, set_ids } => {
                let before = self.instances.len();
                self.instances.retain(|i| {
                    let targeted = i.obj_id == obj_id
                        && condition.matches(&i.data)
                        && i.data
                            .get(FIELD_SET_ID)
                            .and_then(value_as_i64)
                            .is_some_and(|id| set_ids.contains(&id));
                    !targeted
                });
                let deleted = (before - self.instances.len()) as u64;
                tracing::debug!(obj_id, deleted, "deleted instances");
                Ok(WriteOutcome::Deleted(deleted))
            }
        }
    }
}
