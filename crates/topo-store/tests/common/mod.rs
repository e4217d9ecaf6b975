use serde_json::{json, Map, Value};
use topo_core::model::OBJ_ID_SET;
use topo_core::ops::set_ops;
use topo_core::{ObjectSchema, SchemaResolver};
use topo_core_types::RequestContext;
use topo_store::SqliteStore;

#[allow(dead_code)]
pub const BIZ: i64 = 10;

#[allow(dead_code)]
pub fn ctx() -> RequestContext {
    RequestContext::new("0")
}

/// Fresh migrated in-memory store
#[allow(dead_code)]
pub fn new_store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("Failed to open in-memory store")
}

/// The Set schema as the store itself resolves it
#[allow(dead_code)]
pub fn set_schema(store: &SqliteStore) -> ObjectSchema {
    store
        .find_single_object(&ctx(), OBJ_ID_SET)
        .expect("Set schema should be seeded")
}

#[allow(dead_code)]
pub fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("test records must be objects, got {}", other),
    }
}

#[allow(dead_code)]
pub fn create_test_set(store: &mut SqliteStore, biz_id: i64, name: &str, parent_id: i64) -> i64 {
    let schema = set_schema(store);
    set_ops::create_set(
        store,
        &ctx(),
        biz_id,
        &schema,
        json!({"bk_set_name": name, "bk_parent_id": parent_id}),
    )
    .expect("Should create set")
    .set_id()
    .expect("Created set should carry an id")
}

/// Business 10 with A, B under parent 1 and C under parent 2
#[allow(dead_code)]
pub fn setup_scenario(store: &mut SqliteStore) -> (i64, i64, i64) {
    (
        create_test_set(store, BIZ, "A", 1),
        create_test_set(store, BIZ, "B", 1),
        create_test_set(store, BIZ, "C", 2),
    )
}
