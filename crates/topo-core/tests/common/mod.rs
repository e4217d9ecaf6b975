use serde_json::{json, Map, Value};
use topo_core::model::OBJ_ID_SET;
use topo_core::ops::set_ops;
use topo_core::{ObjectSchema, Store};
use topo_core_types::RequestContext;

/// Business used by the shared scenario
#[allow(dead_code)]
pub const BIZ: i64 = 10;

#[allow(dead_code)]
pub fn ctx() -> RequestContext {
    RequestContext::new("0")
}

#[allow(dead_code)]
pub fn set_schema() -> ObjectSchema {
    ObjectSchema::builtin_set("0")
}

/// Unwrap a `json!` object literal into a record map
#[allow(dead_code)]
pub fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("test records must be objects, got {}", other),
    }
}

/// Create a set through the lifecycle operation and return its id
#[allow(dead_code)]
pub fn create_test_set(store: &mut Store, biz_id: i64, name: &str, parent_id: i64) -> i64 {
    set_ops::create_set(
        store,
        &ctx(),
        biz_id,
        &set_schema(),
        json!({"bk_set_name": name, "bk_parent_id": parent_id}),
    )
    .expect("Should create set")
    .set_id()
    .expect("Created set should carry an id")
}

/// Business 10 with sets A and B under parent 1 and C under parent 2
///
/// Returns (a_id, b_id, c_id)
#[allow(dead_code)]
pub fn setup_scenario(store: &mut Store) -> (i64, i64, i64) {
    let a = create_test_set(store, BIZ, "A", 1);
    let b = create_test_set(store, BIZ, "B", 1);
    let c = create_test_set(store, BIZ, "C", 2);
    (a, b, c)
}

/// Insert a record directly, bypassing lifecycle checks
#[allow(dead_code)]
pub fn insert_raw_set(store: &mut Store, data: Value) {
    store.insert_raw(OBJ_ID_SET, record(data));
}
