use serde_json::{json, Value};
use topo_core::errors::ExError;
use topo_core::TopoBackend;
use topo_core_types::RequestContext;

#[allow(dead_code)]
pub const BIZ: i64 = 10;

#[allow(dead_code)]
pub fn ctx() -> RequestContext {
    RequestContext::new("0")
}

/// Create a set through the route table and return its id
#[allow(dead_code)]
pub fn create_via_route(backend: &mut dyn TopoBackend, biz_id: i64, name: &str, parent_id: i64) -> i64 {
    let created = topo_engine::handle(
        &ctx(),
        backend,
        "POST",
        &format!("/set/{}", biz_id),
        json!({"bk_set_name": name, "bk_parent_id": parent_id}),
    )
    .expect("Should create set");
    created["bk_set_id"].as_i64().expect("Created set should carry an id")
}

/// Business 10 with A, B under parent 1 and C under parent 2
#[allow(dead_code)]
pub fn setup_scenario(backend: &mut dyn TopoBackend) -> (i64, i64, i64) {
    (
        create_via_route(backend, BIZ, "A", 1),
        create_via_route(backend, BIZ, "B", 1),
        create_via_route(backend, BIZ, "C", 2),
    )
}

/// Run the shared rename/batch-delete/search scenario and return the final search response
#[allow(dead_code)]
pub fn run_scenario(backend: &mut dyn TopoBackend) -> Result<Value, ExError> {
    let (a, _, c) = setup_scenario(backend);
    let path = |suffix: &str| format!("/set/{}{}", BIZ, suffix);

    let conflict = topo_engine::handle(
        &ctx(),
        backend,
        "PUT",
        &path(&format!("/{}", a)),
        json!({"bk_set_name": "B"}),
    );
    let err = conflict.expect_err("Rename to a sibling name must fail");
    assert_eq!(err.code(), "ERR_NAME_CONFLICT");

    topo_engine::handle(
        &ctx(),
        backend,
        "PUT",
        &path(&format!("/{}", a)),
        json!({"bk_set_name": "C"}),
    )?;

    topo_engine::handle(
        &ctx(),
        backend,
        "DELETE",
        &path("/batch"),
        json!({"delete": {"inst_ids": [a, c]}}),
    )?;

    topo_engine::handle(
        &ctx(),
        backend,
        "POST",
        &format!("/set/search/{}", BIZ),
        json!({}),
    )
}
