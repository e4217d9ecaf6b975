use topo_core::errors::{ExError, ExErrorKind, TopoError};
use topo_core_types::RequestId;

#[test]
fn test_not_found_verifiable_by_kind() {
    let ex_err: ExError = TopoError::NotFound { set_id: 42 }.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.set_id(), Some(42));
}

#[test]
fn test_ambiguous_identity_distinct_from_not_found() {
    let ex_err: ExError = TopoError::AmbiguousIdentity { set_id: 5, count: 3 }.into();

    assert_eq!(ex_err.kind(), ExErrorKind::AmbiguousIdentity);
    assert_ne!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.set_id(), Some(5));
}

#[test]
fn test_name_conflict_carries_business() {
    let ex_err: ExError = TopoError::NameConflict {
        biz_id: 10,
        name: "B".to_string(),
    }
    .into();

    assert_eq!(ex_err.code(), "ERR_NAME_CONFLICT");
    assert_eq!(ex_err.biz_id(), Some(10));
    assert!(ex_err.message().contains("'B'"));
}

#[test]
fn test_request_id_in_display() {
    let request_id = RequestId::new();
    let ex_err = ExError::from(TopoError::invalid_parameter("app_id", "not an integer"))
        .with_op("set_create")
        .with_request_id(request_id.clone());

    assert_eq!(ex_err.request_id(), Some(&request_id));
    let text = ex_err.to_string();
    assert!(text.starts_with("[ERR_INVALID_PARAMETER]"));
    assert!(text.contains(&request_id.to_string()));
}

#[test]
fn test_every_variant_has_a_distinct_code() {
    let errors = vec![
        TopoError::invalid_parameter("set_id", "x"),
        TopoError::SchemaResolutionFailure {
            obj_id: "set".to_string(),
            reason: "missing".to_string(),
        },
        TopoError::invalid_payload("x"),
        TopoError::NotFound { set_id: 1 },
        TopoError::AmbiguousIdentity { set_id: 1, count: 2 },
        TopoError::FieldConversion {
            set_id: 1,
            field: "bk_parent_id".to_string(),
            expected: "int".to_string(),
            reason: "x".to_string(),
        },
        TopoError::NameConflict {
            biz_id: 1,
            name: "A".to_string(),
        },
        TopoError::backend("find", "x"),
    ];

    let mut codes: Vec<&str> = errors.iter().map(|e| e.kind().code()).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn test_backend_source_survives_boundary_op() {
    let ex_err = ExError::from(TopoError::backend("sqlite", "disk I/O error")).with_op("set_create");

    assert_eq!(ex_err.kind(), ExErrorKind::Backend);
    assert_eq!(ex_err.op(), Some("set_create"));
    assert!(ex_err.message().contains("sqlite"));
    assert!(ex_err.message().contains("disk I/O error"));
}
