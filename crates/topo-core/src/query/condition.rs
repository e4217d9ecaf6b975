//! AND-only filter conditions over named fields
//!
//! A condition maps each field to exactly one predicate. Setting a field a
//! second time replaces its predicate (last assignment wins), so a condition
//! never asserts two different things about the same field.
//!
//! ```
//! use topo_core::query::Condition;
//!
//! let cond = Condition::new()
//!     .eq("bk_biz_id", 10)
//!     .eq("bk_set_name", "web")
//!     .not_eq("bk_set_id", 3);
//! assert_eq!(cond.len(), 3);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::errors::{Result, TopoError};

const OP_EQ: &str = "$eq";
const OP_NE: &str = "$ne";

/// Predicate asserted on a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Value),
    NotEq(Value),
}

impl Predicate {
    /// Evaluate against a field value; a missing field is treated as null
    pub fn holds(&self, actual: Option<&Value>) -> bool {
        let actual = actual.unwrap_or(&Value::Null);
        match self {
            Predicate::Eq(expected) => values_equal(actual, expected),
            Predicate::NotEq(expected) => !values_equal(actual, expected),
        }
    }
}

/// Conjunction of per-field predicates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    predicates: BTreeMap<String, Predicate>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field == value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, Predicate::Eq(value.into()));
        self
    }

    /// Require `field != value`
    pub fn not_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, Predicate::NotEq(value.into()));
        self
    }

    /// Assert a predicate on a field, replacing any earlier one
    pub fn set(&mut self, field: impl Into<String>, predicate: Predicate) {
        self.predicates.insert(field.into(), predicate);
    }

    pub fn get(&self, field: &str) -> Option<&Predicate> {
        self.predicates.get(field)
    }

    /// Predicates in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether a record satisfies every predicate
    pub fn matches(&self, record: &Map<String, Value>) -> bool {
        self.predicates
            .iter()
            .all(|(field, predicate)| predicate.holds(record.get(field)))
    }

    /// Canonical JSON form: `{"f": v}` for equality, `{"f": {"$ne": v}}` otherwise
    pub fn to_json(&self) -> Value {
        let map = self
            .predicates
            .iter()
            .map(|(field, predicate)| {
                let rendered = match predicate {
                    Predicate::Eq(v) => v.clone(),
                    Predicate::NotEq(v) => {
                        let mut op = Map::new();
                        op.insert(OP_NE.to_string(), v.clone());
                        Value::Object(op)
                    }
                };
                (field.clone(), rendered)
            })
            .collect();
        Value::Object(map)
    }

    /// Parse the canonical JSON form
    ///
    /// A plain value means equality. An object value must hold exactly one
    /// operator, `$eq` or `$ne`.
    ///
    /// # Errors
    ///
    /// `InvalidPayload` for unknown operators or operator objects with more
    /// than one key.
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let mut cond = Condition::new();
        for (field, raw) in map {
            let predicate = match raw {
                Value::Object(ops) if ops.len() == 1 => {
                    let (op, value) = ops.iter().next().map(|(k, v)| (k.as_str(), v)).ok_or_else(
                        || TopoError::invalid_payload(format!("empty operator for {}", field)),
                    )?;
                    match op {
                        OP_EQ => Predicate::Eq(value.clone()),
                        OP_NE => Predicate::NotEq(value.clone()),
                        other => {
                            return Err(TopoError::invalid_payload(format!(
                                "unsupported operator {} on field {}",
                                other, field
                            )))
                        }
                    }
                }
                Value::Object(_) => {
                    return Err(TopoError::invalid_payload(format!(
                        "field {} must carry a value or a single operator",
                        field
                    )))
                }
                value => Predicate::Eq(value.clone()),
            };
            cond.set(field.clone(), predicate);
        }
        Ok(cond)
    }
}

/// JSON equality where `5` and `5.0` are the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

/// Total order used for sorting records
///
/// null < bool < number < string < array < object; values of the same kind
/// compare naturally, arrays and objects by their JSON text.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            a.to_string().cmp(&b.to_string())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records must be objects"),
        }
    }

    #[test]
    fn test_last_assignment_wins() {
        let cond = Condition::new()
            .eq("bk_set_id", 1)
            .not_eq("bk_set_id", 2)
            .eq("bk_biz_id", 10);

        assert_eq!(cond.len(), 2);
        assert_eq!(cond.get("bk_set_id"), Some(&Predicate::NotEq(json!(2))));
    }

    #[test]
    fn test_matches_and_semantics() {
        let cond = Condition::new()
            .eq("bk_biz_id", 10)
            .eq("bk_parent_id", 1)
            .not_eq("bk_set_id", 3);

        assert!(cond.matches(&record(json!({"bk_biz_id": 10, "bk_parent_id": 1, "bk_set_id": 4}))));
        assert!(!cond.matches(&record(json!({"bk_biz_id": 10, "bk_parent_id": 1, "bk_set_id": 3}))));
        assert!(!cond.matches(&record(json!({"bk_biz_id": 11, "bk_parent_id": 1, "bk_set_id": 4}))));
    }

    #[test]
    fn test_missing_field_semantics() {
        let rec = record(json!({"bk_biz_id": 10}));
        assert!(!Condition::new().eq("bk_set_name", "A").matches(&rec));
        assert!(Condition::new().not_eq("bk_set_name", "A").matches(&rec));
        assert!(Condition::new().matches(&rec));
    }

    #[test]
    fn test_integral_float_equals_integer() {
        let rec = record(json!({"bk_parent_id": 1.0}));
        assert!(Condition::new().eq("bk_parent_id", 1).matches(&rec));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_json_form() {
        let cond = Condition::new().eq("bk_biz_id", 10).not_eq("bk_set_id", 3);
        assert_eq!(
            cond.to_json(),
            json!({"bk_biz_id": 10, "bk_set_id": {"$ne": 3}})
        );

        let parsed = Condition::from_json_map(&record(json!({
            "bk_biz_id": 10,
            "bk_set_id": {"$ne": 3},
            "bk_set_name": {"$eq": "A"},
        })))
        .unwrap();
        assert_eq!(parsed.get("bk_set_id"), Some(&Predicate::NotEq(json!(3))));
        assert_eq!(parsed.get("bk_set_name"), Some(&Predicate::Eq(json!("A"))));
    }

    #[test]
    fn test_unsupported_operator_rejected() {
        let result = Condition::from_json_map(&record(json!({"bk_set_id": {"$in": [1, 2]}})));
        assert!(matches!(result, Err(TopoError::InvalidPayload { .. })));

        let result =
            Condition::from_json_map(&record(json!({"bk_set_id": {"$eq": 1, "$ne": 2}})));
        assert!(matches!(result, Err(TopoError::InvalidPayload { .. })));
    }

    #[test]
    fn test_compare_values_orders_kinds() {
        assert_eq!(compare_values(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!(99), &json!("1")), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_each_field_asserted_once(
            ops in prop::collection::vec((0usize..4, any::<bool>(), any::<i64>()), 0..32)
        ) {
            let fields = ["bk_set_id", "bk_set_name", "bk_parent_id", "bk_biz_id"];
            let mut cond = Condition::new();
            let mut last = BTreeMap::new();
            for (idx, negate, value) in &ops {
                let field = fields[*idx];
                cond = if *negate {
                    cond.not_eq(field, *value)
                } else {
                    cond.eq(field, *value)
                };
                last.insert(field, (*negate, *value));
            }

            prop_assert_eq!(cond.len(), last.len());
            for (field, (negate, value)) in last {
                let expected = if negate {
                    Predicate::NotEq(json!(value))
                } else {
                    Predicate::Eq(json!(value))
                };
                prop_assert_eq!(cond.get(field), Some(&expected));
            }
        }
    }
}
