use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, TopoError};

/// Storage-assigned set identity
pub const FIELD_SET_ID: &str = "bk_set_id";
/// Set display name, unique among siblings
pub const FIELD_SET_NAME: &str = "bk_set_name";
/// Containing topology node
pub const FIELD_PARENT_ID: &str = "bk_parent_id";
/// Owning business
pub const FIELD_BIZ_ID: &str = "bk_biz_id";
/// Owning tenant account
pub const FIELD_SUPPLIER_ACCOUNT: &str = "bk_supplier_account";
/// Set kind flag, 0 for ordinary sets
pub const FIELD_DEFAULT: &str = "default";
pub const FIELD_CREATE_TIME: &str = "create_time";
pub const FIELD_LAST_TIME: &str = "last_time";

/// A stored Set record
///
/// Records are attribute maps: the well-known fields above plus any other
/// attribute the caller supplied. Typed accessors convert on read, so a
/// record whose stored value has the wrong shape surfaces as
/// `FieldConversion` at the point it is needed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetInstance {
    data: Map<String, Value>,
}

impl SetInstance {
    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.data.insert(field.into(), value.into());
    }

    /// The storage-assigned identity
    ///
    /// # Errors
    ///
    /// `FieldConversion` if the record carries no integer `bk_set_id`.
    pub fn set_id(&self) -> Result<i64> {
        self.int_field(0, FIELD_SET_ID)
    }

    /// The set name, if the record has one
    pub fn name(&self) -> Option<&str> {
        self.data.get(FIELD_SET_NAME).and_then(Value::as_str)
    }

    /// The containing node's identity
    ///
    /// # Errors
    ///
    /// `FieldConversion` if the stored parent reference is absent or is not
    /// an integer.
    pub fn parent_id(&self) -> Result<i64> {
        let set_id = self.set_id().unwrap_or_default();
        self.int_field(set_id, FIELD_PARENT_ID)
    }

    /// # Errors
    ///
    /// `FieldConversion` if the stored business id is not an integer.
    pub fn biz_id(&self) -> Result<i64> {
        let set_id = self.set_id().unwrap_or_default();
        self.int_field(set_id, FIELD_BIZ_ID)
    }

    /// Keep only the listed fields; an empty list keeps everything
    pub fn project(self, fields: &[String]) -> Self {
        if fields.is_empty() {
            return self;
        }
        let data = self
            .data
            .into_iter()
            .filter(|(k, _)| fields.iter().any(|f| f == k))
            .collect();
        Self { data }
    }

    fn int_field(&self, set_id: i64, field: &str) -> Result<i64> {
        let value = self.data.get(field).ok_or_else(|| TopoError::FieldConversion {
            set_id,
            field: field.to_string(),
            expected: "int".to_string(),
            reason: "field is missing".to_string(),
        })?;

        value_as_i64(value).ok_or_else(|| TopoError::FieldConversion {
            set_id,
            field: field.to_string(),
            expected: "int".to_string(),
            reason: format!("stored value {} is not an integer", value),
        })
    }
}

impl From<Map<String, Value>> for SetInstance {
    fn from(data: Map<String, Value>) -> Self {
        Self::from_map(data)
    }
}

/// Interpret a JSON value as an integer
///
/// Accepts integers, floats with no fractional part, and strings holding a
/// base-10 integer. Anything else is `None`.
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
