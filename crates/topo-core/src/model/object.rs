use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::set::{
    value_as_i64, FIELD_BIZ_ID, FIELD_CREATE_TIME, FIELD_DEFAULT, FIELD_LAST_TIME,
    FIELD_PARENT_ID, FIELD_SET_ID, FIELD_SET_NAME, FIELD_SUPPLIER_ACCOUNT,
};
use crate::errors::{Result, TopoError};

/// Object id of the builtin Set type
pub const OBJ_ID_SET: &str = "set";

/// Value type of an object field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Int,
    Text,
    Time,
}

/// One attribute definition of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Whether an update payload may change this field
    #[serde(default = "default_editable")]
    pub editable: bool,
}

fn default_editable() -> bool {
    true
}

impl FieldDef {
    pub fn new(id: &str, name: &str, kind: FieldKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            required: false,
            editable: true,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }
}

/// Definition of an object type, as returned by the schema resolver
///
/// Lifecycle operations use it to identify the storage collection, to check
/// new records against the field definitions, and to know which fields an
/// update may not touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub obj_id: String,
    pub obj_name: String,
    pub supplier_account: String,
    pub fields: Vec<FieldDef>,
}

impl ObjectSchema {
    /// The builtin Set object definition
    pub fn builtin_set(supplier_account: impl Into<String>) -> Self {
        Self {
            obj_id: OBJ_ID_SET.to_string(),
            obj_name: "Set".to_string(),
            supplier_account: supplier_account.into(),
            fields: vec![
                FieldDef::new(FIELD_SET_ID, "Set ID", FieldKind::Int).read_only(),
                FieldDef::new(FIELD_SET_NAME, "Set Name", FieldKind::Text).required(),
                FieldDef::new(FIELD_PARENT_ID, "Parent ID", FieldKind::Int)
                    .required()
                    .read_only(),
                FieldDef::new(FIELD_BIZ_ID, "Business ID", FieldKind::Int).read_only(),
                FieldDef::new(FIELD_SUPPLIER_ACCOUNT, "Supplier Account", FieldKind::Text)
                    .read_only(),
                FieldDef::new(FIELD_DEFAULT, "Set Kind", FieldKind::Int),
                FieldDef::new(FIELD_CREATE_TIME, "Create Time", FieldKind::Time).read_only(),
                FieldDef::new(FIELD_LAST_TIME, "Last Update Time", FieldKind::Time).read_only(),
            ],
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Whether an update payload may set `field`
    ///
    /// Identity, scope and timestamp fields are never editable, whatever the
    /// schema says. Fields the schema does not define are editable.
    pub fn is_editable(&self, field: &str) -> bool {
        const ALWAYS_READ_ONLY: [&str; 6] = [
            FIELD_SET_ID,
            FIELD_BIZ_ID,
            FIELD_PARENT_ID,
            FIELD_SUPPLIER_ACCOUNT,
            FIELD_CREATE_TIME,
            FIELD_LAST_TIME,
        ];
        if ALWAYS_READ_ONLY.contains(&field) {
            return false;
        }
        self.field(field).map(|f| f.editable).unwrap_or(true)
    }

    /// Check a new record against the field definitions
    ///
    /// Required fields must be present and non-null. Integer fields that are
    /// present must hold an integer (or an integer string).
    ///
    /// # Errors
    ///
    /// `InvalidPayload` naming the first offending field.
    pub fn check_new_record(&self, data: &Map<String, Value>) -> Result<()> {
        for def in &self.fields {
            match data.get(&def.id) {
                None | Some(Value::Null) if def.required => {
                    return Err(TopoError::invalid_payload(format!(
                        "required field '{}' is missing",
                        def.id
                    )));
                }
                Some(value)
                    if def.kind == FieldKind::Int
                        && !value.is_null()
                        && value_as_i64(value).is_none() =>
                {
                    return Err(TopoError::invalid_payload(format!(
                        "field '{}' must be an integer, got {}",
                        def.id, value
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
