pub mod object;
pub mod set;

pub use object::{FieldDef, FieldKind, ObjectSchema, OBJ_ID_SET};
pub use set::{
    value_as_i64, SetInstance, FIELD_BIZ_ID, FIELD_CREATE_TIME, FIELD_DEFAULT, FIELD_LAST_TIME,
    FIELD_PARENT_ID, FIELD_SET_ID, FIELD_SET_NAME, FIELD_SUPPLIER_ACCOUNT,
};
