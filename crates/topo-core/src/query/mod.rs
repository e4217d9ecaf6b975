//! Query building: conditions, pagination and request payload normalization

pub mod condition;
pub mod input;
pub mod page;

pub use condition::{compare_values, values_equal, Condition, Predicate};
pub use input::{
    scope_condition, set_identity_condition, DeleteCondition, DeleteTargets, QueryInput,
    SearchParams,
};
pub use page::{Page, SortKey, NO_LIMIT};
