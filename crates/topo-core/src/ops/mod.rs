pub mod params;
pub mod set_ops;
pub mod store;

pub use params::{parse_biz_id, parse_set_id};
pub use set_ops::SearchResult;
pub use store::Store;
