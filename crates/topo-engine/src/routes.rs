//! Route table for the set endpoints
//!
//! | method | path | route |
//! |---|---|---|
//! | POST | `/set/{app_id}` | create |
//! | PUT | `/set/{app_id}/{set_id}` | update |
//! | DELETE | `/set/{app_id}/batch` | batch delete |
//! | DELETE | `/set/{app_id}/{set_id}` | delete |
//! | POST | `/set/search/{app_id}` | search |
//!
//! The literal `batch` segment is matched before the `{set_id}` parameter,
//! so a batch delete is never parsed as a set id.

#![allow(clippy::result_large_err)]

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use topo_core::errors::{Result, TopoError};
use topo_core::ops::{parse_biz_id, parse_set_id};

use crate::commands::set_command::SetCommand;

const SEGMENT_SET: &str = "set";
const SEGMENT_SEARCH: &str = "search";
const SEGMENT_BATCH: &str = "batch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Delete,
}

impl FromStr for Method {
    type Err = TopoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(TopoError::invalid_parameter(
                "method",
                format!("unsupported method {}", other),
            )),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A matched route with its raw path parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    CreateSet { app_id: String },
    UpdateSet { app_id: String, set_id: String },
    DeleteSets { app_id: String },
    DeleteSet { app_id: String, set_id: String },
    SearchSet { app_id: String },
}

impl Route {
    /// Match a request against the route table
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when no route matches.
    pub fn resolve(method: Method, path: &str) -> Result<Route> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let route = match (method, segments.as_slice()) {
            (Method::Post, [SEGMENT_SET, SEGMENT_SEARCH, app_id]) => Route::SearchSet {
                app_id: app_id.to_string(),
            },
            (Method::Post, [SEGMENT_SET, app_id]) => Route::CreateSet {
                app_id: app_id.to_string(),
            },
            (Method::Put, [SEGMENT_SET, app_id, set_id]) => Route::UpdateSet {
                app_id: app_id.to_string(),
                set_id: set_id.to_string(),
            },
            (Method::Delete, [SEGMENT_SET, app_id, SEGMENT_BATCH]) => Route::DeleteSets {
                app_id: app_id.to_string(),
            },
            (Method::Delete, [SEGMENT_SET, app_id, set_id]) => Route::DeleteSet {
                app_id: app_id.to_string(),
                set_id: set_id.to_string(),
            },
            _ => {
                return Err(TopoError::invalid_parameter(
                    "route",
                    format!("no route for {} {}", method, path),
                ))
            }
        };
        Ok(route)
    }

    /// Operation name used for logging and error context
    pub fn op(&self) -> &'static str {
        match self {
            Route::CreateSet { .. } => "set_create",
            Route::UpdateSet { .. } => "set_update",
            Route::DeleteSets { .. } => "set_delete_batch",
            Route::DeleteSet { .. } => "set_delete",
            Route::SearchSet { .. } => "set_search",
        }
    }

    /// Parse path identities and attach the body
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the business id is not a positive integer or the
    /// set id is not an integer.
    pub fn into_command(self, body: Value) -> Result<SetCommand> {
        let command = match self {
            Route::CreateSet { app_id } => SetCommand::Create {
                biz_id: parse_biz_id(&app_id)?,
                data: body,
            },
            Route::UpdateSet { app_id, set_id } => SetCommand::Update {
                biz_id: parse_biz_id(&app_id)?,
                set_id: parse_set_id(&set_id)?,
                data: body,
            },
            Route::DeleteSets { app_id } => SetCommand::DeleteBatch {
                biz_id: parse_biz_id(&app_id)?,
                condition: body,
            },
            Route::DeleteSet { app_id, set_id } => SetCommand::Delete {
                biz_id: parse_biz_id(&app_id)?,
                set_id: parse_set_id(&set_id)?,
            },
            Route::SearchSet { app_id } => SetCommand::Search {
                biz_id: parse_biz_id(&app_id)?,
                params: body,
            },
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_segment_wins_over_set_id() {
        let route = Route::resolve(Method::Delete, "/set/10/batch").unwrap();
        assert_eq!(
            route,
            Route::DeleteSets {
                app_id: "10".to_string()
            }
        );

        let route = Route::resolve(Method::Delete, "/set/10/7").unwrap();
        assert_eq!(route.op(), "set_delete");
    }

    #[test]
    fn test_search_is_not_create() {
        let route = Route::resolve(Method::Post, "/set/search/10").unwrap();
        assert_eq!(route.op(), "set_search");

        let route = Route::resolve(Method::Post, "set/10/").unwrap();
        assert_eq!(route.op(), "set_create");
    }

    #[test]
    fn test_unknown_routes() {
        for (method, path) in [
            (Method::Put, "/set/10"),
            (Method::Delete, "/set/10"),
            (Method::Post, "/module/10"),
            (Method::Put, "/set/10/batch/extra"),
        ] {
            assert!(
                matches!(
                    Route::resolve(method, path),
                    Err(TopoError::InvalidParameter { .. })
                ),
                "{} {} should not route",
                method,
                path
            );
        }
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
        assert!("PATCH".parse::<Method>().is_err());
    }

    #[test]
    fn test_into_command_parses_identities() {
        let cmd = Route::resolve(Method::Put, "/set/10/3")
            .unwrap()
            .into_command(json!({"bk_set_name": "A"}))
            .unwrap();
        assert_eq!(
            cmd,
            SetCommand::Update {
                biz_id: 10,
                set_id: 3,
                data: json!({"bk_set_name": "A"})
            }
        );

        let result = Route::resolve(Method::Put, "/set/0/3")
            .unwrap()
            .into_command(Value::Null);
        assert!(matches!(result, Err(TopoError::InvalidParameter { .. })));

        let result = Route::resolve(Method::Delete, "/set/10/x7")
            .unwrap()
            .into_command(Value::Null);
        assert!(matches!(result, Err(TopoError::InvalidParameter { .. })));
    }
}
