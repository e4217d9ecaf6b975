//! Set lifecycle commands
//!
//! Usage:
//!   topo set create --biz <ID> --data <JSON>
//!   topo set update --biz <ID> --set <ID> --data <JSON>
//!   topo set delete --biz <ID> --set <ID>
//!   topo set delete-batch --biz <ID> --ids <ID,ID,...>
//!   topo set search --biz <ID> [--data <JSON>]
//!
//! Identities are passed through as given; the engine's route table parses
//! and validates them.

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use topo_core_types::RequestContext;
use topo_store::SqliteStore;

use crate::config::CliConfig;

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Create a set under a business
    Create {
        #[arg(long)]
        biz: String,
        /// Set attributes as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Update one set
    Update {
        #[arg(long)]
        biz: String,
        #[arg(long = "set")]
        set_id: String,
        /// Attributes to change as a JSON object
        #[arg(long)]
        data: String,
    },
    /// Delete one set
    Delete {
        #[arg(long)]
        biz: String,
        #[arg(long = "set")]
        set_id: String,
    },
    /// Delete several sets in one request
    DeleteBatch {
        #[arg(long)]
        biz: String,
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<i64>,
    },
    /// Search sets in a business
    Search {
        #[arg(long)]
        biz: String,
        /// Search request as JSON: condition, fields, page
        #[arg(long)]
        data: Option<String>,
    },
}

/// The request a command maps to: method, path, body
fn to_request(command: SetCommand) -> Result<(&'static str, String, Value), serde_json::Error> {
    let request = match command {
        SetCommand::Create { biz, data } => ("POST", format!("/set/{}", biz), parse_body(&data)?),
        SetCommand::Update { biz, set_id, data } => (
            "PUT",
            format!("/set/{}/{}", biz, set_id),
            parse_body(&data)?,
        ),
        SetCommand::Delete { biz, set_id } => {
            ("DELETE", format!("/set/{}/{}", biz, set_id), Value::Null)
        }
        SetCommand::DeleteBatch { biz, ids } => (
            "DELETE",
            format!("/set/{}/batch", biz),
            json!({"delete": {"inst_ids": ids}}),
        ),
        SetCommand::Search { biz, data } => (
            "POST",
            format!("/set/search/{}", biz),
            match data {
                Some(data) => parse_body(&data)?,
                None => Value::Null,
            },
        ),
    };
    Ok(request)
}

fn parse_body(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Execute set command
pub fn execute(args: SetArgs, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (method, path, body) = to_request(args.command)?;

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut store = SqliteStore::open(&config.db_path)?;
    let ctx = RequestContext::new(config.supplier_account.as_str());

    let response = topo_engine::handle(&ctx, &mut store, method, &path, body)?;
    match response {
        Value::Null => println!("OK"),
        other => println!("{}", serde_json::to_string_pretty(&other)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_delete_request() {
        let (method, path, body) = to_request(SetCommand::DeleteBatch {
            biz: "10".to_string(),
            ids: vec![1, 2],
        })
        .unwrap();
        assert_eq!(method, "DELETE");
        assert_eq!(path, "/set/10/batch");
        assert_eq!(body, json!({"delete": {"inst_ids": [1, 2]}}));
    }

    #[test]
    fn test_search_without_data_is_null_body() {
        let (method, path, body) = to_request(SetCommand::Search {
            biz: "10".to_string(),
            data: None,
        })
        .unwrap();
        assert_eq!((method, path.as_str()), ("POST", "/set/search/10"));
        assert_eq!(body, Value::Null);
    }

    #[test]
    fn test_malformed_json_rejected() {
        let result = to_request(SetCommand::Create {
            biz: "10".to_string(),
            data: "{bk_set_name".to_string(),
        });
        assert!(result.is_err());
    }
}
