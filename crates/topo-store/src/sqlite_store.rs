//! SQLite implementation of the schema resolver and instance backend
//!
//! Instances are stored as JSON documents in `instances.data`. Conditions
//! are evaluated with `json_extract`, one `IS` / `IS NOT` term per field, so
//! a missing field behaves like null exactly as in the in-memory store.

#![allow(clippy::result_large_err)]

use std::path::Path;

use chrono::Utc;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::{Map, Value};
use topo_core::backend::{InstanceBackend, Mutation, SchemaResolver, WriteOutcome};
use topo_core::errors::TopoError;
use topo_core::model::{
    FieldDef, ObjectSchema, SetInstance, FIELD_CREATE_TIME, FIELD_LAST_TIME, FIELD_SET_ID,
};
use topo_core::query::{Condition, Predicate, QueryInput};
use topo_core_types::RequestContext;

use crate::db;
use crate::errors::{from_rusqlite, from_write_error, Result};
use crate::migrations::apply_migrations;

/// SQLite-backed topology store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Self::from_connection(conn)
    }

    /// Fresh in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(db::open_in_memory()?)
    }

    /// Wrap an existing connection, applying pending migrations
    pub fn from_connection(mut conn: Connection) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a document verbatim, without id assignment or timestamps
    ///
    /// This is a public method to enable test helpers that need records the
    /// lifecycle operations would never write. The sibling name index still
    /// applies.
    pub fn insert_raw(&mut self, obj_id: &str, data: Map<String, Value>) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO instances (obj_id, data) VALUES (?1, ?2)",
                params![obj_id, Value::Object(data.clone())],
            )
            .map_err(|e| from_write_error(e, &data))?;
        Ok(())
    }
}

fn json_path(field: &str) -> String {
    format!("$.\"{}\"", field.replace('"', "\\\""))
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // json_extract returns arrays and objects as their JSON text
        other => SqlValue::Text(other.to_string()),
    }
}

/// WHERE clause restricting to one object plus every predicate of `condition`
fn where_clause(obj_id: &str, condition: &Condition) -> (String, Vec<SqlValue>) {
    let mut clause = String::from("obj_id = ?");
    let mut values = vec![SqlValue::Text(obj_id.to_string())];

    for (field, predicate) in condition.iter() {
        let (op, expected) = match predicate {
            Predicate::Eq(v) => ("IS", v),
            Predicate::NotEq(v) => ("IS NOT", v),
        };
        clause.push_str(&format!(" AND json_extract(data, ?) {} ?", op));
        values.push(SqlValue::Text(json_path(field)));
        values.push(to_sql_value(expected));
    }

    (clause, values)
}

fn into_record(raw: Value) -> Result<Map<String, Value>> {
    match raw {
        Value::Object(map) => Ok(map),
        other => Err(TopoError::backend(
            "sqlite_decode",
            format!("stored instance is not a JSON object: {}", other),
        )),
    }
}

impl SchemaResolver for SqliteStore {
    fn find_single_object(&self, _ctx: &RequestContext, obj_id: &str) -> Result<ObjectSchema> {
        let row: Option<(String, String, String)> = self
            .conn
            .query_row(
                "SELECT obj_name, supplier_account, fields FROM objects WHERE obj_id = ?1",
                [obj_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(|e| TopoError::SchemaResolutionFailure {
                obj_id: obj_id.to_string(),
                reason: e.to_string(),
            })?;

        let (obj_name, supplier_account, fields) =
            row.ok_or_else(|| TopoError::SchemaResolutionFailure {
                obj_id: obj_id.to_string(),
                reason: "object is not defined".to_string(),
            })?;

        let fields: Vec<FieldDef> =
            serde_json::from_str(&fields).map_err(|e| TopoError::SchemaResolutionFailure {
                obj_id: obj_id.to_string(),
                reason: format!("malformed field definitions: {}", e),
            })?;

        Ok(ObjectSchema {
            obj_id: obj_id.to_string(),
            obj_name,
            supplier_account,
            fields,
        })
    }
}

impl InstanceBackend for SqliteStore {
    fn find(
        &self,
        _ctx: &RequestContext,
        schema: &ObjectSchema,
        input: &QueryInput,
    ) -> Result<(u64, Vec<SetInstance>)> {
        let (clause, mut values) = where_clause(&schema.obj_id, &input.condition);

        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM instances WHERE {}", clause),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )
            .map_err(from_rusqlite)?;

        let mut order = Vec::new();
        for key in input.page.sort_keys() {
            order.push(if key.descending {
                "json_extract(data, ?) DESC"
            } else {
                "json_extract(data, ?) ASC"
            });
            values.push(SqlValue::Text(json_path(&key.field)));
        }
        values.push(SqlValue::Integer(
            i64::try_from(input.page.limit).unwrap_or(i64::MAX),
        ));
        values.push(SqlValue::Integer(
            i64::try_from(input.page.start).unwrap_or(i64::MAX),
        ));

        let sql = format!(
            "SELECT data FROM instances WHERE {} ORDER BY {}, id LIMIT ? OFFSET ?",
            clause,
            order.join(", ")
        );
        let mut stmt = self.conn.prepare(&sql).map_err(from_rusqlite)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| row.get::<_, Value>(0))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        let info = rows
            .into_iter()
            .map(|raw| Ok(SetInstance::from_map(into_record(raw)?).project(&input.fields)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(obj_id = schema.obj_id.as_str(), count, returned = info.len(), "sqlite find");
        Ok((u64::try_from(count).unwrap_or_default(), info))
    }

    fn write(
        &mut self,
        _ctx: &RequestContext,
        schema: &ObjectSchema,
        mutation: Mutation,
    ) -> Result<WriteOutcome> {
        let obj_id = schema.obj_id.as_str();
        let now = Value::String(Utc::now().to_rfc3339());
        let tx = self.conn.transaction().map_err(from_rusqlite)?;

        let outcome = match mutation {
            Mutation::Create { mut data } => {
                data.insert(FIELD_CREATE_TIME.to_string(), now.clone());
                data.insert(FIELD_LAST_TIME.to_string(), now);
                tx.execute(
                    "INSERT INTO instances (obj_id, data) VALUES (?1, ?2)",
                    params![obj_id, Value::Object(data.clone())],
                )
                .map_err(|e| from_write_error(e, &data))?;

                // the row id is the set id; mirror it into the document
                let set_id = tx.last_insert_rowid();
                data.insert(FIELD_SET_ID.to_string(), Value::from(set_id));
                tx.execute(
                    "UPDATE instances SET data = ?1 WHERE id = ?2",
                    params![Value::Object(data.clone()), set_id],
                )
                .map_err(from_rusqlite)?;

                tracing::debug!(obj_id, set_id, "sqlite create");
                WriteOutcome::Created(SetInstance::from_map(data))
            }
            Mutation::Update { condition, data } => {
                let (clause, values) = where_clause(obj_id, &condition);
                let rows: Vec<(i64, Value)> = {
                    let mut stmt = tx
                        .prepare(&format!("SELECT id, data FROM instances WHERE {}", clause))
                        .map_err(from_rusqlite)?;
                    let rows = stmt
                        .query_map(params_from_iter(values.iter()), |row| {
                            Ok((row.get(0)?, row.get(1)?))
                        })
                        .map_err(from_rusqlite)?
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(from_rusqlite)?;
                    rows
                };

                let updated = rows.len() as u64;
                for (id, raw) in rows {
                    let mut record = into_record(raw)?;
                    for (k, v) in &data {
                        record.insert(k.clone(), v.clone());
                    }
                    record.insert(FIELD_LAST_TIME.to_string(), now.clone());
                    tx.execute(
                        "UPDATE instances SET data = ?1 WHERE id = ?2",
                        params![Value::Object(record.clone()), id],
                    )
                    .map_err(|e| from_write_error(e, &record))?;
                }

                tracing::debug!(obj_id, updated, "sqlite update");
                WriteOutcome::Updated(updated)
            }
            Mutation::Delete { condition, set_ids } => {
                if set_ids.is_empty() {
                    return Ok(WriteOutcome::Deleted(0));
                }
                let (clause, mut values) = where_clause(obj_id, &condition);
                let placeholders = vec!["?"; set_ids.len()].join(", ");
                values.push(SqlValue::Text(json_path(FIELD_SET_ID)));
                values.extend(set_ids.iter().map(|id| SqlValue::Integer(*id)));

                let deleted = tx
                    .execute(
                        &format!(
                            "DELETE FROM instances WHERE {} AND json_extract(data, ?) IN ({})",
                            clause, placeholders
                        ),
                        params_from_iter(values.iter()),
                    )
                    .map_err(from_rusqlite)? as u64;

                tracing::debug!(obj_id, deleted, "sqlite delete");
                WriteOutcome::Deleted(deleted)
            }
        };

        tx.commit().map_err(from_rusqlite)?;
        Ok(outcome)
    }
}
