//! Confdb schema store contract and SQLite implementation.

use crate::model::confdb_schema::{ConfdbSchema, ConfdbView};
use crate::store::{StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;

const CONFDB_SCHEMA_SELECT_SQL: &str = "SELECT
    account_id,
    authority_id,
    name,
    revision,
    timestamp,
    summary,
    views_json,
    body,
    sign_key_sha3_384
FROM confdb_schemas";

/// Query contract for confdb schema assertions.
pub trait ConfdbSchemaStore {
    /// Returns schemas named `name`, or every schema when `name` is `None`.
    ///
    /// Results are ordered by name, then newest revision first.
    fn get_confdb_schemas(&self, name: Option<&str>) -> StoreResult<Vec<ConfdbSchema>>;
}

impl<S: ConfdbSchemaStore + ?Sized> ConfdbSchemaStore for &S {
    fn get_confdb_schemas(&self, name: Option<&str>) -> StoreResult<Vec<ConfdbSchema>> {
        (**self).get_confdb_schemas(name)
    }
}

/// SQLite-backed confdb schema store.
pub struct SqliteConfdbSchemaStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteConfdbSchemaStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts or replaces one schema revision.
    pub fn insert_confdb_schema(&self, schema: &ConfdbSchema) -> StoreResult<()> {
        let views_json = serde_json::to_string(&schema.views)
            .map_err(|err| StoreError::InvalidData(format!("unserializable views: {err}")))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO confdb_schemas (
                account_id,
                authority_id,
                name,
                revision,
                timestamp,
                summary,
                views_json,
                body,
                sign_key_sha3_384
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                schema.account_id.as_str(),
                schema.authority_id.as_deref(),
                schema.name.as_str(),
                schema.revision,
                schema.timestamp.as_str(),
                schema.summary.as_deref(),
                views_json,
                schema.body.as_deref(),
                schema.sign_key_sha3_384.as_deref(),
            ],
        )?;
        debug!(
            "event=store_insert module=store status=ok name={} revision={}",
            schema.name, schema.revision
        );
        Ok(())
    }
}

impl ConfdbSchemaStore for SqliteConfdbSchemaStore<'_> {
    fn get_confdb_schemas(&self, name: Option<&str>) -> StoreResult<Vec<ConfdbSchema>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONFDB_SCHEMA_SELECT_SQL}
             WHERE (?1 IS NULL OR name = ?1)
             ORDER BY name ASC, revision DESC, account_id ASC;"
        ))?;

        let mut rows = stmt.query(params![name])?;
        let mut schemas = Vec::new();
        while let Some(row) = rows.next()? {
            schemas.push(parse_confdb_schema_row(row)?);
        }

        debug!(
            "event=store_query module=store status=ok filtered={} count={}",
            name.is_some(),
            schemas.len()
        );
        Ok(schemas)
    }
}

fn parse_confdb_schema_row(row: &Row<'_>) -> StoreResult<ConfdbSchema> {
    let name: String = row.get("name")?;
    let views_json: String = row.get("views_json")?;
    let views: BTreeMap<String, ConfdbView> = serde_json::from_str(&views_json).map_err(|err| {
        StoreError::InvalidData(format!(
            "invalid views `{views_json}` for confdb schema `{name}`: {err}"
        ))
    })?;

    Ok(ConfdbSchema {
        account_id: row.get("account_id")?,
        authority_id: row.get("authority_id")?,
        name,
        revision: row.get("revision")?,
        timestamp: row.get("timestamp")?,
        summary: row.get("summary")?,
        views,
        body: row.get("body")?,
        sign_key_sha3_384: row.get("sign_key_sha3_384")?,
    })
}
