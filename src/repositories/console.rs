//! Read-only database console for administrators.

use std::sync::Arc;

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement,
    TransactionTrait,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const MAX_CONSOLE_ROWS: u64 = 500;
const STATEMENT_TIMEOUT_MS: u64 = 5_000;
const REDACTED: &str = "[redacted]";

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub is_nullable: String,
    pub column_default: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct TableRow {
    table_name: String,
}

#[derive(Debug, FromQueryResult)]
struct JsonRow {
    row: serde_json::Value,
}

#[derive(Clone)]
pub struct ConsoleRepository {
    db: Arc<DatabaseConnection>,
}

impl ConsoleRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn tables(&self) -> AppResult<Vec<String>> {
        let rows = TableRow::find_by_statement(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT table_name::text AS table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
             ORDER BY table_name",
        ))
        .all(self.db.as_ref())
        .await?;

        Ok(rows.into_iter().map(|r| r.table_name).collect())
    }

    pub async fn schema(&self, table: &str) -> AppResult<Vec<ColumnInfo>> {
        self.ensure_table(table).await?;

        Ok(ColumnInfo::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT column_name::text AS column_name, data_type::text AS data_type, \
             is_nullable::text AS is_nullable, column_default::text AS column_default \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
            [table.into()],
        ))
        .all(self.db.as_ref())
        .await?)
    }

    /// Rows of a known table as JSON objects, with password hashes redacted.
    pub async fn rows(&self, table: &str, limit: Option<u64>) -> AppResult<Vec<serde_json::Value>> {
        self.ensure_table(table).await?;
        let limit = limit.unwrap_or(100).clamp(1, MAX_CONSOLE_ROWS);

        let sql = format!(
            "SELECT (row_to_json(t)::jsonb - 'password_hash') AS row FROM {} t LIMIT $1",
            quote_ident(table)
        );
        let rows = JsonRow::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            [(limit as i64).into()],
        ))
        .all(self.db.as_ref())
        .await?;

        Ok(rows.into_iter().map(|r| redact_secrets(r.row)).collect())
    }

    /// Run one `SELECT`/`WITH` statement inside a read-only transaction that
    /// is always rolled back.
    pub async fn query(&self, sql: &str, limit: Option<u64>) -> AppResult<Vec<serde_json::Value>> {
        let statement = read_only_statement(sql)?;
        let limit = limit.unwrap_or(100).clamp(1, MAX_CONSOLE_ROWS);

        let txn = self
            .db
            .begin_with_config(None, Some(AccessMode::ReadOnly))
            .await?;
        txn.execute_unprepared(&format!("SET LOCAL statement_timeout = {STATEMENT_TIMEOUT_MS}"))
            .await?;

        let wrapped = format!(
            "SELECT (row_to_json(q)::jsonb - 'password_hash') AS row FROM ({statement}) q LIMIT $1"
        );
        let result = JsonRow::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            wrapped,
            [(limit as i64).into()],
        ))
        .all(&txn)
        .await;

        txn.rollback().await?;

        let rows = result.map_err(|e| AppError::BadRequest(format!("Query failed: {e}")))?;
        tracing::info!(rows = rows.len(), "Console query executed");
        Ok(rows.into_iter().map(|r| redact_secrets(r.row)).collect())
    }

    async fn ensure_table(&self, table: &str) -> AppResult<()> {
        if self.tables().await?.iter().any(|t| t == table) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Table '{table}' not found")))
        }
    }
}

/// Accept a single `SELECT` or `WITH` statement, dropping one trailing `;`.
pub fn read_only_statement(sql: &str) -> AppResult<&str> {
    let trimmed = sql.trim();
    let statement = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();

    if statement.is_empty() {
        return Err(AppError::Validation("Query must not be empty".to_string()));
    }
    if statement.contains(';') {
        return Err(AppError::Validation("Only a single statement is allowed".to_string()));
    }

    let keyword = statement
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    if keyword != "select" && keyword != "with" {
        return Err(AppError::Validation(
            "Only SELECT and WITH queries are allowed".to_string(),
        ));
    }
    if statement.to_ascii_lowercase().contains("password_hash") {
        return Err(AppError::Validation(
            "Password hashes cannot be queried".to_string(),
        ));
    }

    Ok(statement)
}

/// Drop `password_hash` keys and blank out argon2 hashes at any depth, so
/// whole-row expressions such as `row_to_json(u)` cannot leak them either.
fn redact_secrets(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key != "password_hash")
                .map(|(key, value)| (key, redact_secrets(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(redact_secrets).collect()),
        Value::String(text) if text.starts_with("$argon2") => Value::String(REDACTED.to_string()),
        other => other,
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use maplit::btreemap;
    use sea_orm::{MockDatabase, MockExecResult, Value};

    use super::*;
    use crate::repositories::fixtures;

    fn table(name: &str) -> BTreeMap<&'static str, Value> {
        btreemap! { "table_name" => Value::from(name) }
    }

    #[test]
    fn test_read_only_statement_accepts_select_and_with() {
        assert_eq!(read_only_statement(" SELECT 1; ").unwrap(), "SELECT 1");
        assert!(read_only_statement("with x as (select 1) select * from x").is_ok());
    }

    #[test]
    fn test_read_only_statement_rejects_writes_and_batches() {
        for sql in [
            "",
            ";",
            "DELETE FROM city",
            "update city set name = 'x'",
            "SELECT 1; DROP TABLE city",
            "drop table booking",
        ] {
            assert!(
                matches!(read_only_statement(sql), Err(AppError::Validation(_))),
                "accepted {sql:?}"
            );
        }
    }

    #[test]
    fn test_password_hash_cannot_be_selected() {
        let err = read_only_statement(r#"select Password_Hash as h from "user""#).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Password hashes")));
    }

    #[tokio::test]
    async fn test_whole_row_expressions_are_redacted() {
        let leaked = serde_json::json!({
            "u": { "email": "admin@example.tn", "password_hash": "$argon2id$v=19$x" },
            "h": "$argon2id$v=19$x",
        });
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![btreemap! { "row" => Value::from(leaked) }]])
            .into_connection();
        let repo = ConsoleRepository::new(Arc::new(db));

        let rows = repo
            .query(r#"select row_to_json(u) as u from "user" u"#, None)
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![serde_json::json!({
                "u": { "email": "admin@example.tn" },
                "h": "[redacted]",
            })]
        );
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("user"), "\"user\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn test_rows_of_unknown_table_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![table("city"), table("place")]])
            .into_connection();
        let repo = ConsoleRepository::new(Arc::new(db));

        let err = repo.rows("pg_shadow", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_query_runs_in_read_only_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![btreemap! {
                "row" => Value::from(serde_json::json!({ "name": "Chebba" })),
            }]])
            .into_connection();
        let db = Arc::new(db);
        let repo = ConsoleRepository::new(db.clone());

        let rows = repo.query("select name from city", Some(10)).await.unwrap();
        assert_eq!(rows, vec![serde_json::json!({ "name": "Chebba" })]);

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(log.contains("statement_timeout"));
        assert!(log.contains("FROM (select name from city) q LIMIT $1"));
    }
}
