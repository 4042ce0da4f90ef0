use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;
use crate::repositories::console::ColumnInfo;
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub table: String,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SqlQuery {
    pub sql: String,
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub count: usize,
    pub rows: Vec<Value>,
}

pub async fn tables(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(state.console().tables().await?))
}

pub async fn schema(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<Vec<ColumnInfo>>> {
    Ok(Json(state.console().schema(&query.table).await?))
}

pub async fn data(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> AppResult<Json<RowsResponse>> {
    let rows = state.console().rows(&query.table, query.limit).await?;
    Ok(Json(RowsResponse {
        count: rows.len(),
        rows,
    }))
}

/// Read-only SQL; every statement is logged with the admin who ran it
pub async fn query(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SqlQuery>,
) -> AppResult<Json<RowsResponse>> {
    tracing::warn!(admin_id = %claims.sub, sql = %query.sql, "Database console query");

    let rows = state.console().query(&query.sql, query.limit).await?;
    Ok(Json(RowsResponse {
        count: rows.len(),
        rows,
    }))
}
