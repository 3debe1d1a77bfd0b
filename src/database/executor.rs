//! Generic query executor
//!
//! Each operation acquires one connection, runs one parameterized statement
//! and hands the connection back before returning. Identifiers come from the
//! fixed [`Table`] and [`Column`] sets; only values are bound.

use super::error::DbError;
use super::pool::{ConnectionPool, PooledConnection};
use super::row::{QueryResult, SqlValue};

/// Tables known to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    RegisteredChannels,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::RegisteredChannels => "registered_channels",
        }
    }
}

/// Columns of the known tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Id,
    Channel,
    LadderId,
}

impl Column {
    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Channel => "channel",
            Column::LadderId => "ladder_id",
        }
    }
}

fn column_list(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `a = $1 AND b = $2 ...`
fn where_clause(filter: &[Column]) -> String {
    filter
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = ${}", c.as_str(), i + 1))
        .collect::<Vec<_>>()
        .join(" AND ")
}

pub fn select_sql(table: Table, fields: &[Column], filter: &[Column]) -> String {
    let mut sql = format!("SELECT {} FROM {}", column_list(fields), table.as_str());
    if !filter.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_clause(filter));
    }
    sql
}

pub fn insert_sql(table: Table, fields: &[Column]) -> String {
    let placeholders = (1..=fields.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.as_str(),
        column_list(fields),
        placeholders
    )
}

pub fn delete_sql(table: Table, filter: &[Column]) -> String {
    format!("DELETE FROM {} WHERE {}", table.as_str(), where_clause(filter))
}

fn log_failure(sql: &str, err: DbError) -> DbError {
    tracing::error!(sql, code = ?err.code(), error = ?err, "Statement failed");
    err
}

/// Runs single statements against a pool.
#[derive(Debug, Clone)]
pub struct QueryExecutor<P> {
    pool: P,
}

impl<P: ConnectionPool> QueryExecutor<P> {
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// `SELECT <fields> FROM <table> [WHERE <filter>]`
    ///
    /// An empty `filter` selects every row.
    pub async fn select(
        &self,
        table: Table,
        fields: &[Column],
        filter: &[Column],
        values: &[SqlValue],
    ) -> Result<QueryResult, DbError> {
        let sql = select_sql(table, fields, filter);
        let mut conn = self.pool.acquire().await.map_err(|e| log_failure(&sql, e))?;
        let result = conn.fetch_rows(&sql, values).await;
        drop(conn);

        match result {
            Ok(rows) => Ok(QueryResult::from_rows(rows)),
            Err(e) => Err(log_failure(&sql, e)),
        }
    }

    /// `INSERT INTO <table> (<fields>) VALUES ($1, $2, ...)`
    ///
    /// Constraint violations come back as ordinary statement errors.
    pub async fn insert(
        &self,
        table: Table,
        fields: &[Column],
        values: &[SqlValue],
    ) -> Result<QueryResult, DbError> {
        let sql = insert_sql(table, fields);
        let mut conn = self.pool.acquire().await.map_err(|e| log_failure(&sql, e))?;
        let result = conn.execute(&sql, values).await;
        drop(conn);

        match result {
            Ok(n) => Ok(QueryResult::affected(n)),
            Err(e) => Err(log_failure(&sql, e)),
        }
    }

    /// `DELETE FROM <table> WHERE <filter>`
    ///
    /// Fails with [`DbError::InvalidDelete`] before touching the pool when
    /// either the filter or the values are empty.
    pub async fn delete(
        &self,
        table: Table,
        filter: &[Column],
        values: &[SqlValue],
    ) -> Result<QueryResult, DbError> {
        if filter.is_empty() || values.is_empty() {
            tracing::warn!(table = table.as_str(), "Refusing delete without a where clause");
            return Err(DbError::InvalidDelete);
        }

        let sql = delete_sql(table, filter);
        let mut conn = self.pool.acquire().await.map_err(|e| log_failure(&sql, e))?;
        let result = conn.execute(&sql, values).await;
        drop(conn);

        match result {
            Ok(n) => Ok(QueryResult::affected(n)),
            Err(e) => Err(log_failure(&sql, e)),
        }
    }
}
