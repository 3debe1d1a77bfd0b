//! Connection pool adapter
//!
//! Wraps a sqlx `PgPool` behind the [`ConnectionPool`] trait so the executor
//! can run against any pool that hands out one connection per statement.
//! A connection goes back to its pool when the value returned by
//! [`ConnectionPool::acquire`] is dropped, on every exit path.

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow, PgSslMode};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};

use super::error::DbError;
use super::row::{Row, SqlValue};

/// Default maximum connections for the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Settings used to build the process-wide pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Overrides the user given in `database_url`
    pub user: Option<String>,
    /// Encrypt sessions without verifying the server certificate
    pub tls: bool,
    pub max_connections: u32,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            user: None,
            tls: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Create the PostgreSQL pool.
///
/// No connection is opened here; the first statement does that.
///
/// # Errors
///
/// Returns an error if the connection string cannot be parsed.
pub fn create_pool(config: &PoolConfig) -> Result<PgPool, DbError> {
    let mut options: PgConnectOptions = config.database_url.parse()?;
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    // Require encrypts but never checks the certificate chain.
    let ssl_mode = if config.tls {
        PgSslMode::Require
    } else {
        PgSslMode::Prefer
    };
    options = options.ssl_mode(ssl_mode);

    tracing::info!(
        max_connections = config.max_connections,
        tls = config.tls,
        "Creating database pool"
    );

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy_with(options))
}

/// A pool that lends out one connection at a time.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    type Connection: PooledConnection;

    /// Borrow a connection; dropping it releases it.
    async fn acquire(&self) -> Result<Self::Connection, DbError>;
}

/// A borrowed connection able to run a single parameterized statement.
#[async_trait]
pub trait PooledConnection: Send {
    /// Run a statement that returns rows.
    async fn fetch_rows(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError>;

    /// Run a statement and return the affected row count.
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError>;
}

#[async_trait]
impl ConnectionPool for PgPool {
    type Connection = PoolConnection<Postgres>;

    async fn acquire(&self) -> Result<Self::Connection, DbError> {
        Ok(sqlx::Pool::acquire(self).await?)
    }
}

#[async_trait]
impl PooledConnection for PoolConnection<Postgres> {
    async fn fetch_rows(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError> {
        let rows = bind_all(sqlx::query(sql), params)
            .fetch_all(&mut **self)
            .await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let done = bind_all(sqlx::query(sql), params)
            .execute(&mut **self)
            .await?;
        Ok(done.rows_affected())
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Null => query.bind(None::<String>),
        };
    }
    query
}

fn decode_row(row: &PgRow) -> Result<Row, DbError> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(|v| SqlValue::Int(v.into())),
            "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(|v| SqlValue::Int(v.into())),
            "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(SqlValue::Int),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                row.try_get::<Option<String>, _>(idx)?.map(SqlValue::Text)
            }
            other => {
                return Err(DbError::Statement {
                    code: None,
                    message: format!(
                        "unsupported type {} for column {}",
                        other,
                        column.name()
                    ),
                })
            }
        };
        out.push(column.name(), value.unwrap_or(SqlValue::Null));
    }
    Ok(out)
}
