//! Database error taxonomy.

use thiserror::Error;

/// SQLSTATE reported by PostgreSQL for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Delete issued without a where clause or without values to bind.
    #[error("invalid delete statement")]
    InvalidDelete,
    #[error("statement failed: {message}")]
    Statement {
        code: Option<String>,
        message: String,
    },
    #[error("connection error: {0}")]
    Connection(String),
}

impl DbError {
    /// SQLSTATE of a failed statement, when the server supplied one.
    pub fn code(&self) -> Option<&str> {
        match self {
            DbError::Statement { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::Statement {
                code: db_err.code().map(|c| c.into_owned()),
                message: db_err.message().to_string(),
            },
            other @ (sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)) => DbError::Connection(other.to_string()),
            other => DbError::Statement {
                code: None,
                message: other.to_string(),
            },
        }
    }
}
