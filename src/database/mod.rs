//! Database Module
//!
//! PostgreSQL access for channel registrations.
//! This module handles connection pooling, single-statement
//! select/insert/delete execution, and the registration workflow
//! built on top of them.

pub mod error;
pub mod executor;
pub mod pool;
pub mod registrations;
pub mod row;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DbError, UNIQUE_VIOLATION};
pub use executor::{Column, QueryExecutor, Table};
pub use pool::{create_pool, ConnectionPool, PoolConfig, PooledConnection};
pub use registrations::{DuplicateCheck, InsertOutcome, RegistrationOutcome, RegistrationRepo};
pub use row::{QueryResult, Row, SqlValue};
