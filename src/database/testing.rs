//! In-memory pool for unit tests.
//!
//! Hands out connections that replay scripted responses in order, records
//! every statement they run, and tracks how many connections are checked out.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::DbError;
use super::pool::{ConnectionPool, PooledConnection};
use super::row::{Row, SqlValue};

pub(crate) enum Scripted {
    Rows(Vec<Row>),
    Affected(u64),
    Fail(DbError),
    Panic,
}

#[derive(Default)]
struct State {
    available: usize,
    acquisitions: usize,
    releases: usize,
    responses: VecDeque<Scripted>,
    statements: Vec<(String, Vec<SqlValue>)>,
}

#[derive(Clone)]
pub(crate) struct ScriptedPool {
    capacity: usize,
    state: Arc<Mutex<State>>,
}

impl ScriptedPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Arc::new(Mutex::new(State {
                available: capacity,
                ..State::default()
            })),
        }
    }

    pub(crate) fn push(&self, response: Scripted) -> &Self {
        self.lock().responses.push_back(response);
        self
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn available(&self) -> usize {
        self.lock().available
    }

    pub(crate) fn acquisitions(&self) -> usize {
        self.lock().acquisitions
    }

    pub(crate) fn releases(&self) -> usize {
        self.lock().releases
    }

    pub(crate) fn statements(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.lock().statements.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub(crate) struct ScriptedConnection {
    state: Arc<Mutex<State>>,
}

impl ScriptedConnection {
    fn next(&self, sql: &str, params: &[SqlValue]) -> Option<Scripted> {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.statements.push((sql.to_string(), params.to_vec()));
        state.responses.pop_front()
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        state.available += 1;
        state.releases += 1;
    }
}

#[async_trait]
impl ConnectionPool for ScriptedPool {
    type Connection = ScriptedConnection;

    async fn acquire(&self) -> Result<ScriptedConnection, DbError> {
        let mut state = self.lock();
        if state.available == 0 {
            return Err(DbError::Connection("pool exhausted".to_string()));
        }
        state.available -= 1;
        state.acquisitions += 1;
        Ok(ScriptedConnection {
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl PooledConnection for ScriptedConnection {
    async fn fetch_rows(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, DbError> {
        match self.next(sql, params) {
            None => Ok(Vec::new()),
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Affected(_)) => Ok(Vec::new()),
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Panic) => panic!("scripted panic"),
        }
    }

    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        match self.next(sql, params) {
            None => Ok(0),
            Some(Scripted::Rows(rows)) => Ok(rows.len() as u64),
            Some(Scripted::Affected(n)) => Ok(n),
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Panic) => panic!("scripted panic"),
        }
    }
}

pub(crate) fn unique_violation() -> DbError {
    DbError::Statement {
        code: Some(super::error::UNIQUE_VIOLATION.to_string()),
        message: "duplicate key value violates unique constraint".to_string(),
    }
}
