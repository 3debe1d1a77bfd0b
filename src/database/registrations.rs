//! Registration repository
//!
//! Tracks which chat channels are registered against which ladder ids in
//! `registered_channels (id, channel, ladder_id)`. Both `channel` and
//! `ladder_id` carry unique constraints; a row is either present
//! (registered) or absent, never updated in place.

use serde::Serialize;

use super::error::DbError;
use super::executor::{Column, QueryExecutor, Table};
use super::pool::ConnectionPool;
use super::row::SqlValue;

const TABLE: Table = Table::RegisteredChannels;

/// Result of looking for an existing registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCheck {
    NoMatch,
    /// The channel is already registered. Reported even when the ladder id
    /// matches the same row.
    ChannelConflict,
    /// The ladder id is registered under a different channel.
    IdConflict,
}

impl DuplicateCheck {
    pub fn found(self) -> bool {
        !matches!(self, DuplicateCheck::NoMatch)
    }
}

/// Result of inserting a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted { rows: u64 },
    /// The database rejected the row with a unique violation.
    Conflict { code: String },
}

/// Result of the check-then-insert registration workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered,
    AlreadyRegistered(DuplicateCheck),
    /// Another registration won the race between check and insert.
    Conflict { code: String },
}

pub struct RegistrationRepo<P> {
    executor: QueryExecutor<P>,
}

impl<P: ConnectionPool> RegistrationRepo<P> {
    pub fn new(pool: P) -> Self {
        Self {
            executor: QueryExecutor::new(pool),
        }
    }

    pub fn executor(&self) -> &QueryExecutor<P> {
        &self.executor
    }

    /// Channel names of every registration, in row order.
    pub async fn load_registered_users(&self) -> Result<Vec<String>, DbError> {
        let result = self
            .executor
            .select(TABLE, &[Column::Id, Column::Channel], &[], &[])
            .await?;

        let channels: Vec<String> = result
            .rows
            .iter()
            .filter_map(|row| row.get_text(Column::Channel.as_str()))
            .map(str::to_string)
            .collect();
        tracing::debug!(count = channels.len(), "Loaded registered channels");
        Ok(channels)
    }

    /// Look for an existing registration of `channel` or `ladder_id`.
    ///
    /// The channel is checked first and the ladder id only when the channel
    /// is free, so a channel match always wins.
    pub async fn check_user_or_id_repeated(
        &self,
        channel: &str,
        ladder_id: i64,
    ) -> Result<DuplicateCheck, DbError> {
        let by_channel = self
            .executor
            .select(TABLE, &[Column::Channel], &[Column::Channel], &[channel.into()])
            .await?;
        if !by_channel.is_empty() {
            return Ok(DuplicateCheck::ChannelConflict);
        }

        let by_id = self
            .executor
            .select(TABLE, &[Column::LadderId], &[Column::LadderId], &[ladder_id.into()])
            .await?;
        if !by_id.is_empty() {
            return Ok(DuplicateCheck::IdConflict);
        }

        Ok(DuplicateCheck::NoMatch)
    }

    /// Insert `(channel, ladder_id)`.
    ///
    /// A unique violation is returned as [`InsertOutcome::Conflict`]; every
    /// other database error is propagated.
    pub async fn insert_new_channel_ladder_id(
        &self,
        username: &str,
        ladder_id: i64,
    ) -> Result<InsertOutcome, DbError> {
        let values: [SqlValue; 2] = [username.into(), ladder_id.into()];
        match self
            .executor
            .insert(TABLE, &[Column::Channel, Column::LadderId], &values)
            .await
        {
            Ok(result) => {
                tracing::info!(channel = username, ladder_id, "Registered channel");
                Ok(InsertOutcome::Inserted {
                    rows: result.row_count,
                })
            }
            Err(e) if e.is_unique_violation() => {
                tracing::warn!(channel = username, ladder_id, "Channel or ladder id already registered");
                Ok(InsertOutcome::Conflict {
                    code: e.code().unwrap_or_default().to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Remove the registration of `username`. Returns the number of rows
    /// removed, which is zero when the channel was not registered.
    pub async fn delete_registered_user(&self, username: &str) -> Result<u64, DbError> {
        let result = self
            .executor
            .delete(TABLE, &[Column::Channel], &[username.into()])
            .await?;
        tracing::info!(channel = username, rows = result.row_count, "Removed registration");
        Ok(result.row_count)
    }

    /// Check for duplicates, then insert.
    pub async fn register(
        &self,
        channel: &str,
        ladder_id: i64,
    ) -> Result<RegistrationOutcome, DbError> {
        let check = self.check_user_or_id_repeated(channel, ladder_id).await?;
        if check.found() {
            return Ok(RegistrationOutcome::AlreadyRegistered(check));
        }

        Ok(match self.insert_new_channel_ladder_id(channel, ladder_id).await? {
            InsertOutcome::Inserted { .. } => RegistrationOutcome::Registered,
            InsertOutcome::Conflict { code } => RegistrationOutcome::Conflict { code },
        })
    }
}
