//! Ladder Bot Rust Core
//!
//! Data access and remote lookups for the ladder bot.
//! This library tracks which chat channels are registered against
//! which ladder ids, and proxies read-only queries to the ladder API.

pub mod config;
pub mod database;
pub mod ladder;
pub mod logging;

pub use config::{Config, ConfigError};
pub use database::{
    create_pool, DbError, DuplicateCheck, InsertOutcome, PoolConfig, RegistrationOutcome,
    RegistrationRepo,
};
pub use ladder::{LadderClient, LadderConfig, LadderError, LadderResponse};
