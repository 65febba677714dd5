// Copyright 2025 Alexandre D. Díaz
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// The registry was read before `init` stored a connection manager.
    #[error("Database hasn't been initialised")]
    Uninitialized,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid value '{value}' for engine option '{key}'")]
    InvalidOption { key: String, value: String },
}
