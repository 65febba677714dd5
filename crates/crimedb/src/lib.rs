// Copyright 2025 Alexandre D. Díaz
pub mod config;
pub mod conn;
pub mod error;
pub mod models;
pub mod registry;
pub mod utils;

pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

pub use config::EngineOptions;
pub use conn::{CrimeDb, Session};
pub use error::DbError;
pub use registry::DbRegistry;
