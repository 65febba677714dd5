// Copyright 2025 Alexandre D. Díaz
use once_cell::sync::OnceCell;

use crate::config::EngineOptions;
use crate::conn::CrimeDb;
use crate::error::DbError;

/// Holds the connection manager of a process once it has been initialised.
///
/// The entry point creates one registry and passes it (or the [`CrimeDb`]
/// obtained from it) to whatever needs the database.
#[derive(Debug, Default)]
pub struct DbRegistry {
    db: OnceCell<CrimeDb>,
}

impl DbRegistry {
    pub fn new() -> DbRegistry {
        DbRegistry { db: OnceCell::new() }
    }

    /// Creates the connection manager. Later calls only log and keep the first one.
    pub fn init(&self, options: EngineOptions) -> Result<(), DbError> {
        self.init_with(|| CrimeDb::new(options))
    }

    pub(crate) fn init_with<F>(&self, build: F) -> Result<(), DbError>
    where
        F: FnOnce() -> Result<CrimeDb, DbError>,
    {
        if self.db.get().is_some() {
            log::info!("Database already initialised");
            return Ok(());
        }
        let mut built = false;
        self.db.get_or_try_init(|| {
            log::info!("Initializing database");
            built = true;
            build()
        })?;
        if !built {
            log::info!("Database already initialised");
        }
        Ok(())
    }

    pub fn get(&self) -> Result<&CrimeDb, DbError> {
        self.db.get().ok_or(DbError::Uninitialized)
    }
}
