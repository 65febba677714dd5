// Copyright 2025 Alexandre D. Díaz
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Transaction;

use crate::config::EngineOptions;
use crate::error::DbError;
use crate::Pool;

pub static DB_FILE_NAME: &str = "crime.db";

fn echo_statement(sql: &str) {
    log::info!(target: "crimedb::echo", "{}", sql);
}

/// Unit-of-work handle: one pooled connection with an open transaction.
pub struct Session<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> Deref for Session<'conn> {
    type Target = rusqlite::Connection;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

/// Owns the engine (connection manager) and the session factory (pool).
pub struct CrimeDb {
    db_path: PathBuf,
    options: EngineOptions,
    pool: Pool,
}

impl fmt::Debug for CrimeDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrimeDb")
            .field("db_path", &self.db_path)
            .field("options", &self.options)
            .finish()
    }
}

impl CrimeDb {
    /// Opens `crime.db` in the working directory.
    pub fn new(options: EngineOptions) -> Result<CrimeDb, DbError> {
        CrimeDb::with_path(DB_FILE_NAME, options)
    }

    pub(crate) fn with_path<P: AsRef<Path>>(
        db_path: P,
        options: EngineOptions,
    ) -> Result<CrimeDb, DbError> {
        let db_path = db_path.as_ref().to_path_buf();
        let echo = options.get_echo();
        let busy_timeout = *options.get_busy_timeout();
        let pragmas = options.get_pragmas().clone();
        let manager = SqliteConnectionManager::file(&db_path).with_init(move |conn| {
            if echo {
                conn.trace(Some(echo_statement));
            }
            conn.busy_timeout(busy_timeout)?;
            for (name, value) in &pragmas {
                conn.pragma_update(None, name, value)?;
            }
            Ok(())
        });
        let pool = r2d2::Pool::builder()
            .max_size(*options.get_pool_max_size())
            .connection_timeout(*options.get_connection_timeout())
            .build(manager)?;
        log::info!("Database engine ready at '{}'", db_path.display());
        Ok(CrimeDb {
            db_path,
            options,
            pool,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Number of sessions currently checked out of the pool.
    pub fn open_sessions(&self) -> u32 {
        let state = self.pool.state();
        state.connections - state.idle_connections
    }

    /// Runs `work` inside a transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back and hands back the error
    /// untouched when it returns `Err`. A panic inside `work` rolls back when
    /// the transaction is dropped. The connection goes back to the pool on
    /// every path.
    pub fn session_scope<F, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&Session) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut conn = self.pool.get().map_err(DbError::from)?;
        let tx = conn.transaction().map_err(DbError::from)?;
        let session = Session { tx };
        log::debug!("Session opened");
        match work(&session) {
            Ok(result) => {
                session.tx.commit().map_err(DbError::from)?;
                log::debug!("Session committed");
                Ok(result)
            }
            Err(err) => {
                if let Err(rollback_err) = session.tx.rollback() {
                    log::warn!("Session rollback failed: {}", rollback_err);
                } else {
                    log::debug!("Session rolled back");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models;
    use crate::models::crime::{self, NewCrime};
    use chrono::NaiveDate;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    pub(crate) fn open_temp_db(options: EngineOptions) -> (TempDir, CrimeDb) {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = tempfile::tempdir().unwrap();
        let db = CrimeDb::with_path(dir.path().join(DB_FILE_NAME), options).unwrap();
        db.session_scope(|s| models::prepare_schema(s).map_err(DbError::from))
            .unwrap();
        (dir, db)
    }

    pub(crate) fn sample_crime() -> NewCrime {
        NewCrime {
            lsoa_code: "E01000001".to_string(),
            borough: "Croydon".to_string(),
            major_category: "Burglary".to_string(),
            minor_category: "Burglary in a Dwelling".to_string(),
            value: 1,
            year: 2015,
            month: 3,
            created_at: NaiveDate::from_ymd_opt(2015, 3, 31)
                .unwrap()
                .and_hms_micro_opt(23, 59, 1, 250)
                .unwrap(),
        }
    }

    #[derive(Debug)]
    enum WorkError {
        Db(DbError),
        Aborted(&'static str),
    }

    impl From<DbError> for WorkError {
        fn from(err: DbError) -> Self {
            WorkError::Db(err)
        }
    }

    fn count_rows(db: &CrimeDb) -> i64 {
        db.session_scope(|s| crime::count(s).map_err(DbError::from))
            .unwrap()
    }

    #[test]
    fn test_commit_is_visible_to_next_session() {
        let (_dir, db) = open_temp_db(EngineOptions::default());
        let new_crime = sample_crime();
        let added = db
            .session_scope(|s| crime::add(s, &new_crime).map_err(DbError::from))
            .unwrap();
        assert!(added.id > 0);

        let found = db
            .session_scope(|s| crime::get_by_id(s, &added.id).map_err(DbError::from))
            .unwrap()
            .expect("committed row must be readable");
        assert_eq!(found, added);
        assert_eq!(found.lsoa_code, "E01000001");
        assert_eq!(found.borough, "Croydon");
        assert_eq!(found.major_category, "Burglary");
        assert_eq!(found.minor_category, "Burglary in a Dwelling");
        assert_eq!(found.value, 1);
        assert_eq!(found.year, 2015);
        assert_eq!(found.month, 3);
        assert_eq!(found.created_at, new_crime.created_at);
        assert_eq!(db.open_sessions(), 0);
    }

    #[test]
    fn test_failure_rolls_back_and_keeps_error() {
        let (_dir, db) = open_temp_db(EngineOptions::default());
        let new_crime = sample_crime();
        let res: Result<(), WorkError> = db.session_scope(|s| {
            crime::add(s, &new_crime).map_err(DbError::from)?;
            crime::add(s, &new_crime).map_err(DbError::from)?;
            Err(WorkError::Aborted("stop"))
        });
        assert!(matches!(res, Err(WorkError::Aborted("stop"))));
        assert_eq!(count_rows(&db), 0);
        assert_eq!(db.open_sessions(), 0);
    }

    #[test]
    fn test_constraint_failure_rolls_back_earlier_writes() {
        let (_dir, db) = open_temp_db(EngineOptions::default());
        let good = sample_crime();
        let mut bad = sample_crime();
        bad.lsoa_code = "E0100000123".to_string();
        let res: Result<crime::Model, WorkError> = db.session_scope(|s| {
            crime::add(s, &good).map_err(DbError::from)?;
            Ok(crime::add(s, &bad).map_err(DbError::from)?)
        });
        assert!(matches!(res, Err(WorkError::Db(DbError::Sqlite(_)))));
        assert_eq!(count_rows(&db), 0);
    }

    #[test]
    fn test_panic_releases_session() {
        let (_dir, db) = open_temp_db(EngineOptions::default());
        let new_crime = sample_crime();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), DbError> = db.session_scope(|s| {
                crime::add(s, &new_crime)?;
                panic!("unit of work blew up");
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(db.open_sessions(), 0);
        assert_eq!(count_rows(&db), 0);
    }

    #[test]
    fn test_concurrent_sessions_are_isolated_connections() {
        let (_dir, db) = open_temp_db(EngineOptions::default());
        let db = Arc::new(db);
        let handles = (0..4)
            .map(|_| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    db.session_scope(|s| crime::add(s, &sample_crime()).map_err(DbError::from))
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(count_rows(&db), 4);
        assert_eq!(db.open_sessions(), 0);
    }

    #[test]
    fn test_pragmas_applied_to_connections() {
        let options = EngineOptions::from_pairs([("user_version", "7"), ("echo", "true")]).unwrap();
        let (_dir, db) = open_temp_db(options);
        let version: i64 = db
            .session_scope(|s| {
                s.query_row("PRAGMA user_version", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .unwrap();
        assert_eq!(version, 7);
        assert!(db.options().get_echo());
    }
}
