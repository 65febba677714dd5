// Copyright 2025 Alexandre D. Díaz
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, ConfigError};

use crate::error::DbError;

/// Engine tuning accepted by [`crate::CrimeDb::new`].
///
/// Known keys map to fields; every other key is kept as a SQLite pragma and
/// applied to each connection the pool opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    echo: bool,
    pool_max_size: u32,
    connection_timeout: Duration,
    busy_timeout: Duration,
    pragmas: BTreeMap<String, String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            echo: false,
            pool_max_size: 15,
            connection_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_millis(5000),
            pragmas: BTreeMap::new(),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, DbError> {
    value.trim().parse::<T>().map_err(|_| DbError::InvalidOption {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl EngineOptions {
    /// Loads options from `./crimedb.*` (optional) and `CRIMEDB_*` variables.
    pub fn from_settings() -> Result<EngineOptions, DbError> {
        let settings = Config::builder()
            .add_source(config::File::with_name("./crimedb").required(false))
            .add_source(config::Environment::with_prefix("CRIMEDB"))
            .build()?;

        let mut options = EngineOptions::default();
        for key in ["echo", "pool_max_size", "connection_timeout", "busy_timeout"] {
            match settings.get_string(key) {
                Ok(value) => {
                    options.set(key, &value)?;
                }
                Err(ConfigError::NotFound(_)) => {}
                Err(_) => {
                    return Err(DbError::InvalidOption {
                        key: key.to_string(),
                        value: String::new(),
                    })
                }
            }
        }
        match settings.get_table("pragmas") {
            Ok(pragmas) => {
                for (name, value) in pragmas {
                    options.pragmas.insert(name, value.to_string());
                }
            }
            Err(ConfigError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        Ok(options)
    }

    /// Builds options from `key=value` pairs on top of the defaults.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<EngineOptions, DbError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut options = EngineOptions::default();
        for (key, value) in pairs {
            options.set(key, value)?;
        }
        Ok(options)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<&mut Self, DbError> {
        match key.trim() {
            "echo" => self.echo = parse_value(key, value)?,
            "pool_max_size" => {
                let size: u32 = parse_value(key, value)?;
                if size == 0 {
                    return Err(DbError::InvalidOption {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.pool_max_size = size;
            }
            "connection_timeout" => {
                self.connection_timeout = Duration::from_secs(parse_value(key, value)?)
            }
            "busy_timeout" => self.busy_timeout = Duration::from_millis(parse_value(key, value)?),
            "" => {
                return Err(DbError::InvalidOption {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
            pragma => {
                self.pragmas.insert(pragma.to_string(), value.trim().to_string());
            }
        }
        Ok(self)
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn get_echo(&self) -> bool {
        self.echo
    }

    pub fn get_pool_max_size(&self) -> &u32 {
        &self.pool_max_size
    }

    pub fn get_connection_timeout(&self) -> &Duration {
        &self.connection_timeout
    }

    pub fn get_busy_timeout(&self) -> &Duration {
        &self.busy_timeout
    }

    pub fn get_pragmas(&self) -> &BTreeMap<String, String> {
        &self.pragmas
    }
}
