// Copyright 2025 Alexandre D. Díaz
mod config;

use std::fmt;
use std::process;

use crimedb::models::{self, crime};
use crimedb::utils::date::get_utc_now;
use crimedb::{CrimeDb, DbError, DbRegistry};

use config::CrimesConfig;

#[derive(Debug)]
enum CommandError {
    Db(DbError),
    Usage(String),
    NotFound(i64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Db(err) => write!(f, "{}", err),
            CommandError::Usage(msg) => write!(f, "{}", msg),
            CommandError::NotFound(id) => write!(f, "No crime record with id {}", id),
        }
    }
}

impl From<DbError> for CommandError {
    fn from(err: DbError) -> Self {
        CommandError::Db(err)
    }
}

impl From<rusqlite::Error> for CommandError {
    fn from(err: rusqlite::Error) -> Self {
        CommandError::Db(DbError::from(err))
    }
}

fn parse_int(name: &str, value: &str) -> Result<i64, CommandError> {
    value
        .parse::<i64>()
        .map_err(|_| CommandError::Usage(format!("'{}' must be an integer, got '{}'", name, value)))
}

fn expect_args(command: &str, args: &[String], count: usize) -> Result<(), CommandError> {
    if args.len() != count {
        return Err(CommandError::Usage(format!(
            "'{}' takes {} argument(s), got {}",
            command,
            count,
            args.len()
        )));
    }
    Ok(())
}

fn run(db: &CrimeDb, command: &str, args: &[String]) -> Result<(), CommandError> {
    match command {
        "init" => {
            expect_args(command, args, 0)?;
            db.session_scope(|s| {
                models::prepare_schema(s)?;
                Ok::<(), CommandError>(())
            })?;
            log::info!("Schema ready in '{}'", db.path().display());
        }
        "add" => {
            expect_args(command, args, 7)?;
            let new_crime = crime::NewCrime {
                lsoa_code: args[0].clone(),
                borough: args[1].clone(),
                major_category: args[2].clone(),
                minor_category: args[3].clone(),
                value: parse_int("value", &args[4])?,
                year: parse_int("year", &args[5])?,
                month: parse_int("month", &args[6])?,
                created_at: get_utc_now(),
            };
            let added = db.session_scope(|s| {
                crime::add(s, &new_crime).map_err(CommandError::from)
            })?;
            log::info!("Crime record {} added", added.id);
            println!("{}", serde_json::to_string_pretty(&added).unwrap_or_default());
        }
        "show" => {
            expect_args(command, args, 1)?;
            let crime_id = parse_int("id", &args[0])?;
            let found = db.session_scope(|s| {
                crime::get_by_id(s, &crime_id)?.ok_or(CommandError::NotFound(crime_id))
            })?;
            println!("{}", serde_json::to_string_pretty(&found).unwrap_or_default());
        }
        "count" => {
            expect_args(command, args, 0)?;
            let total = db.session_scope(|s| crime::count(s).map_err(CommandError::from))?;
            println!("{}", total);
        }
        other => {
            return Err(CommandError::Usage(format!("Unknown command '{}'", other)));
        }
    }
    Ok(())
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let config = CrimesConfig::new();

    let options = match config.engine_options() {
        Ok(options) => options,
        Err(err) => {
            log::error!("{}", err);
            process::exit(1);
        }
    };

    let registry = DbRegistry::new();
    if let Err(err) = registry.init(options) {
        log::error!("Can't open the database: {}", err);
        process::exit(1);
    }
    let res = registry
        .get()
        .map_err(CommandError::from)
        .and_then(|db| run(db, config.get_command(), config.get_args()));
    if let Err(err) = res {
        log::error!("{}", err);
        process::exit(1);
    }
}
