// Copyright 2025 Alexandre D. Díaz
use argparse::{ArgumentParser, Collect, List, Store, StoreTrue};

use crimedb::{DbError, EngineOptions};

#[derive(Debug)]
pub struct CrimesConfig {
    command: String,
    args: Vec<String>,
    engine_options: Vec<String>,
    echo: bool,
}

impl CrimesConfig {
    pub fn new() -> CrimesConfig {
        let mut command = String::new();
        let mut args: Vec<String> = Vec::new();
        let mut engine_options: Vec<String> = Vec::new();
        let mut echo = false;
        {
            let mut ap = ArgumentParser::new();
            ap.set_description("Store and read crime records in ./crime.db");
            ap.refer(&mut engine_options).add_option(
                &["-o", "--option"],
                Collect,
                "Engine option as key=value (repeatable)",
            );
            ap.refer(&mut echo)
                .add_option(&["--echo"], StoreTrue, "Log every SQL statement");
            ap.refer(&mut command)
                .add_argument("command", Store, "init | add | show | count")
                .required();
            ap.refer(&mut args)
                .add_argument("arguments", List, "Arguments for the command");
            ap.stop_on_first_argument(true);
            ap.parse_args_or_exit();
        }
        CrimesConfig {
            command,
            args,
            engine_options,
            echo,
        }
    }

    pub fn get_command(&self) -> &String {
        &self.command
    }

    pub fn get_args(&self) -> &Vec<String> {
        &self.args
    }

    /// Settings file and environment first, then `-o` pairs, then `--echo`.
    pub fn engine_options(&self) -> Result<EngineOptions, DbError> {
        let mut options = EngineOptions::from_settings()?;
        for raw in &self.engine_options {
            let (key, value) = raw.split_once('=').ok_or_else(|| DbError::InvalidOption {
                key: raw.to_string(),
                value: String::new(),
            })?;
            options.set(key, value)?;
        }
        if self.echo {
            options = options.with_echo(true);
        }
        Ok(options)
    }
}
