// Copyright 2025 Alexandre D. Díaz
pub mod crime;

use rusqlite::Connection;

pub fn prepare_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    crime::create_table(conn)?;
    Ok(())
}
