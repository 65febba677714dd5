// Copyright 2025 Alexandre D. Díaz
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result, Row, ToSql};
use serde::{Deserialize, Serialize};

use crate::utils::date::{from_sqlite_datetime, to_sqlite_datetime};

pub static TABLE_NAME: &str = "crimes";

pub const LSOA_CODE_MAX_LEN: usize = 10;
pub const NAME_MAX_LEN: usize = 50;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Model {
    pub id: i64,
    pub lsoa_code: String,
    pub borough: String,
    pub major_category: String,
    pub minor_category: String,
    pub value: i64,
    pub year: i64,
    pub month: i64,
    pub created_at: NaiveDateTime,
}

/// A crime observation that has not been stored yet.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct NewCrime {
    pub lsoa_code: String,
    pub borough: String,
    pub major_category: String,
    pub minor_category: String,
    pub value: i64,
    pub year: i64,
    pub month: i64,
    pub created_at: NaiveDateTime,
}

pub fn create_table(conn: &Connection) -> Result<usize, rusqlite::Error> {
    conn.execute(
        format!(
            "CREATE TABLE IF NOT EXISTS {0} (
            id integer primary key,
            lsoa_code varchar({1}) not null check(length(lsoa_code) <= {1}),
            borough varchar({2}) not null check(length(borough) <= {2}),
            major_category varchar({2}) not null check(length(major_category) <= {2}),
            minor_category varchar({2}) not null check(length(minor_category) <= {2}),
            value integer not null,
            year integer not null,
            month integer not null,
            created_at datetime not null
        )",
            &TABLE_NAME, LSOA_CODE_MAX_LEN, NAME_MAX_LEN
        )
        .as_str(),
        params![],
    )
}

fn from_row(row: &Row) -> Result<Model, rusqlite::Error> {
    let created_at: String = row.get(8)?;
    let created_at = from_sqlite_datetime(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;
    Ok(Model {
        id: row.get(0)?,
        lsoa_code: row.get(1)?,
        borough: row.get(2)?,
        major_category: row.get(3)?,
        minor_category: row.get(4)?,
        value: row.get(5)?,
        year: row.get(6)?,
        month: row.get(7)?,
        created_at,
    })
}

fn query(
    conn: &Connection,
    extra_sql: &str,
    params: &[&dyn ToSql],
) -> Result<Vec<Model>, rusqlite::Error> {
    let sql: String = format!(
        "SELECT cr.id, cr.lsoa_code, cr.borough, cr.major_category, cr.minor_category, \
    cr.value, cr.year, cr.month, cr.created_at \
    FROM {} as cr \
    {}",
        &TABLE_NAME, &extra_sql
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, from_row)?;
    rows.collect::<Result<Vec<Model>, rusqlite::Error>>()
}

pub fn get_by_id(conn: &Connection, crime_id: &i64) -> Result<Option<Model>, rusqlite::Error> {
    let mut crimes = query(conn, "WHERE cr.id = ?1 LIMIT 1", params![&crime_id])?;
    Ok(crimes.pop())
}

pub fn count(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.query_row(
        format!("SELECT COUNT(*) FROM {}", &TABLE_NAME).as_str(),
        params![],
        |row| row.get(0),
    )
}

pub fn add(conn: &Connection, crime: &NewCrime) -> Result<Model, rusqlite::Error> {
    conn.execute(
        format!(
            "INSERT INTO {}(lsoa_code, borough, major_category, minor_category, value, year, month, created_at) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            &TABLE_NAME
        )
        .as_str(),
        params![
            &crime.lsoa_code,
            &crime.borough,
            &crime.major_category,
            &crime.minor_category,
            &crime.value,
            &crime.year,
            &crime.month,
            &to_sqlite_datetime(&crime.created_at),
        ],
    )?;
    Ok(Model {
        id: conn.last_insert_rowid(),
        lsoa_code: crime.lsoa_code.clone(),
        borough: crime.borough.clone(),
        major_category: crime.major_category.clone(),
        minor_category: crime.minor_category.clone(),
        value: crime.value,
        year: crime.year,
        month: crime.month,
        created_at: crime.created_at,
    })
}
