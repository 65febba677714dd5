// Copyright 2025 Alexandre D. Díaz
use chrono::{NaiveDateTime, ParseResult, Utc};

static SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn to_sqlite_datetime(dt: &NaiveDateTime) -> String {
    dt.format(SQLITE_DATETIME_FORMAT).to_string()
}

pub fn from_sqlite_datetime(value: &str) -> ParseResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, SQLITE_DATETIME_FORMAT)
}

pub fn get_utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}
