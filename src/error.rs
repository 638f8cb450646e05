//! Error types shared by the storage layer and the models it validates.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("wordbook name is required")]
    EmptyName,
    #[error("wordbook name is too long ({0} characters, max 100)")]
    NameTooLong(usize),
    #[error("a wordbook named '{0}' already exists")]
    DuplicateName(String),
    #[error("total days must be a positive integer")]
    NoDays,
    #[error("word text is required")]
    EmptyWord,
    #[error("days are numbered from 1")]
    ZeroDay,
    #[error("day {day} is outside the wordbook's 1..={total_days} days")]
    DayOutOfRange { day: u32, total_days: u32 },
    #[error("no report ids given")]
    NoReportsSelected,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

pub type DbResult<T> = Result<T, DbError>;
