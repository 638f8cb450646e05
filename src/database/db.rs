//! Database operations for the wordbook catalogue
//!
//! Handles SQLite schema initialization, CRUD operations for wordbooks and words,
//! and the day offset added to the wall clock when scheduling.

use crate::error::{DbError, DbResult, ValidationError};
use crate::models::{Clock, NewWord, NewWordbook, Word, Wordbook, WordbookContents};
use chrono::{Days, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS wordbooks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        total_days INTEGER NOT NULL,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        wordbook_id INTEGER NOT NULL REFERENCES wordbooks(id) ON DELETE CASCADE,
        english TEXT NOT NULL,
        korean TEXT NOT NULL,
        day INTEGER NOT NULL,
        UNIQUE(wordbook_id, day, english)
    );

    CREATE TABLE IF NOT EXISTS user_progress (
        user_id TEXT NOT NULL,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        wordbook_id INTEGER NOT NULL REFERENCES wordbooks(id) ON DELETE CASCADE,
        status TEXT NOT NULL,
        interval_days INTEGER NOT NULL DEFAULT 1,
        ease_factor REAL NOT NULL DEFAULT 2.5,
        consecutive_correct INTEGER NOT NULL DEFAULT 0,
        review_count INTEGER NOT NULL DEFAULT 0,
        last_review_date TEXT NOT NULL,
        next_review_date TEXT NOT NULL,
        PRIMARY KEY (user_id, word_id)
    );

    CREATE TABLE IF NOT EXISTS review_log (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        judgment TEXT NOT NULL,
        reviewed_on TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS word_reports (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        wordbook_id INTEGER NOT NULL REFERENCES wordbooks(id) ON DELETE CASCADE,
        day INTEGER NOT NULL,
        original_english TEXT NOT NULL,
        original_korean TEXT NOT NULL,
        reported_english TEXT NOT NULL,
        reported_korean TEXT NOT NULL,
        user_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS review_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS session_reviews (
        session_id INTEGER NOT NULL REFERENCES review_sessions(id) ON DELETE CASCADE,
        word_id INTEGER NOT NULL REFERENCES words(id) ON DELETE CASCADE,
        is_correct INTEGER NOT NULL,
        PRIMARY KEY (session_id, word_id)
    );

    CREATE TABLE IF NOT EXISTS app_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_progress_due ON user_progress(user_id, wordbook_id, next_review_date);
    CREATE INDEX IF NOT EXISTS idx_review_log_user ON review_log(user_id, reviewed_on);
    CREATE INDEX IF NOT EXISTS idx_words_wordbook ON words(wordbook_id, day);
"#;

/// Opens (or creates) the database file and makes sure the schema exists.
pub fn init_database(path: &Path) -> DbResult<Connection> {
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!(path = %path.display(), "database ready");
    Ok(conn)
}

/// In-memory database with the full schema, for tests and dry runs
pub fn init_in_memory() -> DbResult<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(SCHEMA)?;
    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('day_offset', '0')",
        [],
    )?;
    Ok(())
}

/// Days the app has been moved ahead of the wall clock with `advance_day`
pub fn day_offset(conn: &Connection) -> DbResult<u32> {
    let offset: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'day_offset'",
        [],
        |row| row.get(0),
    )?;
    offset
        .parse()
        .map_err(|_| DbError::InvalidTransition(format!("corrupt day offset '{offset}'")))
}

/// The app's "today": the clock's date plus the stored day offset
pub fn current_date(conn: &Connection, clock: &impl Clock) -> DbResult<NaiveDate> {
    let offset = day_offset(conn)?;
    clock
        .today()
        .checked_add_days(Days::new(u64::from(offset)))
        .ok_or_else(|| DbError::InvalidTransition("calendar overflow".to_string()))
}

/// Moves the app's date one day ahead of the clock (for trying out the schedule)
pub fn advance_day(conn: &Connection, clock: &impl Clock) -> DbResult<NaiveDate> {
    let offset = day_offset(conn)?
        .checked_add(1)
        .ok_or_else(|| DbError::InvalidTransition("calendar overflow".to_string()))?;

    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'day_offset'",
        params![offset.to_string()],
    )?;
    let next_day = current_date(conn, clock)?;
    debug!(offset, %next_day, "advanced simulated date");
    Ok(next_day)
}

pub(crate) fn wordbook_from_row(row: &Row<'_>) -> rusqlite::Result<Wordbook> {
    Ok(Wordbook {
        id: row.get(0)?,
        name: row.get(1)?,
        total_days: row.get(2)?,
        description: row.get(3)?,
    })
}

pub(crate) fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        wordbook_id: row.get(1)?,
        english: row.get(2)?,
        korean: row.get(3)?,
        day: row.get(4)?,
    })
}

fn ensure_unique_name(conn: &Connection, name: &str, except_id: Option<i64>) -> DbResult<()> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM wordbooks WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) if Some(id) != except_id => {
            Err(ValidationError::DuplicateName(name.to_string()).into())
        }
        _ => Ok(()),
    }
}

/// Creates a new, empty wordbook
pub fn create_wordbook(conn: &Connection, wordbook: &NewWordbook) -> DbResult<Wordbook> {
    wordbook.validate()?;
    let name = wordbook.name.trim();
    ensure_unique_name(conn, name, None)?;

    conn.execute(
        "INSERT INTO wordbooks (name, total_days, description) VALUES (?1, ?2, ?3)",
        params![name, wordbook.total_days, wordbook.description],
    )?;
    let id = conn.last_insert_rowid();

    info!(id, wordbook = name, "wordbook created");
    get_wordbook(conn, id)
}

/// Replaces a wordbook's name, day count and description.
///
/// The day count cannot shrink below a day that still has words.
pub fn update_wordbook(conn: &Connection, id: i64, wordbook: &NewWordbook) -> DbResult<Wordbook> {
    wordbook.validate()?;
    get_wordbook(conn, id)?;
    let name = wordbook.name.trim();
    ensure_unique_name(conn, name, Some(id))?;

    let max_day: Option<u32> = conn.query_row(
        "SELECT MAX(day) FROM words WHERE wordbook_id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    if let Some(day) = max_day.filter(|&day| day > wordbook.total_days) {
        return Err(ValidationError::DayOutOfRange {
            day,
            total_days: wordbook.total_days,
        }
        .into());
    }

    conn.execute(
        "UPDATE wordbooks SET name = ?2, total_days = ?3, description = ?4 WHERE id = ?1",
        params![id, name, wordbook.total_days, wordbook.description],
    )?;
    get_wordbook(conn, id)
}

/// Deletes a wordbook with its words, progress and reports
pub fn delete_wordbook(conn: &Connection, id: i64) -> DbResult<()> {
    let deleted = conn.execute("DELETE FROM wordbooks WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("wordbook {id}")));
    }
    info!(id, "wordbook deleted");
    Ok(())
}

pub fn get_wordbook(conn: &Connection, id: i64) -> DbResult<Wordbook> {
    conn.query_row(
        "SELECT id, name, total_days, description FROM wordbooks WHERE id = ?1",
        params![id],
        wordbook_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("wordbook {id}")))
}

pub fn list_wordbooks(conn: &Connection) -> DbResult<Vec<Wordbook>> {
    let mut stmt =
        conn.prepare("SELECT id, name, total_days, description FROM wordbooks ORDER BY name")?;
    let wordbooks = stmt
        .query_map([], wordbook_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(wordbooks)
}

/// Adds a word to a wordbook
///
/// If the same english text already exists on that day, the existing word is returned
/// unchanged due to the UNIQUE constraint.
pub fn add_word(conn: &Connection, wordbook_id: i64, word: &NewWord) -> DbResult<Word> {
    let wordbook = get_wordbook(conn, wordbook_id)?;
    NewWordbook::from(&wordbook).validate_word(word)?;

    conn.execute(
        "INSERT OR IGNORE INTO words (wordbook_id, english, korean, day) VALUES (?1, ?2, ?3, ?4)",
        params![wordbook_id, word.english.trim(), word.korean.trim(), word.day],
    )?;

    let stored = conn.query_row(
        "SELECT id, wordbook_id, english, korean, day FROM words
         WHERE wordbook_id = ?1 AND day = ?2 AND english = ?3",
        params![wordbook_id, word.day, word.english.trim()],
        word_from_row,
    )?;
    Ok(stored)
}

pub fn get_word(conn: &Connection, id: i64) -> DbResult<Word> {
    conn.query_row(
        "SELECT id, wordbook_id, english, korean, day FROM words WHERE id = ?1",
        params![id],
        word_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("word {id}")))
}

pub fn update_word(conn: &Connection, id: i64, word: &NewWord) -> DbResult<Word> {
    let existing = get_word(conn, id)?;
    let wordbook = get_wordbook(conn, existing.wordbook_id)?;
    NewWordbook::from(&wordbook).validate_word(word)?;

    conn.execute(
        "UPDATE words SET english = ?2, korean = ?3, day = ?4 WHERE id = ?1",
        params![id, word.english.trim(), word.korean.trim(), word.day],
    )?;
    get_word(conn, id)
}

/// Deletes a word along with its progress rows and reports
pub fn delete_word(conn: &Connection, id: i64) -> DbResult<()> {
    let deleted = conn.execute("DELETE FROM words WHERE id = ?1", params![id])?;
    if deleted == 0 {
        return Err(DbError::NotFound(format!("word {id}")));
    }
    Ok(())
}

/// Retrieves the words of a wordbook, optionally only one day, ordered by day
pub fn words_for_wordbook(
    conn: &Connection,
    wordbook_id: i64,
    day: Option<u32>,
) -> DbResult<Vec<Word>> {
    let mut stmt = conn.prepare(
        "SELECT id, wordbook_id, english, korean, day FROM words
         WHERE wordbook_id = ?1 AND (?2 IS NULL OR day = ?2)
         ORDER BY day, id",
    )?;
    let words = stmt
        .query_map(params![wordbook_id, day], word_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

/// Case-insensitive substring search over both sides of a wordbook's words
pub fn search_words(conn: &Connection, wordbook_id: i64, query: &str) -> DbResult<Vec<Word>> {
    let pattern = format!("%{}%", query.trim());
    let mut stmt = conn.prepare(
        "SELECT id, wordbook_id, english, korean, day FROM words
         WHERE wordbook_id = ?1 AND (english LIKE ?2 OR korean LIKE ?2)
         ORDER BY day, id",
    )?;
    let words = stmt
        .query_map(params![wordbook_id, pattern], word_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

/// Loads a wordbook with all of its words
pub fn load_wordbook_contents(conn: &Connection, wordbook_id: i64) -> DbResult<WordbookContents> {
    let wordbook = get_wordbook(conn, wordbook_id)?;
    let words = words_for_wordbook(conn, wordbook_id, None)?
        .into_iter()
        .map(|word| NewWord {
            english: word.english,
            korean: word.korean,
            day: word.day,
        })
        .collect();

    Ok(WordbookContents {
        wordbook: NewWordbook::from(&wordbook),
        words,
    })
}

/// Creates a wordbook and all of its words in one transaction.
///
/// Nothing is written if any word is invalid or the name is taken.
pub fn import_wordbook(conn: &Connection, contents: &WordbookContents) -> DbResult<Wordbook> {
    contents.wordbook.validate()?;
    for word in &contents.words {
        contents.wordbook.validate_word(word)?;
    }

    let tx = conn.unchecked_transaction()?;
    let wordbook = create_wordbook(&tx, &contents.wordbook)?;
    for word in &contents.words {
        add_word(&tx, wordbook.id, word)?;
    }
    tx.commit()?;

    info!(
        id = wordbook.id,
        wordbook = %wordbook.name,
        words = contents.words.len(),
        "wordbook imported"
    );
    Ok(wordbook)
}
