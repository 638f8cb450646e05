//! Word correction reports and their moderation
use super::db;
use crate::error::{DbError, DbResult, ValidationError};
use crate::models::{ModerationAction, NewWord, ReportStatus, WordReport};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{info, warn};

const REPORT_COLUMNS: &str = "id, word_id, wordbook_id, day, original_english, original_korean,
    reported_english, reported_korean, user_id, status, created_at";

fn report_from_row(row: &Row<'_>) -> rusqlite::Result<WordReport> {
    Ok(WordReport {
        id: row.get(0)?,
        word_id: row.get(1)?,
        wordbook_id: row.get(2)?,
        day: row.get(3)?,
        original_english: row.get(4)?,
        original_korean: row.get(5)?,
        reported_english: row.get(6)?,
        reported_korean: row.get(7)?,
        user_id: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
    })
}

/// Files a correction for a word. The word's current text is kept as the original.
pub fn submit_report(
    conn: &Connection,
    user_id: &str,
    word_id: i64,
    reported_english: &str,
    reported_korean: &str,
) -> DbResult<WordReport> {
    let word = db::get_word(conn, word_id)?;
    NewWord {
        english: reported_english.to_string(),
        korean: reported_korean.to_string(),
        day: word.day,
    }
    .validate()?;

    conn.execute(
        "INSERT INTO word_reports (word_id, wordbook_id, day, original_english, original_korean,
             reported_english, reported_korean, user_id, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            word.id,
            word.wordbook_id,
            word.day,
            word.english,
            word.korean,
            reported_english.trim(),
            reported_korean.trim(),
            user_id,
            ReportStatus::Pending,
            Utc::now(),
        ],
    )?;
    let id = conn.last_insert_rowid();

    info!(id, word_id, user_id, "word report submitted");
    get_report(conn, id)
}

pub fn get_report(conn: &Connection, id: i64) -> DbResult<WordReport> {
    conn.query_row(
        &format!("SELECT {REPORT_COLUMNS} FROM word_reports WHERE id = ?1"),
        params![id],
        report_from_row,
    )
    .optional()?
    .ok_or_else(|| DbError::NotFound(format!("report {id}")))
}

/// All reports, newest first
pub fn list_reports(conn: &Connection) -> DbResult<Vec<WordReport>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM word_reports ORDER BY created_at DESC, id DESC"
    ))?;
    let reports = stmt
        .query_map([], report_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(reports)
}

fn set_word_text(conn: &Connection, word_id: i64, english: &str, korean: &str) -> DbResult<()> {
    conn.execute(
        "UPDATE words SET english = ?2, korean = ?3 WHERE id = ?1",
        params![word_id, english, korean],
    )?;
    Ok(())
}

fn set_status(conn: &Connection, id: i64, status: ReportStatus) -> DbResult<()> {
    conn.execute(
        "UPDATE word_reports SET status = ?2 WHERE id = ?1",
        params![id, status],
    )?;
    Ok(())
}

/// Applies an admin decision to a report.
///
/// Accepting rewrites the word with the reported text; undoing an accepted report
/// restores the original text. Both happen in one transaction with the status change.
/// Undoing a pending report is an invalid transition.
pub fn moderate_report(conn: &Connection, id: i64, action: ModerationAction) -> DbResult<()> {
    let report = get_report(conn, id)?;
    let tx = conn.unchecked_transaction()?;

    match (action, report.status) {
        (ModerationAction::Accept, _) => {
            set_word_text(&tx, report.word_id, &report.reported_english, &report.reported_korean)?;
            set_status(&tx, id, ReportStatus::Accepted)?;
        }
        (ModerationAction::Reject, _) => set_status(&tx, id, ReportStatus::Rejected)?,
        (ModerationAction::Delete, _) => {
            tx.execute("DELETE FROM word_reports WHERE id = ?1", params![id])?;
        }
        (ModerationAction::Undo, ReportStatus::Accepted) => {
            set_word_text(&tx, report.word_id, &report.original_english, &report.original_korean)?;
            set_status(&tx, id, ReportStatus::Pending)?;
        }
        (ModerationAction::Undo, ReportStatus::Rejected) => {
            set_status(&tx, id, ReportStatus::Pending)?
        }
        (ModerationAction::Undo, ReportStatus::Pending) => {
            warn!(id, "cannot undo a pending report");
            return Err(DbError::InvalidTransition(format!(
                "report {id} is still pending"
            )));
        }
    }
    tx.commit()?;

    info!(id, ?action, "report moderated");
    Ok(())
}

/// Deletes several reports at once and returns how many existed
pub fn delete_reports(conn: &Connection, ids: &[i64]) -> DbResult<usize> {
    if ids.is_empty() {
        return Err(ValidationError::NoReportsSelected.into());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let deleted = conn.execute(
        &format!("DELETE FROM word_reports WHERE id IN ({placeholders})"),
        params_from_iter(ids),
    )?;
    info!(deleted, "reports deleted");
    Ok(deleted)
}
