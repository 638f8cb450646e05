//! Review session history
use crate::error::{DbError, DbResult};
use crate::models::{Judgment, SessionSummary};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::info;

/// Stores the judgments of a finished review session and returns its id.
///
/// A word judged twice keeps its last judgment.
pub fn end_session(
    conn: &Connection,
    user_id: &str,
    judgments: &[(i64, Judgment)],
) -> DbResult<i64> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO review_sessions (user_id, created_at) VALUES (?1, ?2)",
        params![user_id, Utc::now()],
    )?;
    let session_id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO session_reviews (session_id, word_id, is_correct)
             VALUES (?1, ?2, ?3)",
        )?;
        for (word_id, judgment) in judgments {
            stmt.execute(params![session_id, word_id, judgment.is_correct()])?;
        }
    }
    tx.commit()?;

    info!(session_id, user_id, words = judgments.len(), "review session ended");
    Ok(session_id)
}

/// Summary of a stored session. Sessions of other users are reported as not found.
pub fn session_summary(
    conn: &Connection,
    session_id: i64,
    user_id: &str,
) -> DbResult<SessionSummary> {
    let owner: Option<String> = conn
        .query_row(
            "SELECT user_id FROM review_sessions WHERE id = ?1",
            params![session_id],
            |row| row.get(0),
        )
        .optional()?;
    if owner.as_deref() != Some(user_id) {
        return Err(DbError::NotFound(format!("review session {session_id}")));
    }

    let mut stmt = conn.prepare("SELECT is_correct FROM session_reviews WHERE session_id = ?1")?;
    let results = stmt
        .query_map(params![session_id], |row| row.get::<_, bool>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(SessionSummary::from_results(&results))
}
