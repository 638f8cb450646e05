//! Progress recording and review queries.
//!
//! `record_judgment` is the only writer of `user_progress` and `review_log`. It reads the
//! prior state, runs the scheduler and writes the result inside one immediate transaction,
//! so two judgments for the same (user, word) can never interleave and lose an update.

use super::db;
use crate::error::DbResult;
use crate::models::{
    Clock, DailyReviews, Dashboard, DayProgress, DaySummary, DueWord, Judgment, ProgressStats,
    RecentWord, ReviewState, SchedulerPolicy, Statistics, UserProgress, Word, Wordbook,
    WordbookProgress,
};
use chrono::{Days, NaiveDate};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use std::collections::HashMap;
use tracing::info;

/// Number of words listed under "recently studied" on the dashboard
pub const RECENT_WORDS: u32 = 5;

/// Length of the daily review history in `statistics`, today included
pub const REVIEW_HISTORY_DAYS: u64 = 7;

fn progress_from_row(row: &Row<'_>) -> rusqlite::Result<UserProgress> {
    Ok(UserProgress {
        user_id: row.get(0)?,
        word_id: row.get(1)?,
        wordbook_id: row.get(2)?,
        status: row.get(3)?,
        state: ReviewState {
            interval: row.get(4)?,
            ease_factor: row.get(5)?,
            consecutive_correct: row.get(6)?,
        },
        review_count: row.get(7)?,
        last_review_date: row.get(8)?,
        next_review_date: row.get(9)?,
    })
}

/// Stored progress of `user_id` on `word_id`, if the user ever judged it
pub fn get_progress(
    conn: &Connection,
    user_id: &str,
    word_id: i64,
) -> DbResult<Option<UserProgress>> {
    let progress = conn
        .query_row(
            "SELECT user_id, word_id, wordbook_id, status, interval_days, ease_factor,
                    consecutive_correct, review_count, last_review_date, next_review_date
             FROM user_progress WHERE user_id = ?1 AND word_id = ?2",
            params![user_id, word_id],
            progress_from_row,
        )
        .optional()?;
    Ok(progress)
}

/// Records one judgment of `user_id` on `word_id` and reschedules the word.
///
/// Words never judged before start from `policy.initial_state()`.
pub fn record_judgment(
    conn: &Connection,
    policy: &SchedulerPolicy,
    clock: &impl Clock,
    user_id: &str,
    word_id: i64,
    judgment: Judgment,
) -> DbResult<UserProgress> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let word = db::get_word(&tx, word_id)?;
    let prior = get_progress(&tx, user_id, word_id)?;
    let prior_state = prior
        .as_ref()
        .map(|p| p.state)
        .unwrap_or_else(|| policy.initial_state());

    let today = clock.today();
    let schedule = policy.next_review(&prior_state, judgment, today);
    let state = prior_state.advance(judgment, &schedule);

    tx.execute(
        "INSERT INTO user_progress (user_id, word_id, wordbook_id, status, interval_days,
             ease_factor, consecutive_correct, review_count, last_review_date, next_review_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?9)
         ON CONFLICT(user_id, word_id) DO UPDATE SET
             status = excluded.status,
             interval_days = excluded.interval_days,
             ease_factor = excluded.ease_factor,
             consecutive_correct = excluded.consecutive_correct,
             review_count = user_progress.review_count + 1,
             last_review_date = excluded.last_review_date,
             next_review_date = excluded.next_review_date",
        params![
            user_id,
            word_id,
            word.wordbook_id,
            judgment,
            state.interval,
            state.ease_factor,
            state.consecutive_correct,
            today,
            schedule.next_review_date,
        ],
    )?;
    tx.execute(
        "INSERT INTO review_log (user_id, word_id, judgment, reviewed_on) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, word_id, judgment, today],
    )?;

    let progress = UserProgress {
        user_id: user_id.to_string(),
        word_id,
        wordbook_id: word.wordbook_id,
        status: judgment,
        state,
        review_count: prior.map_or(1, |p| p.review_count + 1),
        last_review_date: today,
        next_review_date: schedule.next_review_date,
    };
    tx.commit()?;

    info!(
        user_id,
        word_id,
        %judgment,
        interval = state.interval,
        ease_factor = state.ease_factor,
        next_review = %progress.next_review_date,
        "judgment recorded"
    );
    Ok(progress)
}

/// Words of a wordbook due on or before `today`, oldest due date first.
///
/// `days` restricts the result to words on those days of the wordbook.
pub fn words_due_for_review(
    conn: &Connection,
    user_id: &str,
    wordbook_id: i64,
    days: Option<&[u32]>,
    today: NaiveDate,
) -> DbResult<Vec<DueWord>> {
    let mut stmt = conn.prepare(
        "SELECT w.id, w.wordbook_id, w.english, w.korean, w.day, b.name, p.status
         FROM user_progress p
         JOIN words w ON w.id = p.word_id
         JOIN wordbooks b ON b.id = p.wordbook_id
         WHERE p.user_id = ?1 AND p.wordbook_id = ?2 AND p.next_review_date <= ?3
         ORDER BY p.next_review_date ASC, w.day ASC, w.id ASC",
    )?;

    let due = stmt
        .query_map(params![user_id, wordbook_id, today], |row| {
            Ok(DueWord {
                word: db::word_from_row(row)?,
                wordbook_name: row.get(5)?,
                status: row.get(6)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(match days {
        Some(days) => due
            .into_iter()
            .filter(|d| days.contains(&d.word.day))
            .collect(),
        None => due,
    })
}

/// Days of a wordbook that have at least one word due on or before `today`
pub fn days_with_due_words(
    conn: &Connection,
    user_id: &str,
    wordbook_id: i64,
    today: NaiveDate,
) -> DbResult<Vec<u32>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT w.day
         FROM user_progress p JOIN words w ON w.id = p.word_id
         WHERE p.user_id = ?1 AND p.wordbook_id = ?2 AND p.next_review_date <= ?3
         ORDER BY w.day",
    )?;
    let days = stmt
        .query_map(params![user_id, wordbook_id, today], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<u32>>>()?;
    Ok(days)
}

/// Counts of the user's words by last judgment, against the total word count
pub fn progress_stats(conn: &Connection, user_id: &str) -> DbResult<ProgressStats> {
    let total_words = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;

    let mut stats = ProgressStats {
        total_words,
        ..ProgressStats::default()
    };

    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*) FROM user_progress WHERE user_id = ?1 GROUP BY status",
    )?;
    let rows = stmt
        .query_map(params![user_id], |row| {
            Ok((row.get::<_, Judgment>(0)?, row.get::<_, u32>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    for (status, count) in rows {
        match status {
            Judgment::Known => stats.known_words = count,
            Judgment::Unsure => stats.learning_words = count,
            Judgment::Unknown => stats.unknown_words = count,
        }
    }
    Ok(stats)
}

/// Study results of one day of a wordbook
pub fn day_summary(
    conn: &Connection,
    user_id: &str,
    wordbook_id: i64,
    day: u32,
) -> DbResult<DaySummary> {
    let mut stmt = conn.prepare(
        "SELECT p.status, p.next_review_date
         FROM user_progress p JOIN words w ON w.id = p.word_id
         WHERE p.user_id = ?1 AND p.wordbook_id = ?2 AND w.day = ?3",
    )?;
    let rows = stmt
        .query_map(params![user_id, wordbook_id, day], |row| {
            Ok((row.get::<_, Judgment>(0)?, row.get::<_, NaiveDate>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut summary = DaySummary {
        total_words: rows.len() as u32,
        ..DaySummary::default()
    };
    for (status, next_review_date) in rows {
        match status {
            Judgment::Known => summary.known_words += 1,
            Judgment::Unsure => summary.unsure_words += 1,
            Judgment::Unknown => summary.unknown_words += 1,
        }
        summary.next_review_date = Some(match summary.next_review_date {
            Some(earliest) => earliest.min(next_review_date),
            None => next_review_date,
        });
    }
    Ok(summary)
}

/// Words of a wordbook the user has not judged yet, in study order
pub fn unstudied_words(
    conn: &Connection,
    user_id: &str,
    wordbook_id: i64,
    day: Option<u32>,
) -> DbResult<Vec<Word>> {
    let mut stmt = conn.prepare(
        "SELECT w.id, w.wordbook_id, w.english, w.korean, w.day
         FROM words w
         LEFT JOIN user_progress p ON p.word_id = w.id AND p.user_id = ?1
         WHERE w.wordbook_id = ?2 AND (?3 IS NULL OR w.day = ?3) AND p.word_id IS NULL
         ORDER BY w.day, w.id",
    )?;
    let words = stmt
        .query_map(params![user_id, wordbook_id, day], db::word_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(words)
}

/// Wordbooks in which the user has at least one word due on or before `today`
pub fn wordbooks_with_due_words(
    conn: &Connection,
    user_id: &str,
    today: NaiveDate,
) -> DbResult<Vec<Wordbook>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name, b.total_days, b.description
         FROM wordbooks b
         WHERE EXISTS (
             SELECT 1 FROM user_progress p
             WHERE p.wordbook_id = b.id AND p.user_id = ?1 AND p.next_review_date <= ?2
         )
         ORDER BY b.id",
    )?;
    let wordbooks = stmt
        .query_map(params![user_id, today], db::wordbook_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(wordbooks)
}

/// Word count and known-word count for every day `1..=total_days` of a wordbook.
/// Days without words are included with zero counts.
pub fn wordbook_day_progress(
    conn: &Connection,
    user_id: &str,
    wordbook_id: i64,
) -> DbResult<Vec<DayProgress>> {
    let wordbook = db::get_wordbook(conn, wordbook_id)?;

    let mut stmt = conn.prepare(
        "SELECT w.day, COUNT(*), COUNT(CASE WHEN p.status = ?3 THEN 1 END)
         FROM words w
         LEFT JOIN user_progress p ON p.word_id = w.id AND p.user_id = ?1
         WHERE w.wordbook_id = ?2
         GROUP BY w.day",
    )?;
    let counts = stmt
        .query_map(params![user_id, wordbook_id, Judgment::Known], |row| {
            Ok((row.get::<_, u32>(0)?, (row.get(1)?, row.get(2)?)))
        })?
        .collect::<rusqlite::Result<HashMap<u32, (u32, u32)>>>()?;

    Ok((1..=wordbook.total_days)
        .map(|day| {
            let (total_words, known_words) = counts.get(&day).copied().unwrap_or_default();
            DayProgress {
                day,
                total_words,
                known_words,
            }
        })
        .collect())
}

/// Due-word count, recently judged words and today's activity for a user
pub fn dashboard(conn: &Connection, user_id: &str, today: NaiveDate) -> DbResult<Dashboard> {
    let due_words = conn.query_row(
        "SELECT COUNT(*) FROM user_progress WHERE user_id = ?1 AND next_review_date <= ?2",
        params![user_id, today],
        |row| row.get(0),
    )?;
    let studied_today = conn.query_row(
        "SELECT COUNT(*) FROM user_progress WHERE user_id = ?1 AND last_review_date = ?2",
        params![user_id, today],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(
        "SELECT w.id, w.wordbook_id, w.english, w.korean, w.day, p.status, p.last_review_date
         FROM (
             SELECT word_id, MAX(id) AS last_id FROM review_log
             WHERE user_id = ?1 GROUP BY word_id
         ) r
         JOIN user_progress p ON p.user_id = ?1 AND p.word_id = r.word_id
         JOIN words w ON w.id = r.word_id
         ORDER BY r.last_id DESC
         LIMIT ?2",
    )?;
    let recent_words = stmt
        .query_map(params![user_id, RECENT_WORDS], |row| {
            Ok(RecentWord {
                word: db::word_from_row(row)?,
                status: row.get(5)?,
                last_review_date: row.get(6)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Dashboard {
        progress: progress_stats(conn, user_id)?,
        due_words,
        recent_words,
        studied_today,
    })
}

/// Per-wordbook progress and the number of judgments on each of the last
/// `REVIEW_HISTORY_DAYS` days up to `today`
pub fn statistics(conn: &Connection, user_id: &str, today: NaiveDate) -> DbResult<Statistics> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.name,
                (SELECT COUNT(*) FROM words w WHERE w.wordbook_id = b.id),
                SUM(p.status = ?2), SUM(p.status = ?3), SUM(p.status = ?4)
         FROM wordbooks b
         JOIN user_progress p ON p.wordbook_id = b.id AND p.user_id = ?1
         GROUP BY b.id
         ORDER BY b.id",
    )?;
    let wordbooks = stmt
        .query_map(
            params![user_id, Judgment::Known, Judgment::Unsure, Judgment::Unknown],
            |row| {
                Ok(WordbookProgress {
                    wordbook_id: row.get(0)?,
                    name: row.get(1)?,
                    total_words: row.get(2)?,
                    known_words: row.get(3)?,
                    unsure_words: row.get(4)?,
                    unknown_words: row.get(5)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let first_day = today
        .checked_sub_days(Days::new(REVIEW_HISTORY_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    let mut stmt = conn.prepare(
        "SELECT reviewed_on, COUNT(*) FROM review_log
         WHERE user_id = ?1 AND reviewed_on BETWEEN ?2 AND ?3
         GROUP BY reviewed_on",
    )?;
    let counts = stmt
        .query_map(params![user_id, first_day, today], |row| {
            Ok((row.get::<_, NaiveDate>(0)?, row.get::<_, u32>(1)?))
        })?
        .collect::<rusqlite::Result<HashMap<_, _>>>()?;
    let daily_reviews = first_day
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| DailyReviews {
            date,
            reviews: counts.get(&date).copied().unwrap_or(0),
        })
        .collect();

    Ok(Statistics {
        progress: progress_stats(conn, user_id)?,
        wordbooks,
        daily_reviews,
    })
}
