//! Review session management for spaced repetition practice.
//! Walks the words due today and records one judgment per word.

use super::{Clock, Judgment, SchedulerPolicy, UserProgress, Word};
use crate::database::{progress, sessions};
use crate::error::DbResult;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// A word due for review, with the wordbook it belongs to and its last judgment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DueWord {
    pub word: Word,
    pub wordbook_name: String,
    pub status: Judgment,
}

/// Outcome of a finished session. Only `known` counts as correct.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub total_words: u32,
    pub correct_words: u32,
    pub incorrect_words: u32,
    pub accuracy: f64,
}

impl SessionSummary {
    pub fn from_results(results: &[bool]) -> Self {
        let total_words = results.len() as u32;
        let correct_words = results.iter().filter(|&&correct| correct).count() as u32;
        let accuracy = if total_words > 0 {
            correct_words as f64 / total_words as f64
        } else {
            0.0
        };

        Self {
            total_words,
            correct_words,
            incorrect_words: total_words - correct_words,
            accuracy,
        }
    }
}

pub struct ReviewSession {
    pub user_id: String,
    pub words: Vec<DueWord>,
    pub current_index: usize,
    judgments: Vec<(i64, Judgment)>,
}

impl ReviewSession {
    pub fn new(user_id: impl Into<String>, words: Vec<DueWord>) -> Self {
        Self {
            user_id: user_id.into(),
            words,
            current_index: 0,
            judgments: Vec::new(),
        }
    }

    pub fn current_word(&self) -> Option<&DueWord> {
        self.words.get(self.current_index)
    }

    /// Records the judgment for the current word and moves to the next one.
    pub fn judge_current(
        &mut self,
        conn: &Connection,
        policy: &SchedulerPolicy,
        clock: &impl Clock,
        judgment: Judgment,
    ) -> DbResult<Option<UserProgress>> {
        let Some(word_id) = self.current_word().map(|due| due.word.id) else {
            return Ok(None);
        };

        let progress =
            progress::record_judgment(conn, policy, clock, &self.user_id, word_id, judgment)?;

        self.judgments.push((word_id, judgment));
        self.current_index += 1;

        Ok(Some(progress))
    }

    pub fn reviewed_count(&self) -> usize {
        self.judgments.len()
    }

    pub fn total_count(&self) -> usize {
        self.words.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count().saturating_sub(self.current_index)
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.words.len()
    }

    /// Stores the session's results and returns its id with the summary.
    /// Words left unjudged are not part of the session.
    pub fn finish(self, conn: &Connection) -> DbResult<(i64, SessionSummary)> {
        let session_id = sessions::end_session(conn, &self.user_id, &self.judgments)?;
        let summary = sessions::session_summary(conn, session_id, &self.user_id)?;
        Ok((session_id, summary))
    }
}
