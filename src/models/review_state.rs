//! Per (user, word) scheduling state and the persisted progress row around it.
use super::{Judgment, Schedule, SchedulerPolicy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Scheduling inputs carried between reviews of one word.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub interval: u32,
    pub ease_factor: f64,
    pub consecutive_correct: u32,
}

/// Initial state of the default policy
impl Default for ReviewState {
    fn default() -> Self {
        SchedulerPolicy::default().initial_state()
    }
}

impl ReviewState {
    /// Merges a computed schedule with the streak bookkeeping for `judgment`.
    /// The streak grows on `known` and resets on anything else.
    pub fn advance(&self, judgment: Judgment, schedule: &Schedule) -> ReviewState {
        let consecutive_correct = match judgment {
            Judgment::Known => self.consecutive_correct.saturating_add(1),
            Judgment::Unsure | Judgment::Unknown => 0,
        };

        ReviewState {
            interval: schedule.interval,
            ease_factor: schedule.ease_factor,
            consecutive_correct,
        }
    }
}

/// Stored progress of one user on one word
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: String,
    pub word_id: i64,
    pub wordbook_id: i64,
    pub status: Judgment,
    pub state: ReviewState,
    pub review_count: u32,
    pub last_review_date: NaiveDate,
    pub next_review_date: NaiveDate,
}
