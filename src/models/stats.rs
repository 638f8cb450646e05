//! Aggregated progress figures for a user.
use super::{Judgment, Word};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Words per last judgment across everything the user has studied
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressStats {
    /// All words in all wordbooks, studied or not
    pub total_words: u32,
    pub known_words: u32,
    pub learning_words: u32,
    pub unknown_words: u32,
}

impl ProgressStats {
    pub fn studied_words(&self) -> u32 {
        self.known_words + self.learning_words + self.unknown_words
    }
}

/// Study results for one day of one wordbook
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub total_words: u32,
    pub known_words: u32,
    pub unsure_words: u32,
    pub unknown_words: u32,
    /// Earliest upcoming review among the day's words, if any were studied
    pub next_review_date: Option<NaiveDate>,
}

/// Progress on one day of a wordbook, as shown on the wordbook overview
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayProgress {
    pub day: u32,
    pub total_words: u32,
    pub known_words: u32,
}

/// A word the user judged recently, with its current status
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecentWord {
    pub word: Word,
    pub status: Judgment,
    pub last_review_date: NaiveDate,
}

/// Landing-page figures for a user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub progress: ProgressStats,
    /// Words due on or before today, across all wordbooks
    pub due_words: u32,
    /// Most recently judged words, newest first
    pub recent_words: Vec<RecentWord>,
    /// Distinct words judged today
    pub studied_today: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordbookProgress {
    pub wordbook_id: i64,
    pub name: String,
    pub total_words: u32,
    pub known_words: u32,
    pub unsure_words: u32,
    pub unknown_words: u32,
}

/// Judgments recorded on one date
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyReviews {
    pub date: NaiveDate,
    pub reviews: u32,
}

/// Long-term statistics for a user
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub progress: ProgressStats,
    /// Wordbooks the user has studied at least one word of
    pub wordbooks: Vec<WordbookProgress>,
    /// One entry per date of the last week, oldest first, including days without reviews
    pub daily_reviews: Vec<DailyReviews>,
}
