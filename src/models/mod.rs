pub mod clock;
pub mod judgment;
pub mod review_session;
pub mod review_state;
pub mod scheduler;
pub mod stats;
pub mod word;
pub mod word_report;
pub mod wordbook;

pub use clock::{Clock, FixedClock, SystemClock};
pub use judgment::{Judgment, ParseJudgmentError};
pub use review_session::{DueWord, ReviewSession, SessionSummary};
pub use review_state::{ReviewState, UserProgress};
pub use scheduler::{PolicyError, Schedule, SchedulerPolicy, compute_next_review};
pub use stats::{
    DailyReviews, Dashboard, DayProgress, DaySummary, ProgressStats, RecentWord, Statistics,
    WordbookProgress,
};
pub use word::{NewWord, Word};
pub use word_report::{ModerationAction, ReportStatus, WordReport};
pub use wordbook::{NewWordbook, Wordbook, WordbookContents};
