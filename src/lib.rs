pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use error::{DbError, DbResult, ValidationError};
pub use models::{
    Clock, FixedClock, Judgment, ReviewSession, ReviewState, Schedule, SchedulerPolicy,
    SystemClock, UserProgress, compute_next_review,
};
