//! Spaced repetition scheduler for wordbook reviews.
//!
//! Each review moves a word's interval and ease factor according to the user's judgment:
//! - `unknown`: interval resets to 1 day, ease factor drops by 0.2
//! - `unsure`: interval grows by 1.2x, ease factor drops by 0.15
//! - `known` after at least two consecutive correct answers: ease factor grows by 0.1
//!   and the interval is multiplied by the *updated* ease factor
//! - `known` otherwise: ease factor unchanged, interval grows by a flat 1.5x
//!
//! Ease factor never falls below 1.3 and the interval never falls below 1 day.

use super::{Judgment, ReviewState};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of scheduling one review
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Schedule {
    pub next_review_date: NaiveDate,
    pub interval: u32,
    pub ease_factor: f64,
}

/// A policy that would let the ease factor or the interval leave their valid range
#[derive(Debug, Error, PartialEq)]
pub enum PolicyError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be at least 1 (got {value})")]
    MultiplierBelowOne { field: &'static str, value: f64 },
    #[error("min_ease_factor must be at least 1 (got {0})")]
    FloorBelowOne(f64),
    #[error("initial_interval must be at least 1 day")]
    ZeroInitialInterval,
    #[error("initial_ease_factor {initial} is below min_ease_factor {min}")]
    InitialEaseBelowFloor { initial: f64, min: f64 },
}

/// Tunable constants of the scheduler. `Default` is the production policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerPolicy {
    pub min_ease_factor: f64,
    pub unknown_ease_penalty: f64,
    pub unsure_ease_penalty: f64,
    pub unsure_interval_multiplier: f64,
    pub known_ease_bonus: f64,
    pub known_flat_multiplier: f64,
    pub initial_interval: u32,
    pub initial_ease_factor: f64,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            min_ease_factor: 1.3,
            unknown_ease_penalty: 0.2,
            unsure_ease_penalty: 0.15,
            unsure_interval_multiplier: 1.2,
            known_ease_bonus: 0.1,
            known_flat_multiplier: 1.5,
            initial_interval: 1,
            initial_ease_factor: 2.5,
        }
    }
}

impl SchedulerPolicy {
    /// Checks that every schedule computed from a valid state is valid again:
    /// ease factor stays at or above the floor and intervals never shrink below 1.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let fields = [
            ("min_ease_factor", self.min_ease_factor),
            ("unknown_ease_penalty", self.unknown_ease_penalty),
            ("unsure_ease_penalty", self.unsure_ease_penalty),
            ("unsure_interval_multiplier", self.unsure_interval_multiplier),
            ("known_ease_bonus", self.known_ease_bonus),
            ("known_flat_multiplier", self.known_flat_multiplier),
            ("initial_ease_factor", self.initial_ease_factor),
        ];
        if let Some(&(field, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(PolicyError::NotFinite(field));
        }

        for (field, value) in [
            ("unknown_ease_penalty", self.unknown_ease_penalty),
            ("unsure_ease_penalty", self.unsure_ease_penalty),
            ("known_ease_bonus", self.known_ease_bonus),
        ] {
            if value < 0.0 {
                return Err(PolicyError::Negative { field, value });
            }
        }
        for (field, value) in [
            ("unsure_interval_multiplier", self.unsure_interval_multiplier),
            ("known_flat_multiplier", self.known_flat_multiplier),
        ] {
            if value < 1.0 {
                return Err(PolicyError::MultiplierBelowOne { field, value });
            }
        }

        if self.min_ease_factor < 1.0 {
            return Err(PolicyError::FloorBelowOne(self.min_ease_factor));
        }
        if self.initial_interval == 0 {
            return Err(PolicyError::ZeroInitialInterval);
        }
        if self.initial_ease_factor < self.min_ease_factor {
            return Err(PolicyError::InitialEaseBelowFloor {
                initial: self.initial_ease_factor,
                min: self.min_ease_factor,
            });
        }
        Ok(())
    }

    /// State of a word the user has never judged before
    pub fn initial_state(&self) -> ReviewState {
        ReviewState {
            interval: self.initial_interval,
            ease_factor: self.initial_ease_factor,
            consecutive_correct: 0,
        }
    }

    /// Computes the next schedule for a word.
    ///
    /// `consecutive_correct` is the streak *before* this judgment.
    /// Panics in debug builds when `prior_interval` is zero or `prior_ease_factor`
    /// is below the floor: both mean the caller passed corrupt state.
    pub fn compute_next_review(
        &self,
        prior_interval: u32,
        prior_ease_factor: f64,
        judgment: Judgment,
        consecutive_correct: u32,
        today: NaiveDate,
    ) -> Schedule {
        debug_assert!(prior_interval >= 1, "interval must be at least 1 day");
        debug_assert!(
            prior_ease_factor >= self.min_ease_factor,
            "ease factor {prior_ease_factor} is below the floor {}",
            self.min_ease_factor
        );

        let (ease_factor, interval) = match judgment {
            Judgment::Unknown => (
                (prior_ease_factor - self.unknown_ease_penalty).max(self.min_ease_factor),
                1,
            ),
            Judgment::Unsure => (
                (prior_ease_factor - self.unsure_ease_penalty).max(self.min_ease_factor),
                scale(prior_interval, self.unsure_interval_multiplier),
            ),
            Judgment::Known if consecutive_correct > 1 => {
                // New ease factor feeds the interval, not the prior one
                let ease_factor = prior_ease_factor + self.known_ease_bonus;
                (ease_factor, scale(prior_interval, ease_factor))
            }
            Judgment::Known => (
                prior_ease_factor,
                scale(prior_interval, self.known_flat_multiplier),
            ),
        };

        Schedule {
            next_review_date: add_days(today, interval),
            interval,
            ease_factor,
        }
    }

    /// Schedules from a stored state
    pub fn next_review(&self, state: &ReviewState, judgment: Judgment, today: NaiveDate) -> Schedule {
        self.compute_next_review(
            state.interval,
            state.ease_factor,
            judgment,
            state.consecutive_correct,
            today,
        )
    }
}

/// Computes the next schedule with the default policy.
pub fn compute_next_review(
    prior_interval: u32,
    prior_ease_factor: f64,
    judgment: Judgment,
    consecutive_correct: u32,
    today: NaiveDate,
) -> Schedule {
    SchedulerPolicy::default().compute_next_review(
        prior_interval,
        prior_ease_factor,
        judgment,
        consecutive_correct,
        today,
    )
}

/// floor(interval * factor), never below one day
fn scale(interval: u32, factor: f64) -> u32 {
    ((interval as f64 * factor).floor() as u32).max(1)
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(days as u64))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    const EASES: [f64; 6] = [1.3, 1.35, 1.5, 2.0, 2.5, 3.7];
    const INTERVALS: [u32; 7] = [1, 2, 3, 4, 7, 30, 365];
    const JUDGMENTS: [Judgment; 3] = [Judgment::Unknown, Judgment::Unsure, Judgment::Known];

    #[test]
    fn test_invariants_hold_for_all_judgments() {
        for &ease in &EASES {
            for &interval in &INTERVALS {
                for &judgment in &JUDGMENTS {
                    for streak in 0..4 {
                        let next = compute_next_review(interval, ease, judgment, streak, today());
                        assert!(next.ease_factor >= 1.3, "{ease} {interval} {judgment} {streak}");
                        assert!(next.interval >= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_resets_interval() {
        for &interval in &INTERVALS {
            for streak in [0, 1, 5, 40] {
                let next = compute_next_review(interval, 2.5, Judgment::Unknown, streak, today());
                assert_eq!(next.interval, 1);
                assert_eq!(next.ease_factor, (2.5f64 - 0.2).max(1.3));
            }
        }
    }

    #[test]
    fn test_known_with_streak_compounds_updated_ease() {
        for &ease in &EASES {
            for &interval in &INTERVALS {
                let next = compute_next_review(interval, ease, Judgment::Known, 2, today());
                assert_eq!(next.ease_factor, ease + 0.1);
                assert_eq!(next.interval, (interval as f64 * (ease + 0.1)).floor() as u32);
            }
        }
    }

    #[test]
    fn test_isolated_known_gets_flat_bump() {
        for &ease in &EASES {
            for &interval in &INTERVALS {
                for streak in [0, 1] {
                    let next = compute_next_review(interval, ease, Judgment::Known, streak, today());
                    assert_eq!(next.ease_factor, ease);
                    assert_eq!(next.interval, (interval as f64 * 1.5).floor() as u32);
                }
            }
        }
    }

    #[test]
    fn test_unsure_shrinks_ease_and_grows_interval() {
        for &ease in &EASES {
            for &interval in &INTERVALS {
                let next = compute_next_review(interval, ease, Judgment::Unsure, 3, today());
                assert_eq!(next.ease_factor, (ease - 0.15).max(1.3));
                assert_eq!(
                    next.interval,
                    ((interval as f64 * 1.2).floor() as u32).max(1)
                );
            }
        }
    }

    #[test]
    fn test_next_review_date_is_today_plus_interval() {
        let next = compute_next_review(10, 2.5, Judgment::Known, 3, today());
        // floor(10 * 2.6) = 26
        assert_eq!(next.interval, 26);
        assert_eq!(next.next_review_date, NaiveDate::from_ymd_opt(2024, 4, 5).unwrap());

        let next = compute_next_review(10, 2.5, Judgment::Unknown, 3, today());
        assert_eq!(next.next_review_date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn test_first_known_keeps_one_day() {
        let next = compute_next_review(1, 2.5, Judgment::Known, 0, today());
        assert_eq!(next.ease_factor, 2.5);
        assert_eq!(next.interval, 1);
    }

    #[test]
    fn test_three_known_in_a_row() {
        let policy = SchedulerPolicy::default();
        let mut state = policy.initial_state();

        let first = policy.next_review(&state, Judgment::Known, today());
        assert_eq!((first.interval, first.ease_factor), (1, 2.5));
        state = state.advance(Judgment::Known, &first);
        assert_eq!(state.consecutive_correct, 1);

        let second = policy.next_review(&state, Judgment::Known, today());
        assert_eq!((second.interval, second.ease_factor), (1, 2.5));
        state = state.advance(Judgment::Known, &second);
        assert_eq!(state.consecutive_correct, 2);

        let third = policy.next_review(&state, Judgment::Known, today());
        assert_eq!(third.ease_factor, 2.5 + 0.1);
        assert_eq!(third.interval, 2);
    }

    #[test]
    fn test_unknown_clamps_to_floor() {
        let next = compute_next_review(10, 1.35, Judgment::Unknown, 5, today());
        assert_eq!(next.ease_factor, 1.3);
        assert_eq!(next.interval, 1);
    }

    #[test]
    fn test_unsure_at_floor() {
        let next = compute_next_review(4, 1.3, Judgment::Unsure, 0, today());
        assert_eq!(next.ease_factor, 1.3);
        assert_eq!(next.interval, 4);
    }

    #[test]
    fn test_custom_policy() {
        let policy = SchedulerPolicy {
            known_flat_multiplier: 2.0,
            min_ease_factor: 1.5,
            ..SchedulerPolicy::default()
        };
        let next = policy.compute_next_review(3, 1.6, Judgment::Known, 0, today());
        assert_eq!(next.interval, 6);

        let next = policy.compute_next_review(3, 1.6, Judgment::Unknown, 0, today());
        assert_eq!(next.ease_factor, 1.5);
    }

    #[test]
    fn test_default_policy_is_valid() {
        assert_eq!(SchedulerPolicy::default().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_broken_policies() {
        let broken = |policy: SchedulerPolicy| policy.validate().unwrap_err();
        let base = SchedulerPolicy::default;

        assert_eq!(
            broken(SchedulerPolicy { known_ease_bonus: -2.0, ..base() }),
            PolicyError::Negative { field: "known_ease_bonus", value: -2.0 }
        );
        assert_eq!(
            broken(SchedulerPolicy { unknown_ease_penalty: -0.1, ..base() }),
            PolicyError::Negative { field: "unknown_ease_penalty", value: -0.1 }
        );
        assert_eq!(
            broken(SchedulerPolicy { unsure_ease_penalty: -0.5, ..base() }),
            PolicyError::Negative { field: "unsure_ease_penalty", value: -0.5 }
        );
        assert_eq!(
            broken(SchedulerPolicy { unsure_interval_multiplier: 0.5, ..base() }),
            PolicyError::MultiplierBelowOne { field: "unsure_interval_multiplier", value: 0.5 }
        );
        assert_eq!(
            broken(SchedulerPolicy { known_flat_multiplier: 0.9, ..base() }),
            PolicyError::MultiplierBelowOne { field: "known_flat_multiplier", value: 0.9 }
        );
        assert_eq!(
            broken(SchedulerPolicy { initial_interval: 0, ..base() }),
            PolicyError::ZeroInitialInterval
        );
        assert_eq!(
            broken(SchedulerPolicy { min_ease_factor: 3.0, ..base() }),
            PolicyError::InitialEaseBelowFloor { initial: 2.5, min: 3.0 }
        );
        assert_eq!(
            broken(SchedulerPolicy { min_ease_factor: 0.5, initial_ease_factor: 0.5, ..base() }),
            PolicyError::FloorBelowOne(0.5)
        );
        assert_eq!(
            broken(SchedulerPolicy { known_ease_bonus: f64::NAN, ..base() }),
            PolicyError::NotFinite("known_ease_bonus")
        );
    }

    #[test]
    fn test_validate_accepts_edge_values() {
        let policy = SchedulerPolicy {
            unknown_ease_penalty: 0.0,
            known_ease_bonus: 0.0,
            unsure_interval_multiplier: 1.0,
            known_flat_multiplier: 1.0,
            min_ease_factor: 2.5,
            ..SchedulerPolicy::default()
        };
        assert_eq!(policy.validate(), Ok(()));
    }

    #[test]
    #[should_panic]
    fn test_zero_interval_is_rejected() {
        compute_next_review(0, 2.5, Judgment::Known, 0, today());
    }

    #[test]
    #[should_panic]
    fn test_ease_below_floor_is_rejected() {
        compute_next_review(3, 1.1, Judgment::Unsure, 0, today());
    }
}
