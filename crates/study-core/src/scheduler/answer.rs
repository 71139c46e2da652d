//! Next-review computation from a difficulty rating.

use chrono::{Duration, Months, NaiveDate};

use crate::clock::Moment;
use crate::models::{Card, Difficulty, ReviewMetadata};

/// Days until an "easy" card returns when it has never been studied before.
pub const FIRST_EASY_GAP_DAYS: i64 = 4;

/// Minutes before a card rated "okay" after a short-interval attempt returns.
pub const OKAY_RETRY_MINUTES: i64 = 20;

/// Minutes before a card rated "hard" returns.
pub const HARD_RETRY_MINUTES: i64 = 5;

/// Computes the gap in days for an "easy" rating from the previous
/// `last_studied` day and today.
pub type EasyGapPolicy = fn(last_studied: NaiveDate, today: NaiveDate) -> i64;

/// Twice the signed day delta `last_studied - today`.
///
/// Because `last_studied` is never after today this yields zero or a negative
/// gap. It is most likely an inverted subtraction; see [`elapsed_easy_gap`].
pub fn literal_easy_gap(last_studied: NaiveDate, today: NaiveDate) -> i64 {
    2 * (last_studied - today).num_days()
}

/// Twice the days elapsed since the card was last studied, at least one day.
pub fn elapsed_easy_gap(last_studied: NaiveDate, today: NaiveDate) -> i64 {
    (2 * (today - last_studied).num_days()).max(1)
}

/// The fixed scheduling heuristic.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    easy_gap: EasyGapPolicy,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            easy_gap: literal_easy_gap,
        }
    }
}

impl Scheduler {
    /// Replace the easy-gap policy.
    pub fn with_easy_gap(mut self, policy: EasyGapPolicy) -> Self {
        self.easy_gap = policy;
        self
    }

    /// Compute the metadata a card carries after being rated `difficulty`.
    pub fn answer(&self, previous: &ReviewMetadata, difficulty: Difficulty, moment: &Moment) -> ReviewMetadata {
        let today = moment.today;
        let mut time_due = today;
        let mut exact_time = None;
        let mut last_studied = today;

        match difficulty {
            Difficulty::Trivial => {
                time_due = today + Months::new(12);
            }
            Difficulty::Easy => {
                let gap = if previous.exact_time.is_some() {
                    1
                } else if let Some(last) = previous.last_studied {
                    (self.easy_gap)(last, today)
                } else {
                    FIRST_EASY_GAP_DAYS
                };
                time_due = today + Duration::days(gap);
            }
            Difficulty::Okay => {
                if previous.exact_time.is_some() {
                    exact_time = Some(moment.now + Duration::minutes(OKAY_RETRY_MINUTES));
                    last_studied = previous.last_studied.unwrap_or(today);
                } else {
                    time_due = today + Duration::days(1);
                }
            }
            Difficulty::Hard => {
                exact_time = Some(moment.now + Duration::minutes(HARD_RETRY_MINUTES));
                last_studied = previous.last_studied.unwrap_or(today);
            }
        }

        ReviewMetadata {
            last_studied: Some(last_studied),
            time_due: Some(time_due),
            exact_time,
            first_studied: Some(previous.first_studied.unwrap_or(today)),
        }
    }
}

/// Compute a card's next review metadata with the default policy.
pub fn answer_card(card: &Card, difficulty: Difficulty, moment: &Moment) -> ReviewMetadata {
    Scheduler::default().answer(&card.review, difficulty, moment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn moment() -> Moment {
        Moment::new(Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap(), today())
    }

    fn card(review: ReviewMetadata) -> Card {
        Card::new(1, 0, "term", "definition").with_review(review)
    }

    #[test]
    fn test_trivial_parks_for_a_year() {
        let review = answer_card(&card(ReviewMetadata::default()), Difficulty::Trivial, &moment());
        let due = review.time_due.unwrap();
        assert_eq!(due, NaiveDate::from_ymd_opt(2025, 5, 10).unwrap());
        assert!((due - today()).num_days() >= 364);
        assert_eq!(review.exact_time, None);
        assert_eq!(review.last_studied, Some(today()));
        assert_eq!(review.first_studied, Some(today()));
    }

    #[test]
    fn test_easy_first_time_waits_four_days() {
        let previous = ReviewMetadata {
            time_due: Some(today() - Duration::days(1)),
            ..Default::default()
        };
        let review = answer_card(&card(previous), Difficulty::Easy, &moment());
        assert_eq!(review.time_due, Some(today() + Duration::days(4)));
        assert_eq!(review.exact_time, None);
        assert_eq!(review.last_studied, Some(today()));
    }

    #[test]
    fn test_easy_after_short_interval_returns_tomorrow() {
        let previous = ReviewMetadata {
            last_studied: Some(today() - Duration::days(3)),
            time_due: Some(today()),
            exact_time: Some(moment().now - Duration::minutes(2)),
            first_studied: Some(today() - Duration::days(6)),
        };
        let review = answer_card(&card(previous), Difficulty::Easy, &moment());
        assert_eq!(review.time_due, Some(today() + Duration::days(1)));
        assert_eq!(review.exact_time, None);
        assert_eq!(review.first_studied, Some(today() - Duration::days(6)));
    }

    #[test]
    fn test_easy_literal_gap_uses_signed_delta() {
        let previous = ReviewMetadata {
            last_studied: Some(today() - Duration::days(3)),
            time_due: Some(today()),
            first_studied: Some(today() - Duration::days(3)),
            ..Default::default()
        };
        let review = answer_card(&card(previous), Difficulty::Easy, &moment());
        assert_eq!(review.time_due, Some(today() - Duration::days(6)));
    }

    #[test]
    fn test_easy_elapsed_gap_policy() {
        let previous = ReviewMetadata {
            last_studied: Some(today() - Duration::days(3)),
            time_due: Some(today()),
            first_studied: Some(today() - Duration::days(3)),
            ..Default::default()
        };
        let scheduler = Scheduler::default().with_easy_gap(elapsed_easy_gap);
        let review = scheduler.answer(&previous, Difficulty::Easy, &moment());
        assert_eq!(review.time_due, Some(today() + Duration::days(6)));
        assert_eq!(elapsed_easy_gap(today(), today()), 1);
    }

    #[test]
    fn test_okay_without_short_interval_returns_tomorrow() {
        let review = answer_card(&card(ReviewMetadata::default()), Difficulty::Okay, &moment());
        assert_eq!(review.time_due, Some(today() + Duration::days(1)));
        assert_eq!(review.exact_time, None);
        assert!(!review.due_again_today(today()));
    }

    #[test]
    fn test_okay_after_short_interval_retries_in_twenty_minutes() {
        let earlier = today() - Duration::days(2);
        let previous = ReviewMetadata {
            last_studied: Some(earlier),
            time_due: Some(today()),
            exact_time: Some(moment().now - Duration::minutes(10)),
            first_studied: Some(earlier),
        };
        let review = answer_card(&card(previous), Difficulty::Okay, &moment());
        assert_eq!(review.exact_time, Some(moment().now + Duration::minutes(20)));
        assert_eq!(review.last_studied, Some(earlier));
        assert_eq!(review.time_due, Some(today()));
        assert!(review.due_again_today(today()));
    }

    #[test]
    fn test_hard_retries_in_five_minutes() {
        let review = answer_card(&card(ReviewMetadata::default()), Difficulty::Hard, &moment());
        let exact: DateTime<Utc> = review.exact_time.unwrap();
        let delta = (exact - moment().now).num_milliseconds();
        assert!((299_999..=300_001).contains(&delta));
        assert_eq!(review.last_studied, Some(today()));
        assert_eq!(review.time_due, Some(today()));
        assert_eq!(review.first_studied, Some(today()));
    }

    #[test]
    fn test_hard_preserves_last_studied() {
        let earlier = today() - Duration::days(4);
        let previous = ReviewMetadata {
            last_studied: Some(earlier),
            time_due: Some(today()),
            exact_time: None,
            first_studied: Some(earlier),
        };
        let review = answer_card(&card(previous), Difficulty::Hard, &moment());
        assert_eq!(review.last_studied, Some(earlier));
        assert_eq!(review.first_studied, Some(earlier));
    }
}
