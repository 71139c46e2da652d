//! Card orderings used while building and working through a study queue.

use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;

use crate::models::Card;

/// Decides which cards make the cut for today's queue.
///
/// Cards due on or before today come first (earliest due date first), then
/// cards with no due date, then cards due after today.
pub fn priority_cmp(a: &Card, b: &Card, today: NaiveDate) -> Ordering {
    match (a.review.time_due, b.review.time_due) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => {
            if x <= today {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (None, Some(y)) => {
            if y <= today {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (None, None) => Ordering::Equal,
    }
}

/// Orders the cards of an active session.
///
/// Distinct due days decide first. Otherwise exact re-review instants are
/// compared; a card whose instant has elapsed jumps ahead of one without, a
/// card still waiting on its instant drops behind. Failing that a card with a
/// due day beats one without. Everything else is a tie.
pub fn presentation_cmp(a: &Card, b: &Card, now: DateTime<Utc>) -> Ordering {
    if let (Some(x), Some(y)) = (a.review.time_due, b.review.time_due) {
        if x != y {
            return x.cmp(&y);
        }
    }

    match (a.review.exact_time, b.review.exact_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => {
            if x <= now {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (None, Some(y)) => {
            if y <= now {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (None, None) => match (a.review.time_due, b.review.time_due) {
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            _ => Ordering::Equal,
        },
    }
}

/// Sorts `cards` for presentation, keeping the existing order of ties.
pub fn sort_for_presentation(cards: &mut [Card], now: DateTime<Utc>) {
    stable_insertion_sort(cards, |a, b| presentation_cmp(a, b, now));
}

// `presentation_cmp` is not transitive for every mix of due days and exact
// instants, and `slice::sort_by` may panic on such comparators.
fn stable_insertion_sort<T>(items: &mut [T], mut cmp: impl FnMut(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewMetadata;
    use chrono::{Duration, TimeZone};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 15, 0, 0).unwrap()
    }

    fn card(num: i64, time_due: Option<NaiveDate>, exact_time: Option<DateTime<Utc>>) -> Card {
        Card::new(1, num, format!("t{num}"), format!("d{num}")).with_review(ReviewMetadata {
            time_due,
            exact_time,
            ..Default::default()
        })
    }

    #[test]
    fn test_priority_due_before_unscheduled_before_future() {
        let past = card(0, Some(today() - Duration::days(2)), None);
        let due_today = card(1, Some(today()), None);
        let fresh = card(2, None, None);
        let future = card(3, Some(today() + Duration::days(3)), None);

        assert_eq!(priority_cmp(&past, &due_today, today()), Ordering::Less);
        assert_eq!(priority_cmp(&due_today, &fresh, today()), Ordering::Less);
        assert_eq!(priority_cmp(&fresh, &future, today()), Ordering::Less);
        assert_eq!(priority_cmp(&future, &fresh, today()), Ordering::Greater);
        assert_eq!(priority_cmp(&fresh, &card(4, None, None), today()), Ordering::Equal);
    }

    #[test]
    fn test_presentation_due_days_first() {
        let a = card(0, Some(today() - Duration::days(1)), None);
        let b = card(1, Some(today()), Some(now() - Duration::minutes(1)));
        assert_eq!(presentation_cmp(&a, &b, now()), Ordering::Less);
    }

    #[test]
    fn test_presentation_exact_times() {
        let early = card(0, Some(today()), Some(now() - Duration::minutes(10)));
        let late = card(1, Some(today()), Some(now() + Duration::minutes(10)));
        assert_eq!(presentation_cmp(&early, &late, now()), Ordering::Less);
        assert_eq!(presentation_cmp(&late, &early, now()), Ordering::Greater);
    }

    #[test]
    fn test_presentation_single_exact_time() {
        let fresh = card(0, None, None);
        let elapsed = card(1, Some(today()), Some(now() - Duration::minutes(1)));
        let waiting = card(2, Some(today()), Some(now() + Duration::minutes(4)));

        assert_eq!(presentation_cmp(&elapsed, &fresh, now()), Ordering::Less);
        assert_eq!(presentation_cmp(&fresh, &elapsed, now()), Ordering::Greater);
        assert_eq!(presentation_cmp(&waiting, &fresh, now()), Ordering::Greater);
        assert_eq!(presentation_cmp(&fresh, &waiting, now()), Ordering::Less);
    }

    #[test]
    fn test_presentation_due_beats_unscheduled() {
        let due = card(0, Some(today()), None);
        let fresh = card(1, None, None);
        assert_eq!(presentation_cmp(&due, &fresh, now()), Ordering::Less);
        assert_eq!(presentation_cmp(&fresh, &due, now()), Ordering::Greater);
        assert_eq!(presentation_cmp(&fresh, &card(2, None, None), now()), Ordering::Equal);
    }

    #[test]
    fn test_sort_keeps_tie_order() {
        let mut cards = vec![
            card(5, None, None),
            card(3, Some(today()), Some(now() + Duration::minutes(5))),
            card(9, None, None),
            card(1, Some(today()), None),
            card(2, None, None),
        ];
        sort_for_presentation(&mut cards, now());
        let nums: Vec<i64> = cards.iter().map(|c| c.num).collect();
        assert_eq!(nums, vec![1, 5, 9, 2, 3]);
    }
}
