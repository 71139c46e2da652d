//! Selection of today's study queue from a deck snapshot.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::order::{priority_cmp, sort_for_presentation};
use crate::clock::Moment;
use crate::models::Card;

/// Already handled today and not due again until a later day.
pub fn completed_today(card: &Card, today: NaiveDate) -> bool {
    card.review.last_studied == Some(today) && card.review.time_due.is_some_and(|due| due > today)
}

/// Counts toward today's review quota.
pub fn due_for_review(card: &Card, today: NaiveDate) -> bool {
    card.review.first_studied != Some(today)
        && (card.review.time_due.is_some_and(|due| due <= today) || card.review.last_studied == Some(today))
}

/// Counts toward today's new-card quota.
pub fn is_new(card: &Card, today: NaiveDate) -> bool {
    card.review.is_new(today)
}

/// Tallies of a deck snapshot against one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueCounts {
    /// Cards due for review.
    pub review: usize,
    /// New cards, including those first studied today.
    pub new: usize,
    /// Cards already completed today.
    pub completed: usize,
}

impl QueueCounts {
    /// Classify every card in `cards` against `today`.
    pub fn tally(cards: &[Card], today: NaiveDate) -> Self {
        cards.iter().fold(Self::default(), |mut counts, card| {
            if due_for_review(card, today) {
                counts.review += 1;
            }
            if is_new(card, today) {
                counts.new += 1;
            }
            if completed_today(card, today) {
                counts.completed += 1;
            }
            counts
        })
    }

    /// New cards plus reviews admitted today, before completed ones are discounted.
    pub fn planned(&self, study_budget: usize) -> usize {
        study_budget.min(self.new) + self.review
    }

    /// Number of cards to put in the queue.
    pub fn target(&self, study_budget: usize) -> usize {
        self.planned(study_budget).saturating_sub(self.completed)
    }
}

/// A built queue and the counts it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePlan {
    /// Cards in presentation order.
    pub cards: Vec<Card>,
    /// Classification of the snapshot.
    pub counts: QueueCounts,
    /// `QueueCounts::planned` for the budget used.
    pub planned: usize,
}

impl QueuePlan {
    /// Whether there is nothing to study.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Build today's queue and report how it was sized.
pub fn plan_queue<R: Rng + ?Sized>(cards: &[Card], study_budget: usize, moment: &Moment, rng: &mut R) -> QueuePlan {
    let today = moment.today;
    let counts = QueueCounts::tally(cards, today);
    let target = counts.target(study_budget);

    let mut ranked: Vec<&Card> = cards.iter().collect();
    ranked.sort_by(|a, b| priority_cmp(a, b, today).then_with(|| a.num.cmp(&b.num)));

    let mut selected: Vec<Card> = ranked.into_iter().take(target).cloned().collect();
    selected.shuffle(rng);
    sort_for_presentation(&mut selected, moment.now);

    debug!(
        total = cards.len(),
        review = counts.review,
        new = counts.new,
        completed = counts.completed,
        study_budget,
        selected = selected.len(),
        "built study queue"
    );

    QueuePlan {
        cards: selected,
        counts,
        planned: counts.planned(study_budget),
    }
}

/// Build today's queue in presentation order.
pub fn build_queue<R: Rng + ?Sized>(cards: &[Card], study_budget: usize, moment: &Moment, rng: &mut R) -> Vec<Card> {
    plan_queue(cards, study_budget, moment, rng).cards
}
