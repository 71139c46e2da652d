//! Study session controller.
//!
//! Holds the active queue for one deck and walks it: show the term, reveal
//! the definition, accept a rating, persist, then advance. All scheduling
//! decisions are delegated to [`crate::scheduler`].

use rand::Rng;
use tracing::{info, warn};

use crate::clock::Moment;
use crate::error::{StudyError, StudyResult, ValidationError};
use crate::models::{Card, DeckId, Difficulty, ReviewMetadata};
use crate::scheduler::{plan_queue, sort_for_presentation, QueueCounts, Scheduler};
use crate::store::CardStore;

/// What happened to the focused card after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Due again later today; kept and reordered.
    Requeued,
    /// Done for today; removed from the queue.
    Removed,
}

/// Result of answering the focused card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// The card as persisted.
    pub card: Card,
    pub placement: Placement,
}

/// An in-progress study session over one deck.
#[derive(Debug, Clone)]
pub struct StudySession {
    deck_id: DeckId,
    queue: Vec<Card>,
    counts: QueueCounts,
    planned: usize,
    revealed: bool,
    answered: usize,
    scheduler: Scheduler,
}

impl StudySession {
    /// Load the deck and build today's queue.
    ///
    /// An empty queue is a valid session that is already complete.
    pub async fn start<S, R>(
        store: &S,
        deck_id: DeckId,
        study_budget: usize,
        moment: &Moment,
        rng: &mut R,
    ) -> StudyResult<Self>
    where
        S: CardStore,
        R: Rng + ?Sized,
    {
        let cards = store.list_cards(deck_id).await?;
        Ok(Self::from_cards(deck_id, &cards, study_budget, moment, rng))
    }

    /// Build a session from a deck snapshot already in memory.
    pub fn from_cards<R: Rng + ?Sized>(
        deck_id: DeckId,
        cards: &[Card],
        study_budget: usize,
        moment: &Moment,
        rng: &mut R,
    ) -> Self {
        let plan = plan_queue(cards, study_budget, moment, rng);
        info!(deck_id, queued = plan.cards.len(), planned = plan.planned, "study session started");
        Self {
            deck_id,
            queue: plan.cards,
            counts: plan.counts,
            planned: plan.planned,
            revealed: false,
            answered: 0,
            scheduler: Scheduler::default(),
        }
    }

    /// Use a different scheduling policy for subsequent answers.
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn deck_id(&self) -> DeckId {
        self.deck_id
    }

    /// The card currently shown.
    pub fn current(&self) -> Option<&Card> {
        self.queue.first()
    }

    /// Remaining queue in presentation order.
    pub fn queue(&self) -> &[Card] {
        &self.queue
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// New cards admitted plus reviews, as planned when the session started.
    pub fn planned(&self) -> usize {
        self.planned
    }

    pub fn counts(&self) -> QueueCounts {
        self.counts
    }

    /// Answers recorded so far.
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Whether nothing is left to study.
    pub fn is_complete(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Show the definition of the current card.
    pub fn reveal(&mut self) {
        if !self.queue.is_empty() {
            self.revealed = true;
        }
    }

    /// Rate the current card, persist its new schedule and advance.
    ///
    /// The queue is only changed once the store has accepted the write; on
    /// failure the session is left exactly as it was.
    pub async fn answer<S: CardStore>(
        &mut self,
        store: &S,
        difficulty: Difficulty,
        moment: &Moment,
    ) -> StudyResult<AnswerOutcome> {
        let card = self.current().ok_or(StudyError::NothingToAnswer)?;
        if !self.revealed {
            return Err(ValidationError::AnswerHidden.into());
        }

        let key = card.key();
        let review: ReviewMetadata = self.scheduler.answer(&card.review, difficulty, moment);
        let updated = card.with_review(review);

        if let Err(e) = store.update_card_metadata(key, review).await {
            warn!(card = %key, error = %e, "failed to save review");
            return Err(e.into());
        }

        let placement = self.settle(updated.clone(), moment);
        self.revealed = false;
        self.answered += 1;
        info!(
            card = %key,
            level = difficulty.level(),
            due = ?review.time_due,
            exact = ?review.exact_time,
            ?placement,
            remaining = self.queue.len(),
            "answered card"
        );

        Ok(AnswerOutcome {
            card: updated,
            placement,
        })
    }

    fn settle(&mut self, updated: Card, moment: &Moment) -> Placement {
        if updated.review.due_again_today(moment.today) {
            self.queue[0] = updated;
            sort_for_presentation(&mut self.queue, moment.now);
            Placement::Requeued
        } else {
            self.queue.remove(0);
            Placement::Removed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use crate::models::CardKey;
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        cards: Mutex<Vec<Card>>,
        fail_writes: AtomicBool,
    }

    impl FakeStore {
        fn with_cards(cards: Vec<Card>) -> Self {
            Self {
                cards: Mutex::new(cards),
                fail_writes: AtomicBool::new(false),
            }
        }

        fn stored(&self, num: i64) -> Card {
            self.cards.lock().unwrap().iter().find(|c| c.num == num).cloned().unwrap()
        }
    }

    impl CardStore for FakeStore {
        async fn list_cards(&self, deck_id: DeckId) -> StoreResult<Vec<Card>> {
            Ok(self
                .cards
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.deck_id == deck_id)
                .cloned()
                .collect())
        }

        async fn update_card_metadata(&self, key: CardKey, review: ReviewMetadata) -> StoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::NotFound(format!("card {key}")));
            }
            let mut cards = self.cards.lock().unwrap();
            let card = cards
                .iter_mut()
                .find(|c| c.key() == key)
                .ok_or_else(|| StoreError::NotFound(format!("card {key}")))?;
            card.review = review;
            Ok(())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn moment() -> Moment {
        Moment::new(now(), today())
    }

    fn fresh(num: i64) -> Card {
        Card::new(1, num, format!("term {num}"), format!("definition {num}"))
    }

    async fn start(store: &FakeStore, budget: usize) -> StudySession {
        StudySession::start(store, 1, budget, &moment(), &mut StdRng::seed_from_u64(7))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_empty_deck_is_complete() {
        let store = FakeStore::default();
        let mut session = start(&store, 30).await;
        assert!(session.is_complete());
        assert_eq!(session.planned(), 0);

        session.reveal();
        let result = session.answer(&store, Difficulty::Easy, &moment()).await;
        assert!(matches!(result, Err(StudyError::NothingToAnswer)));
    }

    #[tokio::test]
    async fn test_answer_requires_reveal() {
        let store = FakeStore::with_cards(vec![fresh(0)]);
        let mut session = start(&store, 30).await;
        let result = session.answer(&store, Difficulty::Easy, &moment()).await;
        assert!(matches!(result, Err(StudyError::Validation(ValidationError::AnswerHidden))));
        assert_eq!(store.stored(0).review, ReviewMetadata::default());
    }

    #[tokio::test]
    async fn test_easy_answer_removes_card() {
        let store = FakeStore::with_cards(vec![fresh(0), fresh(1)]);
        let mut session = start(&store, 30).await;
        let focused = session.current().unwrap().num;

        session.reveal();
        let outcome = session.answer(&store, Difficulty::Easy, &moment()).await.unwrap();

        assert_eq!(outcome.placement, Placement::Removed);
        assert_eq!(outcome.card.review.time_due, Some(today() + Duration::days(4)));
        assert_eq!(session.remaining(), 1);
        assert!(!session.is_revealed());
        assert_eq!(store.stored(focused).review, outcome.card.review);
        assert!(session.queue().iter().all(|c| c.num != focused));
    }

    #[tokio::test]
    async fn test_hard_answer_requeues_behind_fresh_cards() {
        let store = FakeStore::with_cards(vec![fresh(0), fresh(1), fresh(2)]);
        let mut session = start(&store, 30).await;
        let focused = session.current().unwrap().num;

        session.reveal();
        let outcome = session.answer(&store, Difficulty::Hard, &moment()).await.unwrap();

        assert_eq!(outcome.placement, Placement::Requeued);
        assert_eq!(session.remaining(), 3);
        assert_eq!(session.queue().last().unwrap().num, focused);
        assert_eq!(
            session.queue().last().unwrap().review.exact_time,
            Some(now() + Duration::minutes(5))
        );
    }

    #[tokio::test]
    async fn test_okay_after_elapsed_retry_stays_queued() {
        let earlier = today() - Duration::days(3);
        let retry = fresh(0).with_review(ReviewMetadata {
            last_studied: Some(earlier),
            time_due: Some(today()),
            exact_time: Some(now() - Duration::minutes(10)),
            first_studied: Some(earlier),
        });
        let store = FakeStore::with_cards(vec![retry, fresh(1)]);
        let mut session = start(&store, 30).await;
        assert_eq!(session.current().unwrap().num, 0);

        session.reveal();
        let outcome = session.answer(&store, Difficulty::Okay, &moment()).await.unwrap();

        assert_eq!(outcome.placement, Placement::Requeued);
        assert_eq!(outcome.card.review.exact_time, Some(now() + Duration::minutes(20)));
        assert_eq!(outcome.card.review.last_studied, Some(earlier));
        assert_eq!(session.remaining(), 2);
        assert_eq!(session.current().unwrap().num, 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_queue_untouched() {
        let store = FakeStore::with_cards(vec![fresh(0), fresh(1)]);
        let mut session = start(&store, 30).await;
        let before: Vec<Card> = session.queue().to_vec();

        store.fail_writes.store(true, Ordering::SeqCst);
        session.reveal();
        let result = session.answer(&store, Difficulty::Trivial, &moment()).await;

        assert!(matches!(result, Err(StudyError::Store(_))));
        assert_eq!(session.queue(), before.as_slice());
        assert!(session.is_revealed());
        assert_eq!(session.answered(), 0);

        store.fail_writes.store(false, Ordering::SeqCst);
        let outcome = session.answer(&store, Difficulty::Trivial, &moment()).await.unwrap();
        assert_eq!(outcome.placement, Placement::Removed);
        assert_eq!(session.remaining(), 1);
    }

    #[tokio::test]
    async fn test_session_drains_to_completion() {
        let store = FakeStore::with_cards((0..4).map(fresh).collect());
        let mut session = start(&store, 3).await;
        assert_eq!(session.planned(), 3);
        assert_eq!(session.remaining(), 3);

        while !session.is_complete() {
            session.reveal();
            session.answer(&store, Difficulty::Okay, &moment()).await.unwrap();
        }
        assert_eq!(session.answered(), 3);
        assert_eq!(store.stored(3).review, ReviewMetadata::default());
    }
}
