//! Spaced repetition scheduling.
//!
//! Three pure pieces: choosing today's queue from a deck snapshot, ordering
//! it, and computing a card's next review from a difficulty rating.

pub mod answer;
pub mod order;
pub mod queue;

pub use answer::{
    answer_card, elapsed_easy_gap, literal_easy_gap, EasyGapPolicy, Scheduler, FIRST_EASY_GAP_DAYS,
    HARD_RETRY_MINUTES, OKAY_RETRY_MINUTES,
};
pub use order::{presentation_cmp, priority_cmp, sort_for_presentation};
pub use queue::{build_queue, completed_today, due_for_review, is_new, plan_queue, QueueCounts, QueuePlan};
