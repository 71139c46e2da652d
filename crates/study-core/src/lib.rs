//! # Study Core
//!
//! Spaced repetition engine behind the `study-cards` terminal app.
//!
//! ## Architecture
//!
//! - **Scheduler**: pure functions that pick today's queue from a deck
//!   snapshot, order it, and compute a card's next review from a 0-3 rating
//! - **Store**: capability traits for cards, decks and preferences, with a
//!   SQLite implementation
//! - **Session**: the study loop controller that persists every answer before
//!   advancing the queue
//! - **Library**: validated deck management and the per-deck study budget
//!
//! Every scheduling decision takes an explicit [`Moment`] and random source, so
//! the engine is deterministic under test.

pub mod clock;
pub mod error;
pub mod import;
pub mod library;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod store;

pub use clock::Moment;
pub use error::{ImportError, StoreError, StoreResult, StudyError, StudyResult, ValidationError};
pub use import::{CardSource, FileSource};
pub use library::{Library, DEFAULT_NEW_CARDS};
pub use models::{Card, CardKey, Deck, DeckId, Difficulty, ImportedCard, ReviewMetadata};
pub use scheduler::{answer_card, build_queue, plan_queue, QueueCounts, QueuePlan, Scheduler};
pub use session::{AnswerOutcome, Placement, StudySession};
pub use store::{CardStore, DeckStore, Preferences, SqliteStore};
