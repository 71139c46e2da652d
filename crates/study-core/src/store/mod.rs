//! Storage capabilities consumed by the scheduler and the session controller.
//!
//! The scheduler only needs [`CardStore`]: read a deck snapshot, write one
//! card's metadata. Deck management and preferences are separate traits so a
//! front end can depend on exactly what it uses.

pub mod sqlite;

use std::future::Future;

use crate::error::StoreResult;
use crate::models::{Card, CardKey, Deck, DeckId, ImportedCard, ReviewMetadata};

pub use sqlite::SqliteStore;

/// Card reads and metadata writes.
pub trait CardStore: Send + Sync {
    /// Snapshot of every card in a deck, ordered by sequence number.
    fn list_cards(&self, deck_id: DeckId) -> impl Future<Output = StoreResult<Vec<Card>>> + Send;

    /// Persist one card's review metadata as a single durable write.
    fn update_card_metadata(
        &self,
        key: CardKey,
        review: ReviewMetadata,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Deck and card management.
pub trait DeckStore: CardStore {
    /// All decks, ordered by id.
    fn list_decks(&self) -> impl Future<Output = StoreResult<Vec<Deck>>> + Send;

    /// Create a deck holding `cards`, all with empty review metadata.
    fn create_deck(&self, name: String, cards: Vec<ImportedCard>) -> impl Future<Output = StoreResult<Deck>> + Send;

    /// Delete a deck and every card in it.
    fn delete_deck(&self, deck_id: DeckId) -> impl Future<Output = StoreResult<()>> + Send;

    /// Append a card to a deck after its highest sequence number.
    fn add_card(
        &self,
        deck_id: DeckId,
        term: String,
        definition: String,
    ) -> impl Future<Output = StoreResult<Card>> + Send;

    /// Delete a single card.
    fn delete_card(&self, key: CardKey) -> impl Future<Output = StoreResult<()>> + Send;
}

/// String key-value preferences.
pub trait Preferences: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = StoreResult<()>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = StoreResult<()>> + Send;
}
