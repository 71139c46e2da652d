//! Deck management on top of a store.
//!
//! Validates user input before touching the store and keeps the per-deck
//! study budget preference in step with the decks that exist.

use tracing::{info, warn};

use crate::error::{StudyResult, ValidationError};
use crate::import::CardSource;
use crate::models::{Card, CardKey, Deck, DeckId};
use crate::store::{DeckStore, Preferences};

/// New cards admitted per day when a deck has no stored preference.
pub const DEFAULT_NEW_CARDS: usize = 30;

/// Preference key under which a deck's study budget is stored.
pub fn budget_key(deck_id: DeckId) -> String {
    deck_id.to_string()
}

/// Parse a study budget typed by the user.
pub fn parse_study_budget(input: &str) -> Result<usize, ValidationError> {
    input
        .trim()
        .parse::<usize>()
        .map_err(|_| ValidationError::InvalidStudyBudget(input.to_string()))
}

/// Deck operations against a store that also holds preferences.
#[derive(Debug, Clone)]
pub struct Library<S> {
    store: S,
    default_budget: usize,
}

impl<S: DeckStore + Preferences> Library<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_budget: DEFAULT_NEW_CARDS,
        }
    }

    /// Budget used for decks without a stored preference.
    pub fn with_default_budget(mut self, budget: usize) -> Self {
        self.default_budget = budget;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub async fn decks(&self) -> StudyResult<Vec<Deck>> {
        Ok(self.store.list_decks().await?)
    }

    pub async fn cards(&self, deck_id: DeckId) -> StudyResult<Vec<Card>> {
        Ok(self.store.list_cards(deck_id).await?)
    }

    /// Create an empty deck.
    pub async fn create_deck(&self, name: &str) -> StudyResult<Deck> {
        let name = deck_name(name)?;
        let deck = self.store.create_deck(name, Vec::new()).await?;
        info!(deck_id = deck.id, name = %deck.name, "created deck");
        Ok(deck)
    }

    /// Fetch cards from `source` and store them as a new deck.
    ///
    /// Nothing is written unless the source yields at least one card.
    pub async fn import_deck<C: CardSource>(&self, source: &C, location: &str, name: &str) -> StudyResult<Deck> {
        let name = deck_name(name)?;
        let cards = source.fetch(location).await.inspect_err(|e| {
            warn!(location, error = %e, "import failed");
        })?;
        let count = cards.len();
        let deck = self.store.create_deck(name, cards).await?;
        info!(deck_id = deck.id, name = %deck.name, cards = count, location, "imported deck");
        Ok(deck)
    }

    /// Append a card typed by the user.
    pub async fn add_card(&self, deck_id: DeckId, term: &str, definition: &str) -> StudyResult<Card> {
        if term.trim().is_empty() {
            return Err(ValidationError::EmptyTerm.into());
        }
        if definition.trim().is_empty() {
            return Err(ValidationError::EmptyDefinition.into());
        }
        let card = self
            .store
            .add_card(deck_id, term.to_string(), definition.to_string())
            .await?;
        info!(card = %card.key(), "added card");
        Ok(card)
    }

    pub async fn delete_card(&self, key: CardKey) -> StudyResult<()> {
        self.store.delete_card(key).await?;
        info!(card = %key, "deleted card");
        Ok(())
    }

    /// Delete a deck, its cards and its study budget preference.
    pub async fn delete_deck(&self, deck_id: DeckId) -> StudyResult<()> {
        self.store.delete_deck(deck_id).await?;
        self.store.remove(&budget_key(deck_id)).await?;
        info!(deck_id, "deleted deck");
        Ok(())
    }

    /// New cards per day for a deck.
    ///
    /// A stored value that no longer parses falls back to the default.
    pub async fn study_budget(&self, deck_id: DeckId) -> StudyResult<usize> {
        let stored = self.store.get(&budget_key(deck_id)).await?;
        Ok(match stored {
            Some(value) => parse_study_budget(&value).unwrap_or_else(|_| {
                warn!(deck_id, value = %value, "ignoring unparsable study budget");
                self.default_budget
            }),
            None => self.default_budget,
        })
    }

    /// Store a new budget typed by the user.
    pub async fn set_study_budget(&self, deck_id: DeckId, input: &str) -> StudyResult<usize> {
        let budget = parse_study_budget(input)?;
        self.store
            .set(&budget_key(deck_id), &budget.to_string())
            .await?;
        info!(deck_id, budget, "set study budget");
        Ok(budget)
    }
}

fn deck_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyDeckName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ImportError, StudyError};
    use crate::models::ImportedCard;
    use crate::store::SqliteStore;

    struct StaticSource(Vec<ImportedCard>);

    impl CardSource for StaticSource {
        async fn fetch(&self, _location: &str) -> Result<Vec<ImportedCard>, ImportError> {
            crate::import::validate(self.0.clone())
        }
    }

    fn library() -> Library<SqliteStore> {
        Library::new(SqliteStore::in_memory().unwrap())
    }

    fn pair(num: i64, term: &str, definition: &str) -> ImportedCard {
        ImportedCard {
            num,
            term: term.into(),
            definition: definition.into(),
        }
    }

    #[test]
    fn test_parse_study_budget() {
        assert_eq!(parse_study_budget("30"), Ok(30));
        assert_eq!(parse_study_budget(" 0 "), Ok(0));
        assert!(parse_study_budget("-1").is_err());
        assert!(parse_study_budget("lots").is_err());
        assert!(parse_study_budget("").is_err());
    }

    #[tokio::test]
    async fn test_create_deck_requires_name() {
        let lib = library();
        let err = lib.create_deck("   ").await.unwrap_err();
        assert!(matches!(err, StudyError::Validation(ValidationError::EmptyDeckName)));
        assert!(lib.decks().await.unwrap().is_empty());

        let deck = lib.create_deck("  French  ").await.unwrap();
        assert_eq!(deck.name, "French");
    }

    #[tokio::test]
    async fn test_import_deck() {
        let lib = library();
        let source = StaticSource(vec![pair(0, "Minecraft", "A game"), pair(1, "Creeper", "The villain")]);
        let deck = lib.import_deck(&source, "anywhere", "Games").await.unwrap();

        let cards = lib.cards(deck.id).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].term, "Creeper");
        assert!(cards.iter().all(|c| c.review.first_studied.is_none()));
    }

    #[tokio::test]
    async fn test_import_empty_source_writes_nothing() {
        let lib = library();
        let err = lib.import_deck(&StaticSource(Vec::new()), "anywhere", "Empty").await.unwrap_err();
        assert!(matches!(err, StudyError::Import(ImportError::NoCards)));
        assert!(lib.decks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_card_validation() {
        let lib = library();
        let deck = lib.create_deck("Words").await.unwrap();

        let err = lib.add_card(deck.id, "", "x").await.unwrap_err();
        assert!(matches!(err, StudyError::Validation(ValidationError::EmptyTerm)));
        let err = lib.add_card(deck.id, "x", "  ").await.unwrap_err();
        assert!(matches!(err, StudyError::Validation(ValidationError::EmptyDefinition)));

        let card = lib.add_card(deck.id, "chat", "cat").await.unwrap();
        assert_eq!(card.num, 0);
        lib.delete_card(card.key()).await.unwrap();
        assert!(lib.cards(deck.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_study_budget_defaults_and_persists() {
        let lib = library().with_default_budget(12);
        let deck = lib.create_deck("Budget").await.unwrap();
        assert_eq!(lib.study_budget(deck.id).await.unwrap(), 12);

        assert_eq!(lib.set_study_budget(deck.id, " 5 ").await.unwrap(), 5);
        assert_eq!(lib.study_budget(deck.id).await.unwrap(), 5);

        let err = lib.set_study_budget(deck.id, "five").await.unwrap_err();
        assert!(matches!(err, StudyError::Validation(ValidationError::InvalidStudyBudget(_))));
        assert_eq!(lib.study_budget(deck.id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_unparsable_stored_budget_falls_back() {
        let lib = library();
        lib.store().set("7", "garbage").await.unwrap();
        assert_eq!(lib.study_budget(7).await.unwrap(), DEFAULT_NEW_CARDS);
    }

    #[tokio::test]
    async fn test_delete_deck_removes_budget() {
        let lib = library();
        let deck = lib.create_deck("Gone").await.unwrap();
        lib.add_card(deck.id, "a", "b").await.unwrap();
        lib.set_study_budget(deck.id, "3").await.unwrap();

        lib.delete_deck(deck.id).await.unwrap();
        assert!(lib.decks().await.unwrap().is_empty());
        assert_eq!(lib.store().get(&budget_key(deck.id)).await.unwrap(), None);
        assert!(lib.cards(deck.id).await.unwrap().is_empty());
    }
}
