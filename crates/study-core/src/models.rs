//! Data models for decks, cards and review metadata.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Numeric deck identifier.
pub type DeckId = i64;

/// A named collection of cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    /// Unique identifier.
    pub id: DeckId,
    /// Deck name.
    pub name: String,
}

/// Composite key of a card: unique within its deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardKey {
    /// Owning deck.
    pub deck_id: DeckId,
    /// Sequence number within the deck.
    pub num: i64,
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.deck_id, self.num)
    }
}

/// Scheduling state carried by every card.
///
/// Day-level fields hold the local calendar day they refer to.
/// `exact_time` is an absolute instant used for same-day re-review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    /// Day the card was last answered.
    pub last_studied: Option<NaiveDate>,
    /// Day the card should next be presented.
    pub time_due: Option<NaiveDate>,
    /// Instant a short-interval re-review becomes due.
    pub exact_time: Option<DateTime<Utc>>,
    /// Day the card was first answered.
    pub first_studied: Option<NaiveDate>,
}

impl ReviewMetadata {
    /// Whether the card counts as new on `today`.
    pub fn is_new(&self, today: NaiveDate) -> bool {
        self.first_studied.map_or(true, |first| first == today)
    }

    /// Whether the card stays in today's queue after being answered.
    pub fn due_again_today(&self, today: NaiveDate) -> bool {
        self.time_due == Some(today)
    }
}

/// A flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Parent deck.
    pub deck_id: DeckId,
    /// Sequence number within the deck.
    pub num: i64,
    /// Prompt side.
    pub term: String,
    /// Answer side.
    pub definition: String,
    /// Scheduling state.
    #[serde(default)]
    pub review: ReviewMetadata,
}

impl Card {
    /// Create a card that has never been studied.
    pub fn new(deck_id: DeckId, num: i64, term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            deck_id,
            num,
            term: term.into(),
            definition: definition.into(),
            review: ReviewMetadata::default(),
        }
    }

    /// Composite key.
    pub fn key(&self) -> CardKey {
        CardKey {
            deck_id: self.deck_id,
            num: self.num,
        }
    }

    /// Copy of this card carrying different review metadata.
    pub fn with_review(&self, review: ReviewMetadata) -> Self {
        Self {
            review,
            ..self.clone()
        }
    }
}

/// A term/definition pair supplied by an import source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedCard {
    /// Position in the source deck.
    pub num: i64,
    pub term: String,
    pub definition: String,
}

/// Self-reported difficulty of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Way too easy; park the card for a year.
    Trivial,
    /// Recalled comfortably.
    Easy,
    /// Recalled with some effort.
    Okay,
    /// Not recalled.
    Hard,
}

impl Difficulty {
    /// All levels in rating order.
    pub const ALL: [Difficulty; 4] = [Self::Trivial, Self::Easy, Self::Okay, Self::Hard];

    /// Numeric level, 0 (trivial) to 3 (hard).
    pub fn level(&self) -> u8 {
        match self {
            Self::Trivial => 0,
            Self::Easy => 1,
            Self::Okay => 2,
            Self::Hard => 3,
        }
    }

    /// Get display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trivial => "Way Too Easy",
            Self::Easy => "Pretty Easy",
            Self::Okay => "Alright",
            Self::Hard => "Difficult",
        }
    }

    /// Get associated key.
    pub fn key(&self) -> char {
        match self {
            Self::Trivial => '0',
            Self::Easy => '1',
            Self::Okay => '2',
            Self::Hard => '3',
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = ValidationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Trivial),
            1 => Ok(Self::Easy),
            2 => Ok(Self::Okay),
            3 => Ok(Self::Hard),
            other => Err(ValidationError::DifficultyOutOfRange(i64::from(other))),
        }
    }
}

impl TryFrom<i64> for Difficulty {
    type Error = ValidationError;

    fn try_from(level: i64) -> Result<Self, Self::Error> {
        u8::try_from(level)
            .map_err(|_| ValidationError::DifficultyOutOfRange(level))
            .and_then(Difficulty::try_from)
    }
}
