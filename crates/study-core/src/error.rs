//! Error types for study-core.

use std::path::PathBuf;
use thiserror::Error;

/// Input rejected before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("difficulty level {0} is outside 0..=3")]
    DifficultyOutOfRange(i64),

    #[error("deck name must not be empty")]
    EmptyDeckName,

    #[error("term must not be empty")]
    EmptyTerm,

    #[error("definition must not be empty")]
    EmptyDefinition,

    #[error("invalid number of new cards: {0:?}")]
    InvalidStudyBudget(String),

    #[error("the definition must be revealed before rating a card")]
    AnswerHidden,
}

/// Card store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Store connection lock poisoned")]
    Poisoned,

    #[error("Store is still in use and cannot be closed")]
    InUse,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures while reading cards from an import source.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line} is not a term/definition pair")]
    MalformedLine { line: usize },

    #[error("card {num} appears more than once")]
    DuplicateNum { num: i64 },

    #[error("card {num} has an empty term or definition")]
    EmptyField { num: i64 },

    #[error("unable to get any cards from the source")]
    NoCards,
}

/// Errors surfaced by study operations.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("no card is in focus")]
    NothingToAnswer,
}

pub type StudyResult<T> = Result<T, StudyError>;
