//! SQLite-backed card store.
//!
//! Each operation runs on tokio's blocking pool against a single shared
//! connection. Day-level dates are stored as `YYYY-MM-DD` text and exact
//! instants as RFC 3339 text.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::{CardStore, DeckStore, Preferences};
use crate::error::{StoreError, StoreResult};
use crate::models::{Card, CardKey, Deck, DeckId, ImportedCard, ReviewMetadata};

const SCHEMA: &str = r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS decks (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cards (
        deck_id INTEGER NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
        num INTEGER NOT NULL,
        term TEXT NOT NULL,
        definition TEXT NOT NULL,
        last_studied TEXT,
        time_due TEXT,
        exact_time TEXT,
        first_studied TEXT,
        PRIMARY KEY (deck_id, num)
    );

    CREATE TABLE IF NOT EXISTS preferences (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

const CARD_COLUMNS: &str =
    "deck_id, num, term, definition, last_studied, time_due, exact_time, first_studied";

/// Shared handle to the study database.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (and create if needed) the database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Close the connection. Fails if another handle to the store is alive.
    pub fn close(self) -> StoreResult<()> {
        let conn = Arc::try_unwrap(self.conn)
            .map_err(|_| StoreError::InUse)?
            .into_inner()
            .map_err(|_| StoreError::Poisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    async fn run<T, F>(&self, task: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            task(&mut conn)
        })
        .await?
    }
}

impl CardStore for SqliteStore {
    async fn list_cards(&self, deck_id: DeckId) -> StoreResult<Vec<Card>> {
        self.run(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CARD_COLUMNS} FROM cards WHERE deck_id = ?1 ORDER BY num"
            ))?;
            let cards = stmt
                .query_map(params![deck_id], parse_card_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(cards)
        })
        .await
    }

    async fn update_card_metadata(&self, key: CardKey, review: ReviewMetadata) -> StoreResult<()> {
        self.run(move |conn| {
            let updated = conn.execute(
                "UPDATE cards
                 SET last_studied = ?1, time_due = ?2, exact_time = ?3, first_studied = ?4
                 WHERE deck_id = ?5 AND num = ?6",
                params![
                    review.last_studied.map(|d| d.to_string()),
                    review.time_due.map(|d| d.to_string()),
                    review.exact_time.map(|t| t.to_rfc3339()),
                    review.first_studied.map(|d| d.to_string()),
                    key.deck_id,
                    key.num,
                ],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(format!("card {key}")));
            }
            Ok(())
        })
        .await
    }
}

impl DeckStore for SqliteStore {
    async fn list_decks(&self) -> StoreResult<Vec<Deck>> {
        self.run(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM decks ORDER BY id")?;
            let decks = stmt
                .query_map([], |row| {
                    Ok(Deck {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(decks)
        })
        .await
    }

    async fn create_deck(&self, name: String, cards: Vec<ImportedCard>) -> StoreResult<Deck> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let id: DeckId = tx.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM decks", [], |row| row.get(0))?;
            tx.execute("INSERT INTO decks (id, name) VALUES (?1, ?2)", params![id, name])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO cards (deck_id, num, term, definition) VALUES (?1, ?2, ?3, ?4)",
                )?;
                for card in &cards {
                    insert.execute(params![id, card.num, card.term, card.definition])?;
                }
            }
            tx.commit()?;
            debug!(deck_id = id, cards = cards.len(), "created deck");
            Ok(Deck { id, name })
        })
        .await
    }

    async fn delete_deck(&self, deck_id: DeckId) -> StoreResult<()> {
        self.run(move |conn| {
            let deleted = conn.execute("DELETE FROM decks WHERE id = ?1", params![deck_id])?;
            if deleted == 0 {
                return Err(StoreError::NotFound(format!("deck {deck_id}")));
            }
            Ok(())
        })
        .await
    }

    async fn add_card(&self, deck_id: DeckId, term: String, definition: String) -> StoreResult<Card> {
        self.run(move |conn| {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row("SELECT 1 FROM decks WHERE id = ?1", params![deck_id], |_| Ok(()))
                .optional()?
                .is_some();
            if !exists {
                return Err(StoreError::NotFound(format!("deck {deck_id}")));
            }
            let num: i64 = tx.query_row(
                "SELECT COALESCE(MAX(num), -1) + 1 FROM cards WHERE deck_id = ?1",
                params![deck_id],
                |row| row.get(0),
            )?;
            tx.execute(
                "INSERT INTO cards (deck_id, num, term, definition) VALUES (?1, ?2, ?3, ?4)",
                params![deck_id, num, term, definition],
            )?;
            tx.commit()?;
            Ok(Card::new(deck_id, num, term, definition))
        })
        .await
    }

    async fn delete_card(&self, key: CardKey) -> StoreResult<()> {
        self.run(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM cards WHERE deck_id = ?1 AND num = ?2",
                params![key.deck_id, key.num],
            )?;
            if deleted == 0 {
                return Err(StoreError::NotFound(format!("card {key}")));
            }
            Ok(())
        })
        .await
    }
}

impl Preferences for SqliteStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let key = key.to_string();
        self.run(move |conn| {
            let value = conn
                .query_row("SELECT value FROM preferences WHERE key = ?1", params![key], |row| row.get(0))
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let key = key.to_string();
        self.run(move |conn| {
            conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
            Ok(())
        })
        .await
    }
}

fn parse_card_row(row: &Row) -> rusqlite::Result<Card> {
    Ok(Card {
        deck_id: row.get(0)?,
        num: row.get(1)?,
        term: row.get(2)?,
        definition: row.get(3)?,
        review: ReviewMetadata {
            last_studied: parse_column(row, 4, |s| s.parse::<NaiveDate>())?,
            time_due: parse_column(row, 5, |s| s.parse::<NaiveDate>())?,
            exact_time: parse_column(row, 6, |s| {
                DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
            })?,
            first_studied: parse_column(row, 7, |s| s.parse::<NaiveDate>())?,
        },
    })
}

fn parse_column<T, E>(row: &Row, idx: usize, parse: impl FnOnce(&str) -> Result<T, E>) -> rusqlite::Result<Option<T>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| parse(&s).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))))
        .transpose()
}
