//! Sources of term/definition pairs for new decks.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::ImportError;
use crate::models::ImportedCard;

/// Something that can produce the cards of an external deck.
pub trait CardSource: Send + Sync {
    /// Fetch the cards found at `location`.
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<ImportedCard>, ImportError>> + Send;
}

/// Reads exported decks from disk.
///
/// `.json` files hold an array of `{num, term, definition}` objects. Anything
/// else is read as one `term<TAB>definition` pair per line, where a literal
/// `\n` inside a field stands for a line break.
#[derive(Debug, Clone, Default)]
pub struct FileSource;

impl CardSource for FileSource {
    async fn fetch(&self, location: &str) -> Result<Vec<ImportedCard>, ImportError> {
        let path = PathBuf::from(location);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ImportError::Read {
                path: path.clone(),
                source,
            })?;
        let cards = if is_json(&path) {
            serde_json::from_str(&content)?
        } else {
            parse_tab_separated(&content)?
        };
        validate(cards)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Parse a tab-separated export, numbering cards from zero.
pub fn parse_tab_separated(content: &str) -> Result<Vec<ImportedCard>, ImportError> {
    let mut cards = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (term, definition) = line
            .split_once('\t')
            .ok_or(ImportError::MalformedLine { line: index + 1 })?;
        cards.push(ImportedCard {
            num: cards.len() as i64,
            term: unescape(term),
            definition: unescape(definition),
        });
    }
    Ok(cards)
}

fn unescape(field: &str) -> String {
    field.trim().replace("\\n", "\n")
}

/// Reject empty decks, repeated numbers and blank fields.
pub fn validate(cards: Vec<ImportedCard>) -> Result<Vec<ImportedCard>, ImportError> {
    if cards.is_empty() {
        return Err(ImportError::NoCards);
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for card in &cards {
        if !seen.insert(card.num) {
            return Err(ImportError::DuplicateNum { num: card.num });
        }
        if card.term.trim().is_empty() || card.definition.trim().is_empty() {
            return Err(ImportError::EmptyField { num: card.num });
        }
    }
    Ok(cards)
}
