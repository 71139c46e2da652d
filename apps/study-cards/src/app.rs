//! Application state and logic.

use crate::config::Config;
use crossterm::event::{KeyCode, KeyEvent};
use study_core::{
    Card, CardKey, Deck, DeckId, Difficulty, FileSource, Library, Moment, Placement, QueueCounts, SqliteStore,
    StudyError, StudyResult, StudySession,
};
use tokio::runtime::Runtime;
use tracing::warn;

pub struct App {
    library: Library<SqliteStore>,
    runtime: Runtime,
    pub view: View,
    pub decks: Vec<Deck>,
    pub selected_deck: usize,
    /// Deck shown in the deck view and study screens.
    pub deck: Option<Deck>,
    pub cards: Vec<Card>,
    pub selected_card: usize,
    pub counts: QueueCounts,
    pub budget: usize,
    pub session: Option<StudySession>,
    pub editing: bool,
    pub input_buffer: String,
    pub input_field: InputField,
    pending_term: Option<String>,
    pending_import: Option<String>,
    pub confirm: Option<Confirm>,
    pub message: Option<String>,
    pub show_help: bool,
    pub quit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    DeckList,
    DeckInfo,
    CardDetail,
    Study,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    None,
    DeckName,
    ImportPath,
    ImportName,
    CardTerm,
    CardDefinition,
    StudyBudget,
}

/// A destructive action waiting for a `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    DeleteDeck(DeckId),
    DeleteCard(CardKey),
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let db_path = config.db_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = SqliteStore::open(&db_path)?;
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
        Ok(Self::with_store(store, runtime, config.study.default_new_cards))
    }

    pub fn with_store(store: SqliteStore, runtime: Runtime, default_budget: usize) -> Self {
        let mut app = Self {
            library: Library::new(store).with_default_budget(default_budget),
            runtime,
            view: View::DeckList,
            decks: Vec::new(),
            selected_deck: 0,
            deck: None,
            cards: Vec::new(),
            selected_card: 0,
            counts: QueueCounts::default(),
            budget: default_budget,
            session: None,
            editing: false,
            input_buffer: String::new(),
            input_field: InputField::None,
            pending_term: None,
            pending_import: None,
            confirm: None,
            message: None,
            show_help: false,
            quit: false,
        };
        app.refresh_decks();
        app
    }

    /// Shut down the runtime and close the database.
    pub fn close(self) -> anyhow::Result<()> {
        let Self { library, runtime, .. } = self;
        drop(runtime);
        library.into_store().close()?;
        Ok(())
    }

    pub fn selected_deck(&self) -> Option<&Deck> {
        self.decks.get(self.selected_deck)
    }

    pub fn selected_card(&self) -> Option<&Card> {
        self.cards.get(self.selected_card)
    }

    /// New cards plus reviews planned for the open deck today.
    pub fn planned(&self) -> usize {
        self.counts.planned(self.budget)
    }

    fn report<T>(&mut self, result: StudyResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "operation failed");
                self.message = Some(e.to_string());
                None
            }
        }
    }

    pub fn refresh_decks(&mut self) {
        let result = self.runtime.block_on(self.library.decks());
        if let Some(decks) = self.report(result) {
            self.decks = decks;
        }
        if self.selected_deck >= self.decks.len() {
            self.selected_deck = self.decks.len().saturating_sub(1);
        }
    }

    fn refresh_deck(&mut self) {
        let Some(deck_id) = self.deck.as_ref().map(|d| d.id) else {
            return;
        };
        let result = self.runtime.block_on(async {
            let cards = self.library.cards(deck_id).await?;
            let budget = self.library.study_budget(deck_id).await?;
            Ok::<_, StudyError>((cards, budget))
        });
        if let Some((cards, budget)) = self.report(result) {
            self.counts = QueueCounts::tally(&cards, Moment::current().today);
            self.cards = cards;
            self.budget = budget;
        }
        if self.selected_card >= self.cards.len() {
            self.selected_card = self.cards.len().saturating_sub(1);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        if self.show_help {
            self.show_help = false;
            return;
        }

        if let Some(confirm) = self.confirm.take() {
            self.handle_confirm_key(confirm, key);
            return;
        }

        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match self.view {
            View::DeckList => self.handle_deck_list_key(key),
            View::DeckInfo => self.handle_deck_info_key(key),
            View::CardDetail => self.handle_card_detail_key(key),
            View::Study => self.handle_study_key(key),
        }
    }

    fn begin_input(&mut self, field: InputField) {
        self.editing = true;
        self.input_field = field;
        self.input_buffer.clear();
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.editing = false;
                self.input_buffer.clear();
                self.input_field = InputField::None;
                self.pending_term = None;
                self.pending_import = None;
            }
            KeyCode::Enter => self.finish_editing(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, confirm: Confirm, key: KeyEvent) {
        if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            self.message = Some("Cancelled".to_string());
            return;
        }
        match confirm {
            Confirm::DeleteDeck(deck_id) => {
                let result = self.runtime.block_on(self.library.delete_deck(deck_id));
                if self.report(result).is_some() {
                    if self.deck.as_ref().is_some_and(|d| d.id == deck_id) {
                        self.deck = None;
                        self.cards.clear();
                    }
                    self.view = View::DeckList;
                    self.message = Some("Deck deleted".to_string());
                    self.refresh_decks();
                }
            }
            Confirm::DeleteCard(key) => {
                let result = self.runtime.block_on(self.library.delete_card(key));
                if self.report(result).is_some() {
                    self.view = View::DeckInfo;
                    self.message = Some("Card deleted".to_string());
                    self.refresh_deck();
                }
            }
        }
    }

    fn handle_deck_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.decks.is_empty() {
                    self.selected_deck = (self.selected_deck + 1).min(self.decks.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_deck = self.selected_deck.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('l') => self.open_deck(),
            KeyCode::Char('s') | KeyCode::Char(' ') => {
                if let Some(deck) = self.selected_deck().cloned() {
                    self.start_study(deck);
                }
            }
            KeyCode::Char('a') => self.begin_input(InputField::DeckName),
            KeyCode::Char('i') => self.begin_input(InputField::ImportPath),
            KeyCode::Char('d') => {
                if let Some(deck) = self.selected_deck() {
                    self.confirm = Some(Confirm::DeleteDeck(deck.id));
                }
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    fn handle_deck_info_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.cards.is_empty() {
                    self.selected_card = (self.selected_card + 1).min(self.cards.len() - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_card = self.selected_card.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                if self.selected_card().is_some() {
                    self.view = View::CardDetail;
                }
            }
            KeyCode::Char('s') | KeyCode::Char(' ') => {
                if let Some(deck) = self.deck.clone() {
                    self.start_study(deck);
                }
            }
            KeyCode::Char('a') => self.begin_input(InputField::CardTerm),
            KeyCode::Char('d') => {
                if let Some(card) = self.selected_card() {
                    self.confirm = Some(Confirm::DeleteCard(card.key()));
                }
            }
            KeyCode::Char('n') => {
                self.begin_input(InputField::StudyBudget);
                self.input_buffer = self.budget.to_string();
            }
            KeyCode::Char('x') => {
                if let Some(deck) = &self.deck {
                    self.confirm = Some(Confirm::DeleteDeck(deck.id));
                }
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('h') => {
                self.view = View::DeckList;
                self.refresh_decks();
            }
            _ => {}
        }
    }

    fn handle_card_detail_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('d') => {
                if let Some(card) = self.selected_card() {
                    self.confirm = Some(Confirm::DeleteCard(card.key()));
                }
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('h') => self.view = View::DeckInfo,
            _ => {}
        }
    }

    fn handle_study_key(&mut self, key: KeyEvent) {
        let Some(session) = &mut self.session else {
            self.view = View::DeckList;
            return;
        };

        if session.is_complete() {
            self.end_session();
            return;
        }

        if !session.is_revealed() {
            match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => session.reveal(),
                KeyCode::Char('q') | KeyCode::Esc => self.end_session(),
                _ => {}
            }
        } else {
            match key.code {
                KeyCode::Char(c @ '0'..='3') => {
                    if let Some(level) = c.to_digit(10) {
                        self.answer(level as u8);
                    }
                }
                KeyCode::Char('q') | KeyCode::Esc => self.end_session(),
                _ => {}
            }
        }
    }

    fn finish_editing(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        let field = self.input_field;
        self.editing = false;
        self.input_field = InputField::None;

        match field {
            InputField::DeckName => {
                let result = self.runtime.block_on(self.library.create_deck(&input));
                if let Some(deck) = self.report(result) {
                    self.message = Some(format!("Created deck {}", deck.name));
                    self.refresh_decks();
                    self.select_deck(deck.id);
                }
            }
            InputField::ImportPath => {
                let path = input.trim();
                if !path.is_empty() {
                    self.pending_import = Some(path.to_string());
                    self.begin_input(InputField::ImportName);
                }
            }
            InputField::ImportName => {
                let Some(path) = self.pending_import.take() else {
                    return;
                };
                let result = self
                    .runtime
                    .block_on(self.library.import_deck(&FileSource, &path, &input));
                if let Some(deck) = self.report(result) {
                    self.message = Some(format!("Imported {}", deck.name));
                    self.refresh_decks();
                    self.select_deck(deck.id);
                }
            }
            InputField::CardTerm => {
                self.pending_term = Some(input);
                self.begin_input(InputField::CardDefinition);
            }
            InputField::CardDefinition => {
                let (Some(term), Some(deck_id)) = (self.pending_term.take(), self.deck.as_ref().map(|d| d.id)) else {
                    return;
                };
                let result = self.runtime.block_on(self.library.add_card(deck_id, &term, &input));
                if self.report(result).is_some() {
                    self.message = Some("Card added".to_string());
                    self.refresh_deck();
                    self.selected_card = self.cards.len().saturating_sub(1);
                }
            }
            InputField::StudyBudget => {
                let Some(deck_id) = self.deck.as_ref().map(|d| d.id) else {
                    return;
                };
                let result = self.runtime.block_on(self.library.set_study_budget(deck_id, &input));
                if let Some(budget) = self.report(result) {
                    self.budget = budget;
                    self.message = Some(format!("{budget} new cards per day"));
                }
            }
            InputField::None => {}
        }
    }

    fn select_deck(&mut self, deck_id: DeckId) {
        if let Some(index) = self.decks.iter().position(|d| d.id == deck_id) {
            self.selected_deck = index;
        }
    }

    fn open_deck(&mut self) {
        let Some(deck) = self.selected_deck().cloned() else {
            return;
        };
        self.deck = Some(deck);
        self.selected_card = 0;
        self.refresh_deck();
        self.view = View::DeckInfo;
    }

    fn start_study(&mut self, deck: Deck) {
        let moment = Moment::current();
        let result = self.runtime.block_on(async {
            let budget = self.library.study_budget(deck.id).await?;
            StudySession::start(self.library.store(), deck.id, budget, &moment, &mut rand::thread_rng()).await
        });
        let Some(session) = self.report(result) else {
            return;
        };
        self.session = Some(session);
        self.deck = Some(deck);
        self.view = View::Study;
    }

    fn answer(&mut self, level: u8) {
        let difficulty = match Difficulty::try_from(level) {
            Ok(difficulty) => difficulty,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let moment = Moment::current();
        let result = self
            .runtime
            .block_on(session.answer(self.library.store(), difficulty, &moment));
        if let Some(outcome) = self.report(result) {
            if outcome.placement == Placement::Requeued {
                self.message = Some("Back in the queue for later today".to_string());
            }
        }
    }

    fn end_session(&mut self) {
        self.session = None;
        if self.deck.is_some() {
            self.view = View::DeckInfo;
            self.refresh_deck();
        } else {
            self.view = View::DeckList;
        }
    }
}
