//! UI rendering for study-cards.

use crate::app::{App, Confirm, InputField, View};
use chrono::{DateTime, Local, NaiveDate, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};
use study_core::Difficulty;

pub fn draw(f: &mut Frame, app: &App) {
    match app.view {
        View::DeckList => draw_deck_list(f, app),
        View::DeckInfo => draw_deck_info(f, app),
        View::CardDetail => draw_card_detail(f, app),
        View::Study => draw_study(f, app),
    }

    if app.show_help {
        draw_help(f);
    }

    if app.editing {
        draw_input(f, app);
    }

    if let Some(confirm) = &app.confirm {
        draw_confirm(f, confirm);
    }

    if let Some(msg) = &app.message {
        draw_message(f, msg);
    }
}

fn screen(f: &Frame) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area())
}

fn header(f: &mut Frame, area: Rect, title: &str) {
    let header = Paragraph::new(title.to_string())
        .style(Style::default().add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn footer(f: &mut Frame, area: Rect, keys: &str) {
    let footer = Paragraph::new(keys.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn highlight(selected: bool) -> Style {
    if selected {
        Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn draw_deck_list(f: &mut Frame, app: &App) {
    let chunks = screen(f);
    header(f, chunks[0], "Study Cards");

    if app.decks.is_empty() {
        let msg = Paragraph::new("No decks yet. Press 'a' to create one or 'i' to import.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Decks "));
        f.render_widget(msg, chunks[1]);
    } else {
        let items: Vec<ListItem> = app
            .decks
            .iter()
            .enumerate()
            .map(|(i, deck)| {
                let spans = vec![
                    Span::styled(format!("{:>4}  ", deck.id), Style::default().fg(Color::DarkGray)),
                    Span::raw(deck.name.as_str()),
                ];
                ListItem::new(Line::from(spans)).style(highlight(i == app.selected_deck))
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Decks "));
        f.render_widget(list, chunks[1]);
    }

    footer(
        f,
        chunks[2],
        "j/k:Navigate  Enter:Open  s:Study  a:New deck  i:Import  d:Delete  ?:Help  q:Quit",
    );
}

fn draw_deck_info(f: &mut Frame, app: &App) {
    let chunks = screen(f);
    let title = app.deck.as_ref().map_or("Deck", |d| d.name.as_str());
    header(f, chunks[0], title);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    if app.cards.is_empty() {
        let msg = Paragraph::new("No cards yet. Press 'a' to add one.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Cards "));
        f.render_widget(msg, body[0]);
    } else {
        let today = Local::now().date_naive();
        let rows: Vec<Row> = app
            .cards
            .iter()
            .enumerate()
            .map(|(i, card)| {
                Row::new(vec![
                    card.num.to_string(),
                    first_line(&card.term),
                    first_line(&card.definition),
                    due_label(card.review.time_due, today),
                ])
                .style(highlight(i == app.selected_card))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Percentage(35),
                Constraint::Percentage(40),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["#", "Term", "Definition", "Due"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(format!(" Cards ({}) ", app.cards.len())));
        f.render_widget(table, body[0]);
    }

    let counts = &app.counts;
    let lines = vec![
        stat_line("Reviews due", counts.review, Color::Yellow),
        stat_line("New", counts.new, Color::Blue),
        stat_line("Done today", counts.completed, Color::Green),
        Line::raw(""),
        stat_line("New cards per day", app.budget, Color::White),
        stat_line("Planned today", app.planned(), Color::Cyan),
    ];
    let stats = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Today "));
    f.render_widget(stats, body[1]);

    footer(
        f,
        chunks[2],
        "j/k:Navigate  Enter:Card  s:Study  a:Add card  d:Delete card  n:New per day  x:Delete deck  q:Back",
    );
}

fn stat_line(label: &str, value: usize, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(value.to_string(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

fn due_label(due: Option<NaiveDate>, today: NaiveDate) -> String {
    match due {
        None => "new".to_string(),
        Some(day) if day <= today => "today".to_string(),
        Some(day) => day.format("%Y-%m-%d").to_string(),
    }
}

fn day_label(day: Option<NaiveDate>) -> String {
    day.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

fn instant_label(instant: Option<DateTime<Utc>>) -> String {
    instant.map_or_else(
        || "-".to_string(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn draw_card_detail(f: &mut Frame, app: &App) {
    let chunks = screen(f);
    let Some(card) = app.selected_card() else {
        return;
    };
    header(f, chunks[0], &format!("Card {}", card.num));

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(35), Constraint::Min(6)])
        .split(chunks[1]);

    let term = Paragraph::new(card.term.as_str())
        .block(Block::default().borders(Borders::ALL).title(" Term "))
        .wrap(Wrap { trim: false });
    f.render_widget(term, body[0]);

    let definition = Paragraph::new(card.definition.as_str())
        .style(Style::default().fg(Color::Green))
        .block(Block::default().borders(Borders::ALL).title(" Definition "))
        .wrap(Wrap { trim: false });
    f.render_widget(definition, body[1]);

    let review = &card.review;
    let rows = vec![
        Row::new(vec!["First studied".to_string(), day_label(review.first_studied)]),
        Row::new(vec!["Last studied".to_string(), day_label(review.last_studied)]),
        Row::new(vec!["Due".to_string(), day_label(review.time_due)]),
        Row::new(vec!["Again at".to_string(), instant_label(review.exact_time)]),
    ];
    let table = Table::new(rows, [Constraint::Length(16), Constraint::Min(0)])
        .block(Block::default().borders(Borders::ALL).title(" Schedule "));
    f.render_widget(table, body[2]);

    footer(f, chunks[2], "d:Delete  q:Back  ?:Help");
}

fn draw_study(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Card
            Constraint::Length(3), // Buttons
        ])
        .split(f.area());

    let Some(session) = &app.session else {
        return;
    };

    let deck_name = app.deck.as_ref().map_or("", |d| d.name.as_str());
    let progress = Paragraph::new(format!(
        "{deck_name} | {} / {} remaining | {} answered",
        session.remaining(),
        session.planned(),
        session.answered()
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(progress, chunks[0]);

    let card_area = chunks[1];
    match session.current() {
        Some(card) if session.is_revealed() => {
            let inner = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(card_area);

            let term = Paragraph::new(card.term.as_str())
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Term "))
                .wrap(Wrap { trim: false });
            f.render_widget(term, inner[0]);

            let definition = Paragraph::new(card.definition.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Green))
                .block(Block::default().borders(Borders::ALL).title(" Definition "))
                .wrap(Wrap { trim: false });
            f.render_widget(definition, inner[1]);
        }
        Some(card) => {
            let term = Paragraph::new(card.term.as_str())
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Term "))
                .wrap(Wrap { trim: false });
            f.render_widget(term, card_area);
        }
        None => {
            let complete = Paragraph::new("All done for today! Press any key to continue.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(complete, card_area);
        }
    }

    let buttons: Vec<(String, &str, Color)> = if session.is_complete() {
        Vec::new()
    } else if session.is_revealed() {
        Difficulty::ALL
            .iter()
            .map(|d| (d.key().to_string(), d.name(), difficulty_color(*d)))
            .collect()
    } else {
        vec![("Space".to_string(), "Show definition", Color::White)]
    };

    let button_spans: Vec<Span> = buttons
        .iter()
        .flat_map(|(key, label, color)| {
            vec![
                Span::styled(format!("[{}]", key), Style::default().fg(*color).add_modifier(Modifier::BOLD)),
                Span::raw(format!(" {} ", label)),
                Span::raw("  "),
            ]
        })
        .collect();

    let button_line = Paragraph::new(Line::from(button_spans))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(button_line, chunks[2]);
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Trivial => Color::Blue,
        Difficulty::Easy => Color::Green,
        Difficulty::Okay => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help = r#"
Study Cards Keybindings

Decks:
  j/k, Up/Down    Navigate
  Enter           Open deck
  s, Space        Study
  a               New deck
  i               Import deck from file
  d               Delete deck
  q               Quit

Deck view:
  a               Add card
  d               Delete card
  n               Set new cards per day
  x               Delete deck

Study:
  Space           Show definition
  0               Way too easy
  1               Pretty easy
  2               Alright
  3               Difficult
  q, Esc          End session

Press any key to close
"#;

    let popup = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn draw_input(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 15, f.area());
    f.render_widget(Clear, area);

    let title = match app.input_field {
        InputField::DeckName => "Deck name",
        InputField::ImportPath => "File to import (.json or tab-separated)",
        InputField::ImportName => "Name for the imported deck",
        InputField::CardTerm => "Term",
        InputField::CardDefinition => "Definition",
        InputField::StudyBudget => "New cards per day",
        InputField::None => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));
    f.render_widget(input, area);

    f.set_cursor_position((area.x + 1 + app.input_buffer.chars().count() as u16, area.y + 1));
}

fn draw_confirm(f: &mut Frame, confirm: &Confirm) {
    let area = centered_rect(40, 15, f.area());
    f.render_widget(Clear, area);

    let question = match confirm {
        Confirm::DeleteDeck(_) => "Delete this deck and all its cards?",
        Confirm::DeleteCard(_) => "Delete this card?",
    };
    let popup = Paragraph::new(vec![Line::raw(question), Line::raw(""), Line::raw("y: Yes    any other key: No")])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title(" Confirm "));
    f.render_widget(popup, area);
}

fn draw_message(f: &mut Frame, msg: &str) {
    let area = Rect::new(
        f.area().x + 2,
        f.area().height.saturating_sub(5),
        f.area().width.saturating_sub(4),
        3,
    );
    f.render_widget(Clear, area);

    let message = Paragraph::new(msg)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(message, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_label() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(due_label(None, today), "new");
        assert_eq!(due_label(Some(today), today), "today");
        assert_eq!(due_label(NaiveDate::from_ymd_opt(2024, 5, 1), today), "today");
        assert_eq!(due_label(NaiveDate::from_ymd_opt(2024, 6, 1), today), "2024-06-01");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("do\n{\n}"), "do");
        assert_eq!(first_line(""), "");
    }
}
