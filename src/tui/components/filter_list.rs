//! # FuzzyFilterList Component
//!
//! A selectable list narrowed incrementally by a query typed underneath it.
//! Used by both selection screens.
//!
//! ## State
//!
//! - `items`: the full list, in load order. Never reordered or mutated.
//! - `filtered`: indices into `items` for the current query. Empty query
//!   means every index in order; otherwise the ranking from `core::fuzzy`.
//! - `list_state`: highlighted row within `filtered`. `Some` exactly when
//!   `filtered` is non-empty.
//!
//! ## Key Routing
//!
//! Esc, Up, Down, PageUp, PageDown, Home, End and Enter drive the list and
//! never reach the query buffer. Everything else edits the buffer and
//! refilters.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::fuzzy;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::{Key, TuiEvent};

const PAGE_SIZE: usize = 10;

/// Anything the list can show.
pub trait Labeled {
    fn label(&self) -> String;
}

/// Events emitted by the filter list.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEvent<T> {
    Selected(T),
    Dismiss,
}

pub struct FuzzyFilterList<T> {
    title: &'static str,
    items: Vec<T>,
    labels: Vec<String>,
    filtered: Vec<usize>,
    query: String,
    list_state: ListState,
    case_sensitive: bool,
}

impl<T: Labeled + Clone> FuzzyFilterList<T> {
    pub fn new(title: &'static str, case_sensitive: bool) -> Self {
        Self {
            title,
            items: Vec::new(),
            labels: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            list_state: ListState::default(),
            case_sensitive,
        }
    }

    /// Replace the items and reset the query.
    pub fn load(&mut self, items: Vec<T>) {
        self.labels = items.iter().map(Labeled::label).collect();
        self.items = items;
        self.set_query(String::new());
    }

    /// Refilter against `query`.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.filtered = fuzzy::rank(&self.labels, &self.query, self.case_sensitive);
        self.list_state
            .select(if self.filtered.is_empty() { None } else { Some(0) });
    }

    /// Take the highlighted item and reset to the unfiltered list.
    pub fn select(&mut self) -> Option<T> {
        let picked = self
            .list_state
            .selected()
            .and_then(|row| self.filtered.get(row))
            .map(|&i| self.items[i].clone());
        self.set_query(String::new());
        picked
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Labels of the currently visible items, in display order.
    pub fn visible_labels(&self) -> Vec<&str> {
        self.filtered
            .iter()
            .map(|&i| self.labels[i].as_str())
            .collect()
    }

    pub fn highlighted_label(&self) -> Option<&str> {
        self.list_state
            .selected()
            .and_then(|row| self.filtered.get(row))
            .map(|&i| self.labels[i].as_str())
    }

    fn move_by(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let last = self.filtered.len() - 1;
        let current = self.list_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.list_state.select(Some(next));
    }

    fn move_to(&mut self, row: usize) {
        if !self.filtered.is_empty() {
            self.list_state.select(Some(row.min(self.filtered.len() - 1)));
        }
    }
}

impl<T: Labeled + Clone> EventHandler for FuzzyFilterList<T> {
    type Event = FilterEvent<T>;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<FilterEvent<T>> {
        match event {
            TuiEvent::Key(Key::Esc) => return Some(FilterEvent::Dismiss),
            TuiEvent::Key(Key::Enter) => return self.select().map(FilterEvent::Selected),
            TuiEvent::Key(Key::Up) => self.move_by(-1),
            TuiEvent::Key(Key::Down) => self.move_by(1),
            TuiEvent::Key(Key::PageUp) => self.move_by(-(PAGE_SIZE as isize)),
            TuiEvent::Key(Key::PageDown) => self.move_by(PAGE_SIZE as isize),
            TuiEvent::Key(Key::Home) => self.move_to(0),
            TuiEvent::Key(Key::End) => self.move_to(usize::MAX),
            TuiEvent::Key(Key::Char(c)) => {
                let mut query = std::mem::take(&mut self.query);
                query.push(*c);
                self.set_query(query);
            }
            TuiEvent::Key(Key::Backspace) => {
                let mut query = std::mem::take(&mut self.query);
                query.pop();
                self.set_query(query);
            }
            TuiEvent::Paste(text) => {
                let mut query = std::mem::take(&mut self.query);
                query.extend(text.chars().filter(|c| !c.is_control()));
                self.set_query(query);
            }
            _ => {}
        }
        None
    }
}

impl<T: Labeled + Clone> Component for FuzzyFilterList<T> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [list_area, input_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

        let items: Vec<ListItem> = self
            .filtered
            .iter()
            .map(|&i| ListItem::new(Line::from(self.labels[i].as_str())))
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(format!(" {} ", self.title)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("> ");
        frame.render_stateful_widget(list, list_area, &mut self.list_state);

        let input = Paragraph::new(self.query.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Fuzzy Filter "),
        );
        frame.render_widget(input, input_area);

        let cursor_x = input_area.x + 1 + self.query.width() as u16;
        if cursor_x < input_area.right().saturating_sub(1) {
            frame.set_cursor_position((cursor_x, input_area.y + 1));
        }
    }
}
