//! # TextEditorView
//!
//! Modal editor over the environment as `KEY=VALUE` lines.
//!
//! Ctrl+S writes the buffer back into the environment in place (lines without
//! `=` are skipped) and runs `on_save`. Esc drops the edits and runs
//! `on_cancel`. Both callbacks are expected to mount the view that opened
//! the editor.

use log::info;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::core::env::Environment;
use crate::tui::event::{Key, TuiEvent};
use crate::tui::view::{Host, View};

pub type EditorCallback = Box<dyn FnMut(&mut Host)>;

const HELP: &str = "Ctrl+S: Save, Esc: Cancel";
const PLACEHOLDER: &str = "One variable per line as KEY=VALUE";

pub struct TextEditorView {
    title: String,
    env: Environment,
    lines: Vec<String>,
    /// Cursor row into `lines`.
    row: usize,
    /// Cursor column, in chars.
    col: usize,
    /// First visible row.
    offset: usize,
    on_save: EditorCallback,
    on_cancel: EditorCallback,
}

impl TextEditorView {
    /// Editor seeded from the current contents of `env`.
    pub fn new(
        title: impl Into<String>,
        env: Environment,
        on_save: EditorCallback,
        on_cancel: EditorCallback,
    ) -> Self {
        let text = env.to_text();
        let lines = if text.is_empty() {
            vec![String::new()]
        } else {
            text.split('\n').map(str::to_string).collect()
        };
        Self {
            title: title.into(),
            env,
            lines,
            row: 0,
            col: 0,
            offset: 0,
            on_save,
            on_cancel,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn is_blank(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    fn byte_index(&self) -> usize {
        let line = &self.lines[self.row];
        line.char_indices()
            .nth(self.col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn line_chars(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    fn insert_newline(&mut self) {
        let at = self.byte_index();
        let rest = self.lines[self.row].split_off(at);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.col = 0;
    }

    fn insert_text(&mut self, text: &str) {
        for c in text.chars() {
            match c {
                '\n' => self.insert_newline(),
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let at = self.byte_index();
            self.lines[self.row].remove(at);
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_chars(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    fn delete(&mut self) {
        if self.col < self.line_chars(self.row) {
            let at = self.byte_index();
            self.lines[self.row].remove(at);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    fn move_cursor(&mut self, key: Key) {
        match key {
            Key::Left if self.col > 0 => self.col -= 1,
            Key::Left if self.row > 0 => {
                self.row -= 1;
                self.col = self.line_chars(self.row);
            }
            Key::Right if self.col < self.line_chars(self.row) => self.col += 1,
            Key::Right if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = 0;
            }
            Key::Up if self.row > 0 => {
                self.row -= 1;
                self.col = self.col.min(self.line_chars(self.row));
            }
            Key::Down if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = self.col.min(self.line_chars(self.row));
            }
            Key::Home => self.col = 0,
            Key::End => self.col = self.line_chars(self.row),
            _ => {}
        }
    }

    fn save(&mut self, host: &mut Host) {
        let count = self.env.apply_text(&self.text());
        info!("Environment updated from editor ({count} variables)");
        (self.on_save)(host);
    }

    fn render_body(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);

        let height = inner.height.max(1) as usize;
        if self.row < self.offset {
            self.offset = self.row;
        } else if self.row >= self.offset + height {
            self.offset = self.row + 1 - height;
        }

        let body = if self.is_blank() {
            Paragraph::new(Line::from(Span::styled(
                PLACEHOLDER,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )))
        } else {
            let lines: Vec<Line> = self
                .lines
                .iter()
                .skip(self.offset)
                .take(height)
                .map(|l| Line::raw(l.as_str()))
                .collect();
            Paragraph::new(lines)
        };
        frame.render_widget(body.block(block), area);

        let line = &self.lines[self.row];
        let before = &line[..self.byte_index()];
        let x = inner.x + (before.width() as u16).min(inner.width.saturating_sub(1));
        let y = inner.y + (self.row - self.offset) as u16;
        frame.set_cursor_position((x, y));
    }
}

impl View for TextEditorView {
    fn name(&self) -> &'static str {
        "text-editor"
    }

    fn render(&mut self, frame: &mut Frame) {
        let [body_area, help_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());
        self.render_body(frame, body_area);
        frame.render_widget(
            Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
            help_area,
        );
    }

    fn handle_event(&mut self, event: &TuiEvent, host: &mut Host) {
        match event {
            TuiEvent::Key(Key::Ctrl('s')) => self.save(host),
            TuiEvent::Key(Key::Esc) => {
                info!("Environment edit cancelled");
                (self.on_cancel)(host);
            }
            TuiEvent::Key(Key::Enter) => self.insert_newline(),
            TuiEvent::Key(Key::Backspace) => self.backspace(),
            TuiEvent::Key(Key::Delete) => self.delete(),
            TuiEvent::Key(Key::Char(c)) => self.insert_char(*c),
            TuiEvent::Key(key) => self.move_cursor(*key),
            TuiEvent::Paste(text) => self.insert_text(text),
            _ => {}
        }
    }
}
