//! # CommandBar Component
//!
//! A command table is an ordered list of `(label, key, action)` bindings.
//! Views own one table per mode and swap it wholesale on every transition.
//!
//! ## Dispatch Rule
//!
//! The table is searched in registration order and the first command whose
//! key matches wins. `Key::Char('c')` only matches the character `c`, so a
//! character binding never shadows a different character. Unmatched keys
//! return `None` and the caller decides what to do with them.
//!
//! ## Display
//!
//! The bar renders every command as `label (binding)`, in table order,
//! joined by [`SEPARATOR`]:
//!
//! ```text
//! Quit (Ctrl-Q) | Copy (c) | Variables (v) | Back (Esc) | Send (s)
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Wrap};

use crate::tui::component::Component;
use crate::tui::event::Key;

pub const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<A> {
    pub label: &'static str,
    pub key: Key,
    pub action: A,
}

impl<A> Command<A> {
    pub fn new(label: &'static str, key: Key, action: A) -> Self {
        Self { label, key, action }
    }
}

/// First action bound to `key`, in registration order.
pub fn dispatch<A: Clone>(commands: &[Command<A>], key: Key) -> Option<A> {
    commands
        .iter()
        .find(|command| command.key == key)
        .map(|command| command.action.clone())
}

/// Render a table as `label (binding)` entries joined by the separator.
pub fn format<A>(commands: &[Command<A>]) -> String {
    commands
        .iter()
        .map(|command| format!("{} ({})", command.label, command.key))
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Bottom line listing the active commands.
pub struct CommandBar<'a, A> {
    pub commands: &'a [Command<A>],
}

impl<A> Component for CommandBar<'_, A> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let bar = Paragraph::new(format(self.commands))
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        frame.render_widget(bar, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Act {
        First,
        Second,
        Other,
    }

    fn table() -> Vec<Command<Act>> {
        vec![
            Command::new("Quit", Key::Ctrl('q'), Act::First),
            Command::new("Copy", Key::Char('c'), Act::First),
            Command::new("Clear", Key::Char('c'), Act::Second),
            Command::new("Back", Key::Esc, Act::Other),
        ]
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(dispatch(&table(), Key::Char('c')), Some(Act::First));
    }

    #[test]
    fn test_character_triggers_match_exact_char() {
        assert_eq!(dispatch(&table(), Key::Char('C')), None);
        assert_eq!(dispatch(&table(), Key::Char('q')), None);
        assert_eq!(dispatch(&table(), Key::Ctrl('q')), Some(Act::First));
    }

    #[test]
    fn test_unmatched_key_is_noop() {
        assert_eq!(dispatch(&table(), Key::Down), None);
        assert_eq!(dispatch::<Act>(&[], Key::Esc), None);
    }

    #[test]
    fn test_format_in_order() {
        assert_eq!(
            format(&table()),
            "Quit (Ctrl-Q) | Copy (c) | Clear (c) | Back (Esc)"
        );
        assert_eq!(format::<Act>(&[]), "");
    }
}
