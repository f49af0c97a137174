use std::fmt;
use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key press, reduced to what views and command tables care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Esc,
    Enter,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    /// Ctrl + a letter, stored lowercase.
    Ctrl(char),
    /// A printable character.
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Esc => write!(f, "Esc"),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
            Key::BackTab => write!(f, "Backtab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
            Key::PageUp => write!(f, "PgUp"),
            Key::PageDown => write!(f, "PgDn"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::Ctrl(c) => write!(f, "Ctrl-{}", c.to_ascii_uppercase()),
            Key::Char(c) => write!(f, "{c}"),
        }
    }
}

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    Key(Key),
    Paste(String), // Bracketed paste - preserves newlines
    Resize,
    ForceQuit, // Ctrl+C
}

/// Block until the next relevant terminal event.
///
/// Events that translate to nothing (key releases, mouse, focus) are skipped.
pub fn next_event() -> io::Result<TuiEvent> {
    loop {
        if let Some(event) = translate(event::read()?) {
            return Ok(event);
        }
    }
}

/// Map a raw crossterm event onto a `TuiEvent`.
pub fn translate(event: Event) -> Option<TuiEvent> {
    match event {
        Event::Key(key_event) => {
            if key_event.kind == KeyEventKind::Release {
                return None;
            }
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            translate_key(key_event)
        }
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn translate_key(key_event: KeyEvent) -> Option<TuiEvent> {
    let key = match (key_event.modifiers, key_event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Some(TuiEvent::ForceQuit),
        (m, KeyCode::Char(c)) if m.contains(KeyModifiers::CONTROL) => {
            Key::Ctrl(c.to_ascii_lowercase())
        }
        (_, KeyCode::Char(c)) => Key::Char(c),
        (_, KeyCode::Esc) => Key::Esc,
        (_, KeyCode::Enter) => Key::Enter,
        (_, KeyCode::Tab) => Key::Tab,
        (_, KeyCode::BackTab) => Key::BackTab,
        (_, KeyCode::Backspace) => Key::Backspace,
        (_, KeyCode::Delete) => Key::Delete,
        (_, KeyCode::Up) => Key::Up,
        (_, KeyCode::Down) => Key::Down,
        (_, KeyCode::Left) => Key::Left,
        (_, KeyCode::Right) => Key::Right,
        (_, KeyCode::PageUp) => Key::PageUp,
        (_, KeyCode::PageDown) => Key::PageDown,
        (_, KeyCode::Home) => Key::Home,
        (_, KeyCode::End) => Key::End,
        _ => return None,
    };
    Some(TuiEvent::Key(key))
}
