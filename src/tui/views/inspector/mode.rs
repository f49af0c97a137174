//! Inspector modes and their command tables.
//!
//! Every table starts with the base commands (Quit, Copy, Variables) so they
//! win any key clash, then lists the mode's own commands. Actions that only
//! change mode carry the target mode, so the table alone decides where each
//! key leads.

use ratatui::style::Color;

use crate::tui::components::command_bar::Command;
use crate::tui::event::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    Pretty,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    RawRequest,
    ProcessedRequest,
    PrettyResponse(usize),
    RawResponse(usize),
    /// Assertions for response `index`; Clear goes back to that response
    /// shown as `ret`.
    Assertions { index: usize, ret: ResponseKind },
    Scripts,
    /// Logs; Clear goes back to the wrapped mode.
    Logs(Box<Mode>),
    Error(String),
}

// Title colors, after the X11 names they come from.
const ALICE_BLUE: Color = Color::Rgb(240, 248, 255);
const LAWN_GREEN: Color = Color::Rgb(124, 252, 0);
const YELLOW_GREEN: Color = Color::Rgb(154, 205, 50);
const VIOLET: Color = Color::Rgb(238, 130, 238);
pub const ORANGE_RED: Color = Color::Rgb(255, 69, 0);

impl Mode {
    pub fn response(index: usize, kind: ResponseKind) -> Mode {
        match kind {
            ResponseKind::Pretty => Mode::PrettyResponse(index),
            ResponseKind::Raw => Mode::RawResponse(index),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Mode::RawRequest | Mode::ProcessedRequest => "Request",
            Mode::PrettyResponse(_) => "Response (Pretty)",
            Mode::RawResponse(_) => "Response (Raw)",
            Mode::Assertions { .. } => "Assertions",
            Mode::Scripts => "Scripts",
            Mode::Logs(_) => "Logs",
            Mode::Error(_) => "Error!",
        }
    }

    pub fn title_color(&self) -> Color {
        match self {
            Mode::RawRequest | Mode::ProcessedRequest => ALICE_BLUE,
            Mode::PrettyResponse(_) | Mode::RawResponse(_) => LAWN_GREEN,
            Mode::Assertions { .. } | Mode::Scripts => YELLOW_GREEN,
            Mode::Logs(_) => VIOLET,
            Mode::Error(_) => ORANGE_RED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Copy,
    EditVariables,
    /// Mount the view the inspector was opened from.
    Back,
    Send,
    Goto(Mode),
}

pub fn base_commands() -> Vec<Command<Action>> {
    vec![
        Command::new("Quit", Key::Ctrl('q'), Action::Quit),
        Command::new("Copy", Key::Char('c'), Action::Copy),
        Command::new("Variables", Key::Char('v'), Action::EditVariables),
    ]
}

pub fn commands_for(mode: &Mode) -> Vec<Command<Action>> {
    let logs = || Command::new("Logs", Key::Char('l'), Action::Goto(Mode::Logs(Box::new(mode.clone()))));
    let clear_to = |target: Mode| Command::new("Clear", Key::Esc, Action::Goto(target));

    let own = match mode {
        Mode::RawRequest => vec![
            Command::new("Back", Key::Esc, Action::Back),
            Command::new("With Environment", Key::Tab, Action::Goto(Mode::ProcessedRequest)),
            Command::new("Scripts", Key::Char('s'), Action::Goto(Mode::Scripts)),
            Command::new("Send", Key::Enter, Action::Send),
            logs(),
        ],
        Mode::ProcessedRequest => vec![
            Command::new("Back", Key::Esc, Action::Back),
            Command::new("Raw Request", Key::Tab, Action::Goto(Mode::RawRequest)),
            Command::new("Scripts", Key::Char('s'), Action::Goto(Mode::Scripts)),
            Command::new("Send", Key::Enter, Action::Send),
            logs(),
        ],
        Mode::PrettyResponse(index) => vec![
            clear_to(Mode::RawRequest),
            Command::new("Raw", Key::Char('r'), Action::Goto(Mode::RawResponse(*index))),
            Command::new(
                "Assertions",
                Key::Char('a'),
                Action::Goto(Mode::Assertions { index: *index, ret: ResponseKind::Pretty }),
            ),
            logs(),
        ],
        Mode::RawResponse(index) => vec![
            clear_to(Mode::RawRequest),
            Command::new("Pretty Print", Key::Char('r'), Action::Goto(Mode::PrettyResponse(*index))),
            Command::new(
                "Assertions",
                Key::Char('a'),
                Action::Goto(Mode::Assertions { index: *index, ret: ResponseKind::Raw }),
            ),
            logs(),
        ],
        Mode::Assertions { index, ret } => vec![clear_to(Mode::response(*index, *ret)), logs()],
        Mode::Scripts => vec![clear_to(Mode::RawRequest)],
        Mode::Logs(ret) => vec![clear_to(ret.as_ref().clone())],
        Mode::Error(_) => vec![clear_to(Mode::RawRequest), logs()],
    };

    let mut commands = base_commands();
    commands.extend(own);
    commands
}
