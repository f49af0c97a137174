//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, owns the `Host`, and
//! wires the views together.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Loop
//!
//! Single-threaded and blocking: draw, wait for one event, hand it to the
//! host, repeat. A send runs to completion inside the handler, so the
//! screen does not update while a request is in flight.
//!
//! Ctrl+C (`ForceQuit`) ends the loop from any view. Everything else goes to
//! the mounted view.

pub mod clipboard;
pub mod component;
pub mod components;
pub mod event;
pub mod highlight;
pub mod view;
pub mod views;

use log::info;
use std::io::stdout;

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::core::discovery::FileEntry;
use crate::tui::event::{TuiEvent, next_event};
use crate::tui::view::{Host, ViewRef};
use crate::tui::views::{FileSelectView, RequestInspector, RequestSelectView, Services};

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, Hide);
    }
}

/// Build the file → request → inspector chain and return its first screen.
pub fn build_views(files: Vec<FileEntry>, services: Services) -> ViewRef {
    let case_sensitive = services.case_sensitive;
    FileSelectView::new(
        files,
        case_sensitive,
        Box::new(move |entry, previous, host| {
            let inspector_services = services.clone();
            RequestSelectView::open(
                &entry.path,
                services.ctx.engine(),
                previous,
                case_sensitive,
                Box::new(move |request, previous, host| {
                    let inspector =
                        RequestInspector::new(request, previous, inspector_services.clone());
                    host.mount(inspector);
                }),
                host,
            )
        }),
    )
}

pub fn run(files: Vec<FileEntry>, services: Services) -> std::io::Result<()> {
    let mut terminal = ratatui::init();
    let result = TerminalModeGuard::new().and_then(|_guard| {
        let mut host = Host::new(build_views(files, services));
        event_loop(&mut terminal, &mut host)
    });
    ratatui::restore();
    result
}

fn event_loop(terminal: &mut DefaultTerminal, host: &mut Host) -> std::io::Result<()> {
    host.settle();
    while host.is_running() {
        terminal.draw(|frame| host.render(frame))?;

        match next_event()? {
            TuiEvent::ForceQuit => {
                info!("Force quit");
                host.stop();
            }
            // Redrawn on the next iteration
            TuiEvent::Resize => {}
            event => host.dispatch(&event),
        }
    }
    info!("Event loop finished");
    Ok(())
}
