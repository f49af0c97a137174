//! # Views and the Host
//!
//! A `View` is a full screen. The `Host` holds exactly one mounted view, the
//! root, and is the only thing the event loop draws or feeds events to.
//!
//! There is no navigation stack. A view that can be backed out of is built
//! with a `ViewRef` to its predecessor and mounts it directly:
//!
//! ```text
//! FileSelectView ◄── RequestSelectView ◄── RequestInspector ◄── TextEditorView
//!      (root)          previous                previous            save/cancel
//! ```
//!
//! Backing out of the inspector mounts the request list, which in turn knows
//! how to get back to the file list, so multi-level back-navigation is just a
//! chain of single hops.
//!
//! ## Borrowing
//!
//! Views live in `Rc<RefCell<_>>` and are mutably borrowed while they handle
//! an event. `Host::mount` therefore only swaps the root pointer; the
//! `on_mount` hook of the newly mounted view runs later, from `settle`, once
//! no view is borrowed. A view may mount itself or its predecessor from
//! inside its own event handler.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use ratatui::Frame;

use super::event::TuiEvent;

pub type ViewRef = Rc<RefCell<dyn View>>;

pub trait View {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Draw the whole screen.
    fn render(&mut self, frame: &mut Frame);

    /// Handle one event. Navigation happens through `host`.
    fn handle_event(&mut self, event: &TuiEvent, host: &mut Host);

    /// Called after the view becomes the root, before it is next drawn.
    fn on_mount(&mut self) {}
}

pub struct Host {
    root: ViewRef,
    pending_mount: bool,
    running: bool,
}

impl Host {
    /// Create a host with `root` already mounted.
    pub fn new(root: ViewRef) -> Self {
        Self {
            root,
            pending_mount: true,
            running: true,
        }
    }

    /// Make `view` the sole visible screen.
    pub fn mount(&mut self, view: ViewRef) {
        self.root = view;
        self.pending_mount = true;
    }

    /// The currently mounted view.
    pub fn root(&self) -> ViewRef {
        Rc::clone(&self.root)
    }

    /// True when `view` is the mounted view.
    pub fn is_mounted(&self, view: &ViewRef) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.root), Rc::as_ptr(view))
    }

    /// Ask the event loop to exit.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Route one event to the root view, then run any pending mount hook.
    pub fn dispatch(&mut self, event: &TuiEvent) {
        let root = self.root();
        root.borrow_mut().handle_event(event, self);
        self.settle();
    }

    /// Run `on_mount` for a view mounted since the last call.
    pub fn settle(&mut self) {
        if std::mem::take(&mut self.pending_mount) {
            let mut root = self.root.borrow_mut();
            debug!("Mounted view: {}", root.name());
            root.on_mount();
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.root.borrow_mut().render(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal view: backs out to `previous` on any key, counts mounts.
    struct Probe {
        previous: Option<ViewRef>,
        mounts: usize,
    }

    impl View for Probe {
        fn name(&self) -> &'static str {
            "probe"
        }
        fn render(&mut self, _frame: &mut Frame) {}
        fn handle_event(&mut self, _event: &TuiEvent, host: &mut Host) {
            if let Some(ref prev) = self.previous {
                host.mount(Rc::clone(prev));
            }
        }
        fn on_mount(&mut self) {
            self.mounts += 1;
        }
    }

    fn probe(previous: Option<ViewRef>) -> Rc<RefCell<Probe>> {
        Rc::new(RefCell::new(Probe { previous, mounts: 0 }))
    }

    #[test]
    fn test_chained_back_navigation() {
        let first = probe(None);
        let second = probe(Some(first.clone()));
        let third = probe(Some(second.clone()));

        let mut host = Host::new(third.clone());
        host.settle();

        host.dispatch(&TuiEvent::Resize);
        let second_ref: ViewRef = second.clone();
        assert!(host.is_mounted(&second_ref));

        host.dispatch(&TuiEvent::Resize);
        let first_ref: ViewRef = first.clone();
        assert!(host.is_mounted(&first_ref));
        assert_eq!(first.borrow().mounts, 1);
        assert_eq!(second.borrow().mounts, 1);
        assert_eq!(third.borrow().mounts, 1);
    }

    #[test]
    fn test_stop() {
        let mut host = Host::new(probe(None));
        assert!(host.is_running());
        host.stop();
        assert!(!host.is_running());
    }
}
