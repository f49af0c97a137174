//! # TUI Components
//!
//! Building blocks shared by the views.
//!
//! - `FuzzyFilterList`: stateful, event-driven. Owns its items and query and
//!   emits `FilterEvent`s.
//! - `CommandBar`: stateless. Renders a command table it is handed as props;
//!   the module also holds the dispatch rule for those tables.
//!
//! ```text
//! components/
//! ├── mod.rs          (this file)
//! ├── command_bar.rs  (command tables, dispatch, bottom bar)
//! └── filter_list.rs  (fuzzy-filtered selection list)
//! ```

pub mod command_bar;
pub mod filter_list;

pub use command_bar::{Command, CommandBar};
pub use filter_list::{FilterEvent, FuzzyFilterList, Labeled};
