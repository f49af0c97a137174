//! # Core
//!
//! Everything that does not know about the terminal.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • config (settings)    │
//!                    │  • env (variables)      │
//!                    │  • discovery (files)    │
//!                    │  • fuzzy (ranking)      │
//!                    │  • context (engine+env) │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │   Engine   │
//!     │  Adapter   │                          │  (.http +  │
//!     │ (ratatui)  │                          │  reqwest)  │
//!     └────────────┘                          └────────────┘
//! ```

pub mod config;
pub mod context;
pub mod discovery;
pub mod env;
pub mod fuzzy;
