//! req library exports for testing

pub mod core;
pub mod engine;
pub mod tui;

#[cfg(test)]
pub mod test_support;
