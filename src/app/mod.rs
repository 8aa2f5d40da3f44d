//! Console actions and the command table

mod action;
mod commands;

pub use action::Action;
pub use commands::{parse_line, COMMANDS};
