//! Subcommand implementations.

pub mod completion;
pub mod create;
pub mod detect;
pub mod extract;
