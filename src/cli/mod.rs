pub mod commands;
mod completion;
pub mod context;
pub mod help;
pub mod io;
pub mod output;
pub mod registry;
mod shell;
pub mod table;

pub use context::{CliMode, ShellContext};
pub use shell::run_cli;

#[cfg(test)]
mod tests;
