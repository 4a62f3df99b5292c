//! A small interactive command interpreter.
//!
//! Each line is split into words, stripped of `<`, `>`, `>>` and `2>`
//! redirections, and run either as one of the built-ins (`history`,
//! `history -i N`, `exit`) or as an external program found through `PATH`.
//! A trailing `&` runs the program in the background. Commands that ran in
//! the foreground are remembered in a fixed-depth history and can be run
//! again by index.
//!
//! The main entry point is [`Interpreter`]. Process handling relies on Unix
//! file descriptor and signal semantics, so the crate targets Unix only.

mod builtin;
pub mod command;
pub mod config;
pub mod errors;
pub mod external;
pub mod history;
pub mod input;
mod interpreter;
pub mod io_adapters;
pub mod jobs;
pub mod lexer;
pub mod redirection;

pub use config::ShellConfig;
pub use interpreter::Interpreter;
