use crate::history::HistoryError;
use crate::redirection::RedirectionError;
use std::io;
use thiserror::Error;

/// Everything that can stop a single command from running.
///
/// None of these end the interpreter; the loop reports them and prompts again.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("Invalid usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Redirection(#[from] RedirectionError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("{name}: failed to start: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;
