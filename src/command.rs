use crate::errors::ShellResult;
use crate::history::History;
use crate::jobs::Jobs;
use crate::lexer::TokenizedLine;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// What the interpreter should do once a command has been executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next line.
    Continue,
    /// Run this text as if it had just been typed.
    Replay(String),
    /// Leave the read-eval loop.
    Exit,
}

/// Interpreter state a command may touch while it runs.
pub struct Context<'a> {
    pub history: &'a mut History,
    pub jobs: &'a mut Jobs,
    /// The interpreter's own standard output.
    pub stdout: &'a mut dyn Write,
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> ShellResult<Flow>;
}

/// Factory that tries to create a command from a tokenized line.
///
/// Returns `None` when the factory doesn't recognize the command name, and
/// `Some(Err(..))` when it does but the line is unusable.
pub trait CommandFactory {
    fn try_create(
        &self,
        line: &TokenizedLine,
    ) -> Option<ShellResult<Box<dyn ExecutableCommand>>>;
}
