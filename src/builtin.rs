use crate::command::{CommandFactory, Context, ExecutableCommand, Flow};
use crate::errors::{ShellError, ShellResult};
use crate::interpreter::Factory;
use crate::lexer::TokenizedLine;
use argh::{EarlyExit, FromArgs};
use log::debug;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in the interpreter process. Redirection operators are not interpreted for them.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "history".
    fn name() -> &'static str;

    fn execute(self, ctx: &mut Context<'_>) -> ShellResult<Flow>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> ShellResult<Flow> {
        T::execute(*self, ctx)
    }
}

/// Result of `--help` or of arguments argh rejected.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> ShellResult<Flow> {
        if self.is_error {
            return Err(ShellError::Usage(self.output.trim_end().to_string()));
        }
        ctx.stdout.write_all(self.output.as_bytes())?;
        Ok(Flow::Continue)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        line: &TokenizedLine,
    ) -> Option<ShellResult<Box<dyn ExecutableCommand>>> {
        let (name, args) = line.args.split_first()?;
        if name != T::name() {
            return None;
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let cmd: Box<dyn ExecutableCommand> = match T::from_args(&[name.as_str()], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        };
        Some(Ok(cmd))
    }
}

#[derive(FromArgs)]
/// Show recently executed commands, most recent first, or run one of them again.
pub struct History {
    #[argh(option, short = 'i')]
    /// position of the command to run again; 0 is the most recent
    pub index: Option<usize>,
}

impl BuiltinCommand for History {
    fn name() -> &'static str {
        "history"
    }

    fn execute(self, ctx: &mut Context<'_>) -> ShellResult<Flow> {
        let Some(index) = self.index else {
            write!(ctx.stdout, "{}", ctx.history.list())?;
            return Ok(Flow::Continue);
        };
        let line = ctx.history.replay(index)?.to_string();
        debug!("replaying history entry {}: {:?}", index, line);
        writeln!(ctx.stdout, "Executing: {}", line)?;
        Ok(Flow::Replay(line))
    }
}

#[derive(FromArgs)]
/// Exit shell process
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _ctx: &mut Context<'_>) -> ShellResult<Flow> {
        Ok(Flow::Exit)
    }
}
