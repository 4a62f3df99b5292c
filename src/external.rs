use crate::command::{CommandFactory, Context, ExecutableCommand, ExitCode, Flow};
use crate::errors::{ShellError, ShellResult};
use crate::interpreter::Factory;
use crate::lexer::TokenizedLine;
use crate::redirection::{self, Redirections};
use log::debug;
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Directories searched when `PATH` is not set.
pub const DEFAULT_SEARCH_PATH: &str = "/bin:/usr/bin";

/// Command that is not a builtin.
#[derive(Debug)]
pub struct ExternalCommand {
    /// Resolved location of the program, `None` if it was not found.
    program: Option<PathBuf>,
    /// Command name and arguments as typed, without redirections.
    argv: Vec<String>,
    redirections: Redirections,
    background: bool,
}

impl ExternalCommand {
    /// Strip redirections from `line` and look the program up in `search_paths`.
    ///
    /// An unknown program is not an error yet: it is reported when the
    /// command runs, after a foreground run has been recorded.
    pub fn from_line(line: &TokenizedLine, search_paths: &OsStr) -> ShellResult<Self> {
        let (argv, redirections) = redirection::resolve(line.args.clone())?;
        let Some(name) = argv.first() else {
            return Err(ShellError::Usage("missing command before redirection".into()));
        };
        let program = find_command_path(search_paths, Path::new(name)).map(Cow::into_owned);
        Ok(Self {
            program,
            argv,
            redirections,
            background: line.background,
        })
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        line: &TokenizedLine,
    ) -> Option<ShellResult<Box<dyn ExecutableCommand>>> {
        let search_paths = search_paths(std::env::var_os("PATH"));
        Some(
            ExternalCommand::from_line(line, &search_paths)
                .map(|cmd| Box::new(cmd) as Box<dyn ExecutableCommand>),
        )
    }
}

/// The value of `PATH`, or [`DEFAULT_SEARCH_PATH`] when it is unset.
fn search_paths(path: Option<OsString>) -> OsString {
    path.unwrap_or_else(|| OsString::from(DEFAULT_SEARCH_PATH))
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> ShellResult<Flow> {
        let Some(program) = &self.program else {
            if !self.background {
                ctx.history.record(&self.argv);
            }
            return Err(ShellError::CommandNotFound(self.argv[0].clone()));
        };
        let mut cmd = std::process::Command::new(program);
        cmd.arg0(&self.argv[0]).args(&self.argv[1..]);
        self.redirections.apply(&mut cmd)?;

        // Anything the interpreter printed must come before the child's output.
        ctx.stdout.flush()?;
        let mut child = cmd.spawn().map_err(|source| ShellError::Spawn {
            name: self.argv[0].clone(),
            source,
        })?;
        let pid = child.id();
        debug!("spawned {:?} as {}", self.argv, pid);

        if self.background {
            writeln!(ctx.stdout, "Process running in background with PID: {}", pid)?;
            ctx.stdout.flush()?;
            ctx.jobs.track(child);
            return Ok(Flow::Continue);
        }

        let status = child
            .wait()
            .map_err(|source| ShellError::Wait { pid, source })?;
        debug!("process {} exited with {}", pid, exit_code(status));
        ctx.history.record(&self.argv);
        Ok(Flow::Continue)
    }
}

/// Shell-style exit code: the process's own code, or 128 + signal number.
pub fn exit_code(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    match exit_status.code() {
        Some(x) => x,
        None => {
            if let Some(signal) = exit_status.signal() {
                128 + signal
            } else if exit_status.core_dumped() {
                255
            } else {
                -1
            }
        }
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo`: returns it if it exists.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first existing match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with("./") && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    match (components.next(), components.next()) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| path.is_file())
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
