use crate::command::{CommandFactory, Context, ExecutableCommand, Flow};
use crate::config::ShellConfig;
use crate::errors::{ShellError, ShellResult};
use crate::history::History;
use crate::input::LineReader;
use crate::jobs::Jobs;
use crate::lexer::{self, Source, TokenizedLine};
use anyhow::Context as _;
use log::debug;
use std::io::Write;

/// Zero-sized [`CommandFactory`] for a command type defined in this crate.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal interactive interpreter: built-ins `history` and `exit`, every
/// other name is an external program.
///
/// Example
/// ```no_run
/// use myshell::{Interpreter, ShellConfig};
/// use myshell::input::BufferedInput;
///
/// let mut sh = Interpreter::new(ShellConfig::default());
/// let mut input = BufferedInput::new(std::io::stdin().lock(), true);
/// sh.repl(&mut input).unwrap();
/// ```
pub struct Interpreter {
    config: ShellConfig,
    history: History,
    jobs: Jobs,
    commands: Vec<Box<dyn CommandFactory>>,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter writing to the process's own standard streams.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_output(
            config,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Create an interpreter whose own output goes to the given writers.
    ///
    /// Children still inherit the process's real standard streams.
    pub fn with_output(
        config: ShellConfig,
        stdout: Box<dyn Write>,
        stderr: Box<dyn Write>,
    ) -> Self {
        use crate::builtin::{Exit, History as HistoryBuiltin};
        use crate::external::ExternalCommand;

        let history = History::new(config.history_size, config.max_line);
        Self {
            config,
            history,
            jobs: Jobs::default(),
            commands: vec![
                Box::new(Factory::<HistoryBuiltin>::default()),
                Box::new(Factory::<Exit>::default()),
                Box::new(Factory::<ExternalCommand>::default()),
            ],
            stdout,
            stderr,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn jobs(&self) -> &Jobs {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut Jobs {
        &mut self.jobs
    }

    /// Read and run lines until end of input or `exit`.
    pub fn repl(&mut self, input: &mut dyn LineReader) -> anyhow::Result<()> {
        loop {
            self.report_finished_jobs()?;
            self.stdout.flush()?;
            let Some(line) = input.read_line(&self.config.prompt)? else {
                debug!("end of input");
                break;
            };
            if self.run_line(&line)? == Flow::Exit {
                break;
            }
        }
        self.stdout.flush()?;
        Ok(())
    }

    /// Run one line as typed by the user.
    ///
    /// Command failures are reported on the error stream and yield
    /// [`Flow::Continue`]; only failing to write our own output is an error.
    pub fn run_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        match self.dispatch(line, Source::Live) {
            Ok(flow) => Ok(flow),
            Err(ShellError::Io(e)) => Err(e).context("failed to write to standard output"),
            Err(e) => {
                debug!("command failed: {:?}", e);
                writeln!(self.stderr, "Error: {}", e)?;
                self.stderr.flush()?;
                Ok(Flow::Continue)
            }
        }
    }

    fn dispatch(&mut self, line: &str, source: Source) -> ShellResult<Flow> {
        let parsed = lexer::tokenize(line, source, self.config.max_line);
        debug!("{:?} line parsed as {:?}", source, parsed);
        if parsed.is_empty() {
            return Ok(Flow::Continue);
        }

        let command = self.create(&parsed)?;
        let mut ctx = Context {
            history: &mut self.history,
            jobs: &mut self.jobs,
            stdout: &mut *self.stdout,
        };
        match command.execute(&mut ctx)? {
            Flow::Replay(text) => self.dispatch(&text, Source::Replay),
            flow => Ok(flow),
        }
    }

    fn create(&self, line: &TokenizedLine) -> ShellResult<Box<dyn ExecutableCommand>> {
        self.commands
            .iter()
            .find_map(|factory| factory.try_create(line))
            .unwrap_or_else(|| Err(ShellError::CommandNotFound(line.args[0].clone())))
    }

    fn report_finished_jobs(&mut self) -> anyhow::Result<()> {
        for reaped in self.jobs.reap() {
            match reaped {
                Ok(job) => {
                    debug!("background process {} finished with {}", job.pid, job.code);
                    writeln!(self.stdout, "[{}] Done ({})", job.pid, job.code)?;
                }
                Err(e) => {
                    writeln!(self.stderr, "Error: {}", e)?;
                    self.stderr.flush()?;
                }
            }
        }
        Ok(())
    }
}
