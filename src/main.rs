use anyhow::Context;
use argh::FromArgs;
use myshell::config::{DEFAULT_PROMPT, HISTORY_COUNT, MAX_LINE};
use myshell::input::BufferedInput;
use myshell::{Interpreter, ShellConfig};
use rustyline::DefaultEditor;
use std::io::IsTerminal;

#[derive(FromArgs)]
/// Interactive command interpreter with I/O redirection, background jobs and
/// replayable history.
struct Args {
    #[argh(option, default = "String::from(DEFAULT_PROMPT)")]
    /// text printed before each command line
    prompt: String,

    #[argh(option, default = "HISTORY_COUNT")]
    /// number of commands kept by `history`
    history_size: usize,

    #[argh(option, default = "MAX_LINE")]
    /// longest accepted command line, in bytes
    max_line: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();

    let config = ShellConfig {
        prompt: args.prompt,
        history_size: args.history_size,
        max_line: args.max_line,
    };
    config.validate()?;

    let mut shell = Interpreter::new(config);
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
        shell.repl(&mut editor)
    } else {
        shell.repl(&mut BufferedInput::new(stdin.lock(), true))
    }
}
