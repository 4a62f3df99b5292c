//! Sources of command lines.

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};

/// Something the read-eval loop can pull lines from.
pub trait LineReader {
    /// Show `prompt` and read one line. `Ok(None)` means end of input.
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>>;
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C drops what was typed so far.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Plain line reader for pipes, scripts and tests.
pub struct BufferedInput<R> {
    reader: R,
    echo_prompt: bool,
}

impl<R: BufRead> BufferedInput<R> {
    /// When `echo_prompt` is set the prompt is written to standard output
    /// before each read.
    pub fn new(reader: R, echo_prompt: bool) -> Self {
        Self {
            reader,
            echo_prompt,
        }
    }
}

impl<R: BufRead> LineReader for BufferedInput<R> {
    fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        if self.echo_prompt {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prompt.as_bytes())?;
            stdout.flush()?;
        }
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}
