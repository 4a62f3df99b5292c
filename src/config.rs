/// Default number of remembered commands.
pub const HISTORY_COUNT: usize = 10;

/// Default capacity of one input line, in bytes.
pub const MAX_LINE: usize = 80;

pub const DEFAULT_PROMPT: &str = "myshell: ";

/// Tunables of an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Text printed before every line is read.
    pub prompt: String,
    /// Maximum number of history entries kept.
    pub history_size: usize,
    /// Input lines longer than this many bytes are cut.
    pub max_line: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            history_size: HISTORY_COUNT,
            max_line: MAX_LINE,
        }
    }
}

impl ShellConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.history_size >= 1,
            "history size must be at least 1, got {}",
            self.history_size
        );
        anyhow::ensure!(
            self.max_line >= 2,
            "line capacity must be at least 2, got {}",
            self.max_line
        );
        Ok(())
    }
}
