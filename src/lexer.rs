//! Lexical analysis of a single command line.
//!
//! Splitting is deliberately primitive: words are separated by spaces and tabs,
//! `&` marks the command for background execution, and a newline ends the
//! line. Quotes and escapes have no special meaning.

/// Where a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Typed by the user (or read from a script). Subject to the line capacity.
    Live,
    /// Text fed back from the history store by `history -i`.
    Replay,
}

/// The result of tokenizing one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedLine {
    /// Command name followed by its arguments. Empty for a blank line.
    pub args: Vec<String>,
    /// Set when the line contained `&`.
    pub background: bool,
}

impl TokenizedLine {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
}

struct LexingFSM<'a> {
    input: std::str::Chars<'a>,
    state: LexingState,
    buffer: String,
    out: TokenizedLine,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        LexingFSM {
            input: line.chars(),
            state: LexingState::Start,
            buffer: String::new(),
            out: TokenizedLine::default(),
        }
    }

    fn make_tokens(mut self) -> TokenizedLine {
        while let Some(ch) = self.input.next() {
            match ch {
                '\n' => break,
                ' ' | '\t' => self.finish_word(),
                '&' => {
                    self.finish_word();
                    self.out.background = true;
                }
                c => {
                    self.buffer.push(c);
                    self.state = LexingState::ReadingWord;
                }
            }
        }
        self.finish_word();
        self.out
    }

    fn finish_word(&mut self) {
        if self.state == LexingState::ReadingWord {
            self.out.args.push(std::mem::take(&mut self.buffer));
            self.state = LexingState::Start;
        }
    }
}

/// Cut `line` to at most `capacity` bytes without splitting a UTF-8 character.
pub fn truncate_to_capacity(line: &str, capacity: usize) -> &str {
    if line.len() <= capacity {
        return line;
    }
    let mut end = capacity;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Split a raw line into arguments and the background flag.
///
/// Live lines are first cut to `capacity` bytes, the way a fixed-size read
/// buffer would cut them. Every token is kept, including the last one.
///
/// ```
/// use myshell::lexer::{tokenize, Source};
/// let line = tokenize("sleep 5 &\n", Source::Live, 80);
/// assert_eq!(line.args, vec!["sleep", "5"]);
/// assert!(line.background);
/// ```
pub fn tokenize(line: &str, source: Source, capacity: usize) -> TokenizedLine {
    let line = match source {
        Source::Live => truncate_to_capacity(line, capacity),
        Source::Replay => line,
    };
    LexingFSM::new(line).make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(line: &str) -> TokenizedLine {
        tokenize(line, Source::Live, 80)
    }

    #[test]
    fn splits_on_spaces_and_tabs() {
        let line = live("ls -l\tfoo\n");
        assert_eq!(line.args, vec!["ls", "-l", "foo"]);
        assert!(!line.background);
    }

    #[test]
    fn keeps_last_token_without_newline() {
        assert_eq!(live("echo a b").args, vec!["echo", "a", "b"]);
    }

    #[test]
    fn ampersand_sets_background_and_is_dropped() {
        let line = live("sleep 5 &\n");
        assert_eq!(line.args, vec!["sleep", "5"]);
        assert!(line.background);

        let glued = live("sleep 5&");
        assert_eq!(glued.args, vec!["sleep", "5"]);
        assert!(glued.background);
    }

    #[test]
    fn ampersand_splits_words() {
        let line = live("a&b");
        assert_eq!(line.args, vec!["a", "b"]);
        assert!(line.background);
    }

    #[test]
    fn newline_ends_scanning() {
        assert_eq!(live("echo one\necho two").args, vec!["echo", "one"]);
    }

    #[test]
    fn blank_lines_are_empty() {
        assert!(live("").is_empty());
        assert!(live("   \t \n").is_empty());

        let only_marker = live(" &\n");
        assert!(only_marker.is_empty());
        assert!(only_marker.background);
    }

    #[test]
    fn quotes_are_not_interpreted() {
        assert_eq!(live("echo \"a b\"").args, vec!["echo", "\"a", "b\""]);
    }

    #[test]
    fn live_lines_are_truncated_to_capacity() {
        let line = tokenize("echo abcdef", Source::Live, 8);
        assert_eq!(line.args, vec!["echo", "abc"]);
    }

    #[test]
    fn replayed_lines_are_not_truncated() {
        let line = tokenize("echo abcdef", Source::Replay, 8);
        assert_eq!(line.args, vec!["echo", "abcdef"]);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_to_capacity("aé", 2), "a");
        assert_eq!(truncate_to_capacity("aé", 3), "aé");
    }
}
