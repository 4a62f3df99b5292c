//! Fixed-depth, most-recent-first command history.

use crate::lexer::truncate_to_capacity;
use std::collections::VecDeque;
use std::collections::vec_deque;
use std::fmt;
use std::iter::Enumerate;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("No such command in history.")]
    NoSuchEntry(usize),
}

/// Past command lines, index 0 being the most recent.
///
/// Holds at most `capacity` entries; each entry is at most `entry_capacity`
/// bytes long.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
    entry_capacity: usize,
}

impl History {
    pub fn new(capacity: usize, entry_capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            entry_capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remember a command that has been run.
    ///
    /// Empty commands and the history commands themselves are ignored.
    pub fn record<S: AsRef<str>>(&mut self, args: &[S]) {
        match args.first().map(|arg| arg.as_ref()) {
            None | Some("history") | Some("exit") => return,
            Some(_) => {}
        }
        if self.capacity == 0 {
            return;
        }

        let mut line = String::new();
        for arg in args {
            line.push_str(arg.as_ref());
            line.push(' ');
        }
        if line.ends_with(' ') {
            line.pop();
        }
        let line = truncate_to_capacity(&line, self.entry_capacity).to_owned();

        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(line);
    }

    pub fn list(&self) -> Listing<'_> {
        if self.entries.is_empty() {
            Listing::Empty
        } else {
            Listing::Entries(Entries {
                inner: self.entries.iter().enumerate(),
            })
        }
    }

    /// Text of the entry at `index`, to be run again by the caller.
    pub fn replay(&self, index: usize) -> Result<&str, HistoryError> {
        self.entries
            .get(index)
            .map(String::as_str)
            .ok_or(HistoryError::NoSuchEntry(index))
    }
}

/// Contents of the history store as seen by `history`.
#[derive(Debug, Clone)]
pub enum Listing<'a> {
    Empty,
    Entries(Entries<'a>),
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listing::Empty => writeln!(f, "No commands in history."),
            Listing::Entries(entries) => {
                for (index, line) in entries.clone() {
                    writeln!(f, "{} {}", index, line)?;
                }
                Ok(())
            }
        }
    }
}

/// `(index, text)` pairs, most recent first. Clone it to start over.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    inner: Enumerate<vec_deque::Iter<'a, String>>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(i, s)| (i, s.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}
