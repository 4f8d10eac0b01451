//! Pieces of the interactive calculator that do not touch the terminal:
//! command parsing, help text and the session history.

use std::{collections::VecDeque, fmt};

pub const PROMPT: &str = "RPN> ";

/// Entries kept in the session history; older ones are dropped.
pub const HISTORY_CAPACITY: usize = 50;

/// Entries listed by the `history` command.
pub const HISTORY_SHOWN: usize = 10;

pub const HELP_TEXT: &str = "\
RPN calculator
Operators: +, -, *, /, //, %, **
Unary:     ~ (negate), $ (plus)
Examples:  3 4 +, 5 ~, 2 ( 3 4 + ) *
Commands:  help, history, exit";

/// One line of user input, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Empty,
    Exit,
    Help,
    History,
    Evaluate(&'a str),
}

impl<'a> Command<'a> {
    /// Trims the line and recognises the commands case-insensitively; anything else is an
    /// expression.
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Command::Empty
        } else if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            Command::Exit
        } else if line.eq_ignore_ascii_case("help") {
            Command::Help
        } else if line.eq_ignore_ascii_case("history") {
            Command::History
        } else {
            Command::Evaluate(line)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub expression: String,
    pub result: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.expression, self.result)
    }
}

/// Successful evaluations of the session, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Entry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, expression: impl Into<String>, result: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Entry {
            expression: expression.into(),
            result: result.into(),
        });
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Entry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    /// Lines printed by the `history` command: ` 1. 3 4 + = 7`.
    pub fn listing(&self, n: usize) -> Vec<String> {
        self.recent(n)
            .enumerate()
            .map(|(i, entry)| format!("{:2}. {entry}", i + 1))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
