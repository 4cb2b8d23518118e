//! Append-only record of executed command lines.

use std::io::{self, Write};

/// Every non-blank line the shell has read, oldest first.
#[derive(Debug, Default, Clone)]
pub struct History {
    lines: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// The most recently recorded line.
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Print the last `count` lines with their indices (all when `None` or
    /// when `count` exceeds the history size).
    pub fn print(&self, count: Option<usize>, out: &mut dyn Write) -> io::Result<()> {
        if self.lines.is_empty() {
            return writeln!(out, "Empty command history!!");
        }
        let total = self.lines.len();
        let count = count.map_or(total, |n| n.min(total));
        for (i, line) in self.lines.iter().enumerate().skip(total - count) {
            writeln!(out, "   {i}: {line}")?;
        }
        Ok(())
    }
}
