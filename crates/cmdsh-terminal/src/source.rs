//! Line sources: script files and interactive editors.
//!
//! Scripts implement [`LineSource`]. The interactive side implements
//! [`LineEditor`], which additionally receives a [`TabSession`] so a Tab
//! key can reach the completion engine while the line is being edited.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use cmdsh_types::error::{CmdshError, Result};

use crate::completion::TabSession;

/// A non-interactive source of command lines.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Label used in log messages.
    fn name(&self) -> &str {
        "<script>"
    }
}

/// An interactive line reader.
pub trait LineEditor {
    /// Read one submitted line, or `None` at end of input.
    fn read_line(&mut self, tab: &mut TabSession<'_>) -> Result<Option<String>>;
}

/// Read one line from `reader`, stripping `\n` / `\r\n`.
fn read_trimmed(reader: &mut dyn BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

/// A dofile on disk.
pub struct FileSource {
    label: String,
    reader: BufReader<File>,
}

impl FileSource {
    /// Open `path` for reading.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| CmdshError::FileOpen {
            path: PathBuf::from(path),
            source,
        })?;
        Ok(Self {
            label: path.display().to_string(),
            reader: BufReader::new(file),
        })
    }
}

impl LineSource for FileSource {
    fn read_line(&mut self) -> Result<Option<String>> {
        read_trimmed(&mut self.reader)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Lines held in memory.
#[derive(Debug, Default)]
pub struct StringSource {
    lines: VecDeque<String>,
}

impl StringSource {
    pub fn new(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }
}

impl LineSource for StringSource {
    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn name(&self) -> &str {
        "<memory>"
    }
}

/// A line editor over any buffered reader, without completion.
///
/// Used when stdin is not a terminal, and in tests.
pub struct PlainEditor<R> {
    reader: R,
}

impl<R: BufRead> PlainEditor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineEditor for PlainEditor<R> {
    fn read_line(&mut self, _tab: &mut TabSession<'_>) -> Result<Option<String>> {
        read_trimmed(&mut self.reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn string_source_yields_lines_then_eof() {
        let mut src = StringSource::new("help\nhistory\n");
        assert_eq!(src.read_line().unwrap().as_deref(), Some("help"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("history"));
        assert_eq!(src.read_line().unwrap(), None);
    }

    #[test]
    fn file_source_strips_terminators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("do1");
        std::fs::write(&path, "help\r\nq -f\nlast").unwrap();
        let mut src = FileSource::open(&path).unwrap();
        assert_eq!(src.read_line().unwrap().as_deref(), Some("help"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("q -f"));
        assert_eq!(src.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(src.read_line().unwrap(), None);
        assert!(src.name().ends_with("do1"));
    }

    #[test]
    fn file_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        match FileSource::open(&dir.path().join("nope")) {
            Err(CmdshError::FileOpen { path, .. }) => assert!(path.ends_with("nope")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn read_trimmed_blank_line_is_empty_string() {
        let mut cursor = Cursor::new("\nx\n");
        assert_eq!(read_trimmed(&mut cursor).unwrap().as_deref(), Some(""));
        assert_eq!(read_trimmed(&mut cursor).unwrap().as_deref(), Some("x"));
        assert_eq!(read_trimmed(&mut cursor).unwrap(), None);
    }
}
