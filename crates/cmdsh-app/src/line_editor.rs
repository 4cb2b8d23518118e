//! Raw-mode line editor on top of crossterm.

use std::io::{self, Stdout, Write, stdout};

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{self, Clear, ClearType};

use cmdsh_terminal::{BufferEditor, LineEditor, TabSession};
use cmdsh_types::error::Result;

/// Restores cooked mode however `read_line` exits.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

enum Edit {
    Continue,
    Submit,
    Eof,
}

/// Single-line editor with cursor movement and Tab completion.
pub struct RawEditor {
    prompt: String,
    buf: String,
    /// Byte offset into `buf`, always on a char boundary.
    cursor: usize,
    out: Stdout,
    /// First write error hit inside a `BufferEditor` callback.
    failed: Option<io::Error>,
}

impl RawEditor {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            buf: String::new(),
            cursor: 0,
            out: stdout(),
            failed: None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent, tab: &mut TabSession<'_>) -> io::Result<Edit> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => {
                write!(self.out, "\r\n")?;
                self.out.flush()?;
                return Ok(Edit::Submit);
            },
            KeyCode::Char('d') if ctrl && self.buf.is_empty() => {
                write!(self.out, "\r\n")?;
                self.out.flush()?;
                return Ok(Edit::Eof);
            },
            KeyCode::Char('d') if ctrl => self.delete_forward()?,
            KeyCode::Char('c') if ctrl => {
                write!(self.out, "^C\r\n")?;
                self.buf.clear();
                self.cursor = 0;
                self.redraw_line()?;
            },
            KeyCode::Tab => {
                let line = self.buf.clone();
                tab.on_tab(&line, self.cursor, self);
            },
            KeyCode::Char(ch) if !ctrl => self.insert_char(ch),
            KeyCode::Backspace => match self.buf[..self.cursor].chars().next_back() {
                Some(prev) => {
                    self.cursor -= prev.len_utf8();
                    self.buf.remove(self.cursor);
                    self.redraw_line()?;
                },
                None => self.beep(),
            },
            KeyCode::Delete => self.delete_forward()?,
            KeyCode::Left => match self.buf[..self.cursor].chars().next_back() {
                Some(prev) => {
                    self.cursor -= prev.len_utf8();
                    self.place_cursor()?;
                },
                None => self.beep(),
            },
            KeyCode::Right => match self.buf[self.cursor..].chars().next() {
                Some(next) => {
                    self.cursor += next.len_utf8();
                    self.place_cursor()?;
                },
                None => self.beep(),
            },
            KeyCode::Home => {
                self.cursor = 0;
                self.place_cursor()?;
            },
            KeyCode::End => {
                self.cursor = self.buf.len();
                self.place_cursor()?;
            },
            _ => {},
        }
        if let Some(e) = self.failed.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(Edit::Continue)
    }

    fn delete_forward(&mut self) -> io::Result<()> {
        if self.cursor < self.buf.len() {
            self.buf.remove(self.cursor);
            self.redraw_line()
        } else {
            self.beep();
            Ok(())
        }
    }

    fn redraw_line(&mut self) -> io::Result<()> {
        queue!(self.out, MoveToColumn(0), Clear(ClearType::UntilNewLine))?;
        write!(self.out, "{}{}", self.prompt, self.buf)?;
        self.place_cursor()
    }

    fn place_cursor(&mut self) -> io::Result<()> {
        let col = cursor_column(&self.prompt, &self.buf, self.cursor);
        queue!(self.out, MoveToColumn(col))
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.failed.get_or_insert(e);
        }
    }
}

/// Screen column of byte offset `cursor` in `buf`, counting one column per char.
fn cursor_column(prompt: &str, buf: &str, cursor: usize) -> u16 {
    let chars = prompt.chars().count() + buf[..cursor].chars().count();
    u16::try_from(chars).unwrap_or(u16::MAX)
}

impl BufferEditor for RawEditor {
    fn insert_char(&mut self, ch: char) {
        self.buf.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        let result = self.redraw_line();
        self.record(result);
    }

    fn print_block(&mut self, text: &str) {
        let result = write!(self.out, "\r\n{}\r\n", text.replace('\n', "\r\n"));
        self.record(result);
    }

    fn redraw(&mut self) {
        let result = self.redraw_line();
        self.record(result);
    }

    fn beep(&mut self) {
        let result = write!(self.out, "\x07");
        self.record(result);
    }
}

impl LineEditor for RawEditor {
    fn read_line(&mut self, tab: &mut TabSession<'_>) -> Result<Option<String>> {
        let _raw = RawModeGuard::enable()?;
        self.buf.clear();
        self.cursor = 0;
        self.failed = None;
        write!(self.out, "{}", self.prompt)?;
        self.out.flush()?;

        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match self.handle_key(key, tab)? {
                Edit::Continue => {},
                Edit::Submit => return Ok(Some(std::mem::take(&mut self.buf))),
                Edit::Eof => return Ok(None),
            }
        }
    }
}
