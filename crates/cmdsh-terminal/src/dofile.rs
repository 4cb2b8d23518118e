//! Nested script (dofile) stack.
//!
//! The shell reads from the active dofile when there is one and from the
//! interactive editor otherwise. Opening a dofile saves the current source
//! (possibly "interactive", i.e. none) and makes the new script active;
//! closing drops the active script and restores the saved one. Each source
//! is owned by the stack, so it is released exactly once when popped.

use std::path::Path;

use cmdsh_types::config::DEFAULT_MAX_DOFILE_DEPTH;
use cmdsh_types::error::{CmdshError, Result};

use crate::source::{FileSource, LineSource};

/// Bounded LIFO of script sources.
pub struct DofileStack {
    active: Option<Box<dyn LineSource>>,
    saved: Vec<Option<Box<dyn LineSource>>>,
    max_depth: usize,
}

impl DofileStack {
    /// Create an empty stack allowing `max_depth` nested scripts.
    pub fn new(max_depth: usize) -> Self {
        Self {
            active: None,
            saved: Vec::new(),
            max_depth,
        }
    }

    /// Number of scripts currently open.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether input currently comes from a script.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The script being read, if any.
    pub fn active_mut(&mut self) -> Option<&mut Box<dyn LineSource>> {
        self.active.as_mut()
    }

    /// Open `path` and make it the active source.
    ///
    /// On failure nothing changes: the depth is checked before the file is
    /// touched and a file that can't be opened is never pushed.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        self.check_depth()?;
        let source = FileSource::open(path).inspect_err(|e| {
            log::warn!("dofile {}: {e}", path.display());
        })?;
        self.push(Box::new(source))
    }

    /// Make an already-open source the active one.
    pub fn push(&mut self, source: Box<dyn LineSource>) -> Result<()> {
        self.check_depth()?;
        log::debug!(
            "dofile {} opened at depth {}",
            source.name(),
            self.saved.len() + 1
        );
        self.saved.push(self.active.take());
        self.active = Some(source);
        Ok(())
    }

    /// Drop the active script and restore the one it interrupted.
    ///
    /// # Panics
    ///
    /// Panics if no script is active; callers must check
    /// [`is_active`](Self::is_active) first.
    pub fn close(&mut self) {
        let Some(closed) = self.active.take() else {
            panic!("close() called with no active dofile");
        };
        log::debug!("dofile {} closed at depth {}", closed.name(), self.saved.len());
        self.active = self.saved.pop().flatten();
    }

    fn check_depth(&self) -> Result<()> {
        if self.saved.len() >= self.max_depth {
            log::warn!("dofile stack full ({} scripts)", self.max_depth);
            return Err(CmdshError::DofileDepthExceeded(self.max_depth));
        }
        Ok(())
    }
}

impl Default for DofileStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOFILE_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StringSource;

    fn next(stack: &mut DofileStack) -> Option<String> {
        stack.active_mut()?.read_line().unwrap()
    }

    #[test]
    fn starts_interactive() {
        let stack = DofileStack::default();
        assert!(!stack.is_active());
        assert_eq!(stack.depth(), 0);
        assert_eq!(stack.max_depth(), 1024);
    }

    #[test]
    fn push_and_close_restore_previous() {
        let mut stack = DofileStack::default();
        stack.push(Box::new(StringSource::new("outer1\nouter2"))).unwrap();
        assert_eq!(next(&mut stack).as_deref(), Some("outer1"));
        stack.push(Box::new(StringSource::new("inner"))).unwrap();
        assert_eq!(stack.depth(), 2);
        assert_eq!(next(&mut stack).as_deref(), Some("inner"));
        stack.close();
        assert_eq!(stack.depth(), 1);
        assert_eq!(next(&mut stack).as_deref(), Some("outer2"));
        stack.close();
        assert!(!stack.is_active());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn depth_cap_rejects_and_keeps_state() {
        let mut stack = DofileStack::default();
        for i in 0..1024 {
            stack
                .push(Box::new(StringSource::new(&format!("line{i}"))))
                .unwrap();
        }
        assert_eq!(stack.depth(), 1024);
        let err = stack.push(Box::new(StringSource::new("overflow"))).unwrap_err();
        assert!(matches!(err, CmdshError::DofileDepthExceeded(1024)));
        assert_eq!(stack.depth(), 1024);
        // The innermost script is still the active one.
        assert_eq!(next(&mut stack).as_deref(), Some("line1023"));
        for _ in 0..1024 {
            stack.close();
        }
        assert!(!stack.is_active());
    }

    #[test]
    fn open_checks_depth_before_opening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("do1");
        std::fs::write(&path, "help\n").unwrap();
        let mut stack = DofileStack::new(1);
        stack.open(&path).unwrap();
        assert!(matches!(
            stack.open(&path),
            Err(CmdshError::DofileDepthExceeded(1))
        ));
        assert_eq!(stack.depth(), 1);
        assert_eq!(next(&mut stack).as_deref(), Some("help"));
    }

    #[test]
    fn open_missing_file_leaves_stack_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack = DofileStack::default();
        stack.push(Box::new(StringSource::new("keep"))).unwrap();
        let err = stack.open(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, CmdshError::FileOpen { .. }));
        assert_eq!(stack.depth(), 1);
        assert_eq!(next(&mut stack).as_deref(), Some("keep"));
    }

    #[test]
    fn open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("do2");
        std::fs::write(&path, "a\nb\n").unwrap();
        let mut stack = DofileStack::default();
        stack.open(&path).unwrap();
        assert_eq!(next(&mut stack).as_deref(), Some("a"));
        assert_eq!(next(&mut stack).as_deref(), Some("b"));
        assert_eq!(next(&mut stack), None);
    }

    #[test]
    #[should_panic(expected = "no active dofile")]
    fn close_without_script_panics() {
        DofileStack::default().close();
    }
}
