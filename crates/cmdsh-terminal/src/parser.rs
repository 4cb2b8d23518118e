//! Line dispatcher: reads a line, records it, resolves and runs its command.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cmdsh_types::config::ShellConfig;
use cmdsh_types::error::{CmdshError, Result};
use cmdsh_vfs::{DirLister, StdDirLister};

use crate::completion::{BufferEditor, ColumnLayout, CompletionEngine, TabSession};
use crate::dofile::DofileStack;
use crate::history::History;
use crate::options::report_error;
use crate::registry::{CmdExecStatus, Command, CommandRegistry, Environment};
use crate::source::LineEditor;

/// The shell's dispatch core.
///
/// Owns the registry, the dofile stack, the history and the completion
/// state. Input comes from the active dofile or, when none is open, from
/// the interactive [`LineEditor`].
pub struct CmdParser {
    registry: CommandRegistry,
    dofiles: DofileStack,
    history: History,
    completion: CompletionEngine,
    editor: Box<dyn LineEditor>,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    prompt: String,
    exhausted: bool,
}

impl CmdParser {
    /// Build a parser reading interactive input from `editor`, writing to
    /// stdout/stderr and completing filenames from the current directory.
    pub fn new(editor: Box<dyn LineEditor>, config: &ShellConfig) -> Self {
        Self {
            registry: CommandRegistry::new(),
            dofiles: DofileStack::new(config.max_dofile_depth),
            history: History::new(),
            completion: CompletionEngine::new(Box::new(StdDirLister), ".")
                .with_layout(ColumnLayout::from(config)),
            editor,
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            prompt: config.prompt.clone(),
            exhausted: false,
        }
    }

    /// Redirect regular output and diagnostics.
    pub fn with_output(mut self, out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        self.out = out;
        self.err = err;
        self
    }

    /// Complete filenames from `dir` through `lister`.
    pub fn with_lister(mut self, lister: Box<dyn DirLister>, dir: impl Into<PathBuf>) -> Self {
        let layout = self.completion.layout();
        self.completion = CompletionEngine::new(lister, dir).with_layout(layout);
        self
    }

    /// Register a command. See [`CommandRegistry::register`].
    pub fn register(&mut self, name: &str, min_match: usize, handler: Box<dyn Command>) -> Result<()> {
        self.registry.register(name, min_match, handler)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn dofiles(&self) -> &DofileStack {
        &self.dofiles
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Whether the interactive source has reached end of input.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Open a nested script; subsequent lines come from it until it ends.
    pub fn open_dofile(&mut self, path: &Path) -> Result<()> {
        self.dofiles.open(path)
    }

    /// Close the active script.
    ///
    /// # Panics
    ///
    /// Panics if no script is active.
    pub fn close_dofile(&mut self) {
        self.dofiles.close();
    }

    /// Read one line from the active source and execute it.
    pub fn execute_one(&mut self) -> CmdExecStatus {
        let status = match self.read_cmd() {
            Ok(Some(line)) => self.execute_line(&line),
            Ok(None) => CmdExecStatus::Nop,
            Err(e) => report_error(&e, &mut *self.err),
        };
        if let Err(e) = self.out.flush() {
            log::warn!("flushing output failed: {e}");
        }
        status
    }

    /// Record and execute `raw` as if it had been read from input.
    ///
    /// Blank lines are ignored. An unknown command is reported as
    /// `Illegal command!! (<token>)` and yields [`CmdExecStatus::Error`].
    pub fn execute_line(&mut self, raw: &str) -> CmdExecStatus {
        let line = raw.trim();
        let Some(token) = line.split_whitespace().next() else {
            return CmdExecStatus::Nop;
        };
        self.history.push(line);

        let Some((spec, matched)) = self.registry.resolve_with_len(token) else {
            log::debug!("no command matches {token:?}");
            // Nowhere left to report a failing error sink.
            let _ = writeln!(self.err, "{}", CmdshError::UnknownCommand(token.to_string()));
            return CmdExecStatus::Error;
        };
        // Only the matched characters belong to the command word.
        let option = line[matched..].trim_start();
        log::debug!("dispatch {} with option {option:?}", spec.full_name());

        let mut env = Environment {
            registry: &self.registry,
            dofiles: &mut self.dofiles,
            history: &self.history,
            out: &mut *self.out,
            err: &mut *self.err,
        };
        match spec.handler().exec(option, &mut env) {
            Ok(status) => status,
            Err(e) => report_error(&e, &mut *self.err),
        }
    }

    /// Print every command's help line.
    pub fn print_helps(&mut self) -> Result<()> {
        self.registry.print_helps(&mut *self.out)?;
        Ok(())
    }

    /// Print the last `count` history entries (all when `None`).
    pub fn print_history(&mut self, count: Option<usize>) -> Result<()> {
        self.history.print(count, &mut *self.out)?;
        Ok(())
    }

    /// Feed a Tab press on `line` (cursor at byte `cursor`) to the completion engine.
    pub fn on_tab(&mut self, line: &str, cursor: usize, editor: &mut dyn BufferEditor) {
        self.completion.on_tab(&self.registry, line, cursor, editor);
    }

    fn read_cmd(&mut self) -> Result<Option<String>> {
        if let Some(source) = self.dofiles.active_mut() {
            return match source.read_line() {
                Ok(Some(line)) => {
                    // Echo script lines so a transcript reads like a session.
                    if !line.trim().is_empty() {
                        writeln!(self.out, "{}{line}", self.prompt)?;
                    }
                    Ok(Some(line))
                },
                Ok(None) => {
                    self.dofiles.close();
                    Ok(None)
                },
                Err(e) => {
                    log::warn!("reading {} failed, closing it", source.name());
                    self.dofiles.close();
                    Err(e)
                },
            };
        }

        let mut tab = TabSession::new(&self.registry, &mut self.completion);
        let line = self.editor.read_line(&mut tab);
        self.completion.reset();
        let line = line.inspect_err(|e| {
            log::warn!("interactive input failed, stopping: {e}");
            self.exhausted = true;
        })?;
        if line.is_none() {
            log::debug!("interactive input exhausted");
            self.exhausted = true;
        }
        Ok(line)
    }
}
