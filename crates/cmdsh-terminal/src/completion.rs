//! Tab completion over command names and directory entries.
//!
//! Completion is split in two. [`CompletionEngine::plan`] is a pure decision
//! table from (text before the cursor, Tab press count, registry, directory
//! listing) to a [`TabAction`]; [`CompletionEngine::on_tab`] counts the
//! press, plans, and plays the action back through a [`BufferEditor`].
//!
//! | cursor             | presses | matches         | action                          |
//! |--------------------|---------|-----------------|---------------------------------|
//! | blank line         | any     | -               | list every command              |
//! | in first word      | any     | 0 commands      | beep                            |
//! | in first word      | any     | 1 command       | insert rest of name + space     |
//! | in first word      | any     | 2+ commands     | list candidates                 |
//! | past first word    | any     | no command      | beep                            |
//! | past first word    | 1       | command         | print its usage                 |
//! | past first word    | 2+      | 0 files         | beep                            |
//! | past first word    | 2+      | 1 file          | insert rest of name + space     |
//! | past first word    | 2+      | 2+ files        | insert common part, else list   |

use std::path::PathBuf;

use cmdsh_types::config::ShellConfig;
use cmdsh_vfs::DirLister;

use crate::registry::CommandRegistry;

/// Side effects the engine asks of the line editor.
pub trait BufferEditor {
    /// Insert `ch` at the cursor and advance the cursor.
    fn insert_char(&mut self, ch: char);

    /// Print `text` on the lines below the input line.
    fn print_block(&mut self, text: &str);

    /// Reprint the prompt and the buffer, cursor at its old position.
    fn redraw(&mut self);

    /// Audible bell; the buffer is left alone.
    fn beep(&mut self);
}

/// What one Tab press should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabAction {
    Beep,
    /// Insert this text at the cursor.
    Insert(String),
    /// Print the entries in columns, then redraw the line.
    List {
        entries: Vec<String>,
        column_width: usize,
    },
    /// Print the usage of the command with this mandatory prefix.
    Usage(String),
}

/// Column widths for Tab listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub command_width: usize,
    pub file_width: usize,
    pub per_row: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::from(&ShellConfig::default())
    }
}

impl From<&ShellConfig> for ColumnLayout {
    fn from(config: &ShellConfig) -> Self {
        Self {
            command_width: config.command_column_width,
            file_width: config.file_column_width,
            per_row: config.columns_per_row.max(1),
        }
    }
}

/// Completion state for the line being edited.
pub struct CompletionEngine {
    tab_presses: usize,
    lister: Box<dyn DirLister>,
    dir: PathBuf,
    layout: ColumnLayout,
}

impl CompletionEngine {
    /// Complete filenames from `dir` using `lister`.
    pub fn new(lister: Box<dyn DirLister>, dir: impl Into<PathBuf>) -> Self {
        Self {
            tab_presses: 0,
            lister,
            dir: dir.into(),
            layout: ColumnLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> ColumnLayout {
        self.layout
    }

    /// Tab presses since the current line began.
    pub fn tab_presses(&self) -> usize {
        self.tab_presses
    }

    /// Forget the press count; called when a line is submitted.
    pub fn reset(&mut self) {
        self.tab_presses = 0;
    }

    /// Handle a Tab press with the cursor at byte `cursor` of `line`.
    pub fn on_tab(
        &mut self,
        registry: &CommandRegistry,
        line: &str,
        cursor: usize,
        editor: &mut dyn BufferEditor,
    ) {
        self.tab_presses += 1;
        let action = match line.get(..cursor) {
            Some(before) => self.plan(registry, before),
            None => {
                log::debug!("tab with cursor {cursor} outside line of {} bytes", line.len());
                TabAction::Beep
            },
        };
        log::trace!("tab #{} on {line:?}: {action:?}", self.tab_presses);
        self.apply(registry, action, editor);
    }

    /// Decide what a Tab press does given the text before the cursor.
    pub fn plan(&self, registry: &CommandRegistry, before: &str) -> TabAction {
        let Some(first) = before.split_whitespace().next() else {
            return TabAction::List {
                entries: registry.full_names(),
                column_width: self.layout.command_width,
            };
        };
        let leading = before.len() - before.trim_start().len();
        let word = before.rsplit(char::is_whitespace).next().unwrap_or_default();

        if before.len() > leading + first.len() {
            // Past the first word: it must name a command.
            let Some(spec) = registry.resolve(first) else {
                return TabAction::Beep;
            };
            if self.tab_presses <= 1 {
                return TabAction::Usage(spec.mandatory().to_string());
            }
            return self.plan_files(word);
        }

        let mut candidates: Vec<String> = registry
            .iter()
            .filter(|spec| spec.completes(word))
            .map(|spec| spec.full_name())
            .collect();
        match candidates.len() {
            0 => TabAction::Beep,
            1 => {
                let full = candidates.remove(0);
                let mut rest: String = full.chars().skip(word.chars().count()).collect();
                rest.push(' ');
                TabAction::Insert(rest)
            },
            _ => TabAction::List {
                entries: candidates,
                column_width: self.layout.command_width,
            },
        }
    }

    fn plan_files(&self, prefix: &str) -> TabAction {
        let entries = match self.lister.list_entries(prefix, &self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("listing {} failed: {e}", self.dir.display());
                return TabAction::Beep;
            },
        };
        match entries.len() {
            0 => TabAction::Beep,
            1 => {
                let only = &entries[0];
                TabAction::Insert(format!("{} ", only.strip_prefix(prefix).unwrap_or(only)))
            },
            _ => match common_prefix(&entries).strip_prefix(prefix) {
                Some(extension) if !extension.is_empty() => {
                    TabAction::Insert(extension.to_string())
                },
                _ => TabAction::List {
                    entries,
                    column_width: self.layout.file_width,
                },
            },
        }
    }

    fn apply(&self, registry: &CommandRegistry, action: TabAction, editor: &mut dyn BufferEditor) {
        match action {
            TabAction::Beep => editor.beep(),
            TabAction::Insert(text) => text.chars().for_each(|ch| editor.insert_char(ch)),
            TabAction::List {
                entries,
                column_width,
            } => {
                editor.print_block(&format_columns(&entries, column_width, self.layout.per_row));
                editor.redraw();
            },
            TabAction::Usage(key) => {
                let mut usage = Vec::new();
                if let Some(spec) = registry.get(&key)
                    && spec.handler().usage(&mut usage).is_ok()
                {
                    editor.print_block(String::from_utf8_lossy(&usage).trim_end());
                }
                editor.redraw();
            },
        }
    }
}

/// Completion entry point handed to a [`LineEditor`](crate::LineEditor)
/// for the duration of one `read_line`.
pub struct TabSession<'a> {
    registry: &'a CommandRegistry,
    engine: &'a mut CompletionEngine,
}

impl<'a> TabSession<'a> {
    pub fn new(registry: &'a CommandRegistry, engine: &'a mut CompletionEngine) -> Self {
        Self { registry, engine }
    }

    /// Handle a Tab press with the cursor at byte `cursor` of `line`.
    pub fn on_tab(&mut self, line: &str, cursor: usize, editor: &mut dyn BufferEditor) {
        self.engine.on_tab(self.registry, line, cursor, editor);
    }

    pub fn tab_presses(&self) -> usize {
        self.engine.tab_presses()
    }
}

/// Longest prefix shared by every name, never longer than the shortest one.
pub fn common_prefix(names: &[String]) -> &str {
    let Some((first, rest)) = names.split_first() else {
        return "";
    };
    let mut end = first.len();
    for name in rest {
        end = first
            .char_indices()
            .zip(name.chars())
            .take_while(|((i, a), b)| *i < end && a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8());
        if end == 0 {
            break;
        }
    }
    &first[..end]
}

/// Lay out `entries` left-aligned in `width`-wide columns, `per_row` per line.
pub fn format_columns(entries: &[String], width: usize, per_row: usize) -> String {
    entries
        .chunks(per_row.max(1))
        .map(|row| {
            row.iter()
                .map(|e| format!("{e:<width$}"))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
