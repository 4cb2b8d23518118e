//! Command dispatch core.
//!
//! Commands implement the `Command` trait and are registered under a full
//! name plus a minimum match length, so any case-insensitive abbreviation
//! at least that long selects them. `CmdParser` reads lines from the active
//! dofile or the interactive editor, records them in the history and
//! dispatches them; Tab presses are routed to the completion engine.

mod commands;
pub mod completion;
mod dofile;
mod history;
pub mod options;
mod parser;
mod registry;
mod source;

/// Register the built-in commands (help, quit, history, dofile) into a registry.
pub use commands::register_builtins;
/// Editor operations the completion engine drives.
pub use completion::BufferEditor;
/// Per-line completion state.
pub use completion::CompletionEngine;
/// Completion handle passed to a line editor while it reads one line.
pub use completion::TabSession;
/// Bounded stack of nested script sources.
pub use dofile::DofileStack;
/// Append-only record of entered lines.
pub use history::History;
/// The line dispatcher.
pub use parser::CmdParser;
/// Case-insensitive abbreviation predicate.
pub use registry::abbrev_match;
/// Outcome of executing one line.
pub use registry::CmdExecStatus;
/// A single executable command trait.
pub use registry::Command;
/// Registry of commands keyed by mandatory prefix.
pub use registry::CommandRegistry;
/// A registered command and its spelling.
pub use registry::CommandSpec;
/// Shell state passed to every command.
pub use registry::Environment;
/// Script sources opened from disk.
pub use source::FileSource;
/// Interactive line input.
pub use source::LineEditor;
/// A stream of script lines.
pub use source::LineSource;
/// Line editor over any buffered reader, without completion.
pub use source::PlainEditor;
/// Script held in memory.
pub use source::StringSource;
