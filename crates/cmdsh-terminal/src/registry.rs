//! Command trait, registry, and abbreviation matching.
//!
//! Every command is registered with a full spelling and a minimum match
//! length. The first `min` characters form the mandatory prefix, stored
//! upper-cased as the registry key; the rest is the optional suffix, which
//! the user may type partially or not at all. Matching is ASCII
//! case-insensitive throughout.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::{self, Write};

use cmdsh_types::error::{CmdshError, Result};

use crate::dofile::DofileStack;
use crate::history::History;

/// Outcome of running one command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdExecStatus {
    /// The command ran to completion.
    Done,
    /// The command (or its options) failed; the shell keeps going.
    Error,
    /// Terminate the shell's main loop.
    Quit,
    /// Nothing was executed (blank line, end of a dofile).
    Nop,
}

/// Shell state handed to every command.
pub struct Environment<'a> {
    /// Registered commands (read-only once the shell is running).
    pub registry: &'a CommandRegistry,
    /// Nested script sources.
    pub dofiles: &'a mut DofileStack,
    /// Lines entered so far, including the one being executed.
    pub history: &'a History,
    /// Regular output.
    pub out: &'a mut dyn Write,
    /// Diagnostics.
    pub err: &'a mut dyn Write,
}

/// A single executable command.
pub trait Command {
    /// Run the command with everything after the command word.
    ///
    /// Option errors are returned rather than printed; the dispatcher
    /// reports them and turns them into [`CmdExecStatus::Error`].
    fn exec(&self, option: &str, env: &mut Environment<'_>) -> Result<CmdExecStatus>;

    /// Print the usage line (e.g. `Usage: HELp [(string cmd)]`).
    fn usage(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Print the one-line summary shown by `HELp`.
    fn help(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// A registered command: its spelling split at the minimum match length.
pub struct CommandSpec {
    mandatory: String,
    optional: String,
    handler: Box<dyn Command>,
}

impl CommandSpec {
    /// Upper-cased mandatory prefix (the registry key).
    pub fn mandatory(&self) -> &str {
        &self.mandatory
    }

    /// Optional suffix, as spelled at registration.
    pub fn optional(&self) -> &str {
        &self.optional
    }

    /// Mandatory prefix followed by the optional suffix, e.g. `HELp`.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.mandatory, self.optional)
    }

    /// The command implementation.
    pub fn handler(&self) -> &dyn Command {
        self.handler.as_ref()
    }

    /// Length in bytes of `token` consumed by this command, if it matches.
    pub fn matches(&self, token: &str) -> Option<usize> {
        abbrev_match(&self.mandatory, &self.optional, token)
    }

    /// Whether Tab on the partial word `word` should offer this command.
    ///
    /// Uses the same comparison as [`matches`](Self::matches) with the two
    /// bounds flipped: `word` may be shorter than the mandatory prefix, but
    /// must not run past the full name. So `he` completes to `HELp` without
    /// dispatching, and `helpme` dispatches to it without completing.
    pub fn completes(&self, word: &str) -> bool {
        compare_prefix(&self.mandatory, &self.optional, word)
            .is_some_and(|(_, matched)| matched == word.len())
    }

    /// Every accepted abbreviation, from the mandatory prefix up to the full name.
    fn abbreviations(&self) -> impl Iterator<Item = String> + '_ {
        let full: Vec<char> = self.mandatory.chars().chain(self.optional.chars()).collect();
        let min = self.mandatory.chars().count();
        (min..=full.len()).map(move |n| full[..n].iter().collect())
    }
}

/// The shared match rule behind dispatch and registration.
///
/// `token` matches when it is at least as long as `mandatory` and, compared
/// case-insensitively over `min(token, mandatory + optional)` characters,
/// spells a prefix of `mandatory + optional`. Characters beyond the full
/// spelling are not examined. Returns the number of bytes of `token` that
/// were compared.
pub fn abbrev_match(mandatory: &str, optional: &str, token: &str) -> Option<usize> {
    let (compared, matched) = compare_prefix(mandatory, optional, token)?;
    (compared >= mandatory.chars().count()).then_some(matched)
}

/// Case-insensitive comparison of `token` against `mandatory + optional`,
/// stopping at whichever ends first. Returns the characters and the bytes
/// of `token` compared, or `None` on the first mismatch.
fn compare_prefix(mandatory: &str, optional: &str, token: &str) -> Option<(usize, usize)> {
    let mut tok = token.chars();
    let mut compared = 0;
    let mut matched = 0;
    for expected in mandatory.chars().chain(optional.chars()) {
        match tok.next() {
            Some(c) if c.eq_ignore_ascii_case(&expected) => {
                compared += 1;
                matched += c.len_utf8();
            },
            Some(_) => return None,
            None => break,
        }
    }
    Some((compared, matched))
}

/// Registry of available commands, ordered by mandatory prefix.
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandSpec>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `full_name`, requiring at least `min_match` typed characters.
    ///
    /// Fails if the name is shorter than `min_match` (or `min_match` is 0),
    /// or if any abbreviation of the new command would also select an
    /// existing one (checked in both directions).
    pub fn register(
        &mut self,
        full_name: &str,
        min_match: usize,
        handler: Box<dyn Command>,
    ) -> Result<()> {
        let chars: Vec<char> = full_name.chars().collect();
        if min_match == 0 || chars.len() < min_match {
            log::warn!("rejecting command {full_name}: bad minimum match length {min_match}");
            return Err(CmdshError::NameTooShort {
                name: full_name.to_string(),
                min: min_match,
            });
        }

        // Progressively shorter abbreviations, full spelling first.
        for len in (min_match..=chars.len()).rev() {
            let abbrev: String = chars[..len].iter().collect();
            if let Some(existing) = self.resolve(&abbrev) {
                return Err(self.ambiguous(full_name, existing));
            }
        }

        let mandatory = chars[..min_match]
            .iter()
            .collect::<String>()
            .to_ascii_uppercase();
        let optional: String = chars[min_match..].iter().collect();

        // An existing command's abbreviation must not select the new one either.
        if let Some(existing) = self.commands.values().find(|spec| {
            spec.abbreviations()
                .any(|abbrev| abbrev_match(&mandatory, &optional, &abbrev).is_some())
        }) {
            return Err(self.ambiguous(full_name, existing));
        }

        match self.commands.entry(mandatory) {
            Entry::Occupied(slot) => {
                let existing = slot.get().full_name();
                log::warn!("rejecting command {full_name}: key taken by {existing}");
                Err(CmdshError::AmbiguousCommand {
                    name: full_name.to_string(),
                    existing,
                })
            },
            Entry::Vacant(slot) => {
                log::debug!("registered command {}{optional}", slot.key());
                let mandatory = slot.key().clone();
                slot.insert(CommandSpec {
                    mandatory,
                    optional,
                    handler,
                });
                Ok(())
            },
        }
    }

    fn ambiguous(&self, name: &str, existing: &CommandSpec) -> CmdshError {
        let existing = existing.full_name();
        log::warn!("rejecting command {name}: ambiguous with {existing}");
        CmdshError::AmbiguousCommand {
            name: name.to_string(),
            existing,
        }
    }

    /// Find the command a typed token selects.
    pub fn resolve(&self, token: &str) -> Option<&CommandSpec> {
        self.resolve_with_len(token).map(|(spec, _)| spec)
    }

    /// Like [`resolve`](Self::resolve), also returning how many bytes of
    /// `token` the match consumed.
    ///
    /// Registration keeps at most one command matching any token; should
    /// that ever not hold, the smallest mandatory prefix wins.
    pub fn resolve_with_len(&self, token: &str) -> Option<(&CommandSpec, usize)> {
        self.commands
            .values()
            .find_map(|spec| spec.matches(token).map(|len| (spec, len)))
    }

    /// Look up a command by its exact (upper-case) mandatory prefix.
    pub fn get(&self, mandatory: &str) -> Option<&CommandSpec> {
        self.commands.get(mandatory)
    }

    /// Registered commands in key order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.values()
    }

    /// Full spellings of every command, in key order.
    pub fn full_names(&self) -> Vec<String> {
        self.iter().map(CommandSpec::full_name).collect()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Print every command's help line, then a blank line.
    pub fn print_helps(&self, out: &mut dyn Write) -> io::Result<()> {
        for spec in self.iter() {
            spec.handler().help(out)?;
        }
        writeln!(out)
    }
}
