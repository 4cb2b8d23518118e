//! Built-in commands: help, quit, history, dofile.

use std::io::{self, Write};
use std::path::Path;

use cmdsh_types::error::{CmdshError, Result};

use crate::options::{lex_required_option, lex_single_option, parse_int};
use crate::registry::{CmdExecStatus, Command, CommandRegistry, Environment, abbrev_match};

/// Register the built-in commands into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<()> {
    reg.register("HELp", 3, Box::new(HelpCmd))?;
    reg.register("Quit", 1, Box::new(QuitCmd))?;
    reg.register("HIStory", 3, Box::new(HistoryCmd))?;
    reg.register("DOfile", 2, Box::new(DofileCmd))?;
    Ok(())
}

fn help_line(out: &mut dyn Write, name: &str, text: &str) -> io::Result<()> {
    writeln!(out, "{:<15}{text}", format!("{name}: "))
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn exec(&self, option: &str, env: &mut Environment<'_>) -> Result<CmdExecStatus> {
        match lex_single_option(option)? {
            None => env.registry.print_helps(env.out)?,
            Some(token) => {
                let spec = env
                    .registry
                    .resolve(token)
                    .ok_or_else(|| CmdshError::IllegalOption(token.to_string()))?;
                spec.handler().usage(env.out)?;
            },
        }
        Ok(CmdExecStatus::Done)
    }
    fn usage(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Usage: HELp [(string cmd)]")
    }
    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        help_line(out, "HELp", "print this help message")
    }
}

// ---------------------------------------------------------------------------
// quit
// ---------------------------------------------------------------------------

struct QuitCmd;
impl Command for QuitCmd {
    fn exec(&self, option: &str, _env: &mut Environment<'_>) -> Result<CmdExecStatus> {
        if let Some(token) = lex_single_option(option)?
            && abbrev_match("-F", "orce", token) != Some(token.len())
        {
            return Err(CmdshError::IllegalOption(token.to_string()));
        }
        Ok(CmdExecStatus::Quit)
    }
    fn usage(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Usage: QUIT [-Force]")
    }
    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        help_line(out, "Quit", "quit the execution")
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Command for HistoryCmd {
    fn exec(&self, option: &str, env: &mut Environment<'_>) -> Result<CmdExecStatus> {
        // Negative counts print everything.
        let count = match lex_single_option(option)? {
            Some(token) => usize::try_from(parse_int(token)?).ok(),
            None => None,
        };
        env.history.print(count, env.out)?;
        Ok(CmdExecStatus::Done)
    }
    fn usage(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Usage: HIStory [(int nPrint)]")
    }
    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        help_line(out, "HIStory", "print command history")
    }
}

// ---------------------------------------------------------------------------
// dofile
// ---------------------------------------------------------------------------

struct DofileCmd;
impl Command for DofileCmd {
    fn exec(&self, option: &str, env: &mut Environment<'_>) -> Result<CmdExecStatus> {
        let file = lex_required_option(option)?;
        env.dofiles.open(Path::new(file))?;
        Ok(CmdExecStatus::Done)
    }
    fn usage(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Usage: DOfile <(string file)>")
    }
    fn help(&self, out: &mut dyn Write) -> io::Result<()> {
        help_line(out, "DOfile", "execute the commands in the dofile")
    }
}
