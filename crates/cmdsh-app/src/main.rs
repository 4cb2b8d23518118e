//! cmdsh entry point.
//!
//! `cmdsh [-File <dofile>] [--config <path>]`
//!
//! Runs the command loop until `quit` or end of input. On a terminal, lines
//! are edited in raw mode with Tab completion; otherwise stdin is read
//! line by line.

mod line_editor;

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Result, bail};

use cmdsh_terminal::{CmdExecStatus, CmdParser, LineEditor, PlainEditor, abbrev_match, register_builtins};
use cmdsh_types::config::ShellConfig;
use line_editor::RawEditor;

const USAGE: &str = "Usage: cmdsh [-File <dofile>] [--config <path>]";
const DEFAULT_CONFIG: &str = "cmdsh.toml";

#[derive(Debug, Default, PartialEq)]
struct Args {
    dofile: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let slot = if arg == "--config" {
            &mut parsed.config
        } else if abbrev_match("-F", "ile", &arg) == Some(arg.len()) {
            &mut parsed.dofile
        } else {
            bail!("Illegal option!! ({arg})\n{USAGE}");
        };
        let Some(value) = args.next() else {
            bail!("Missing option after ({arg})!!\n{USAGE}");
        };
        if slot.replace(PathBuf::from(value)).is_some() {
            bail!("Extra option!! ({arg})\n{USAGE}");
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    // Resolve config from CLI arg, CMDSH_CONFIG env var, or the default file.
    let config_path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("CMDSH_CONFIG").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = ShellConfig::load(&config_path)?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();
    log::info!("config {}", config_path.display());

    let editor: Box<dyn LineEditor> = if io::stdin().is_terminal() {
        Box::new(RawEditor::new(config.prompt.clone()))
    } else {
        log::debug!("stdin is not a terminal, line editing disabled");
        Box::new(PlainEditor::new(io::stdin().lock()))
    };

    let mut parser = CmdParser::new(editor, &config);
    register_builtins(parser.registry_mut())?;

    if let Some(dofile) = &args.dofile {
        parser.open_dofile(dofile)?;
    }

    loop {
        if parser.execute_one() == CmdExecStatus::Quit || parser.is_exhausted() {
            break;
        }
    }
    log::info!("{} lines executed", parser.history().len());
    Ok(())
}
