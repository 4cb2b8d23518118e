//! Error types for cmdsh.

use std::io;
use std::path::PathBuf;

/// Errors produced by the cmdsh framework.
///
/// Option variants render the user-facing message without the `Error: `
/// lead-in, which the option reporter in `cmdsh-terminal` adds.
#[derive(Debug, thiserror::Error)]
pub enum CmdshError {
    #[error("Missing option{}!!", .0.as_ref().map(|o| format!(" after ({o})")).unwrap_or_default())]
    MissingOption(Option<String>),

    #[error("Extra option!! ({0})")]
    ExtraOption(String),

    #[error("Illegal option!! ({0})")]
    IllegalOption(String),

    #[error("cannot open file \"{}\"!!", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Illegal command!! ({0})")]
    UnknownCommand(String),

    #[error("command \"{name}\" is ambiguous with registered command \"{existing}\"")]
    AmbiguousCommand { name: String, existing: String },

    #[error("command \"{name}\" cannot use minimum match length {min}")]
    NameTooShort { name: String, min: usize },

    #[error("dofile stack overflow ({0} nested scripts)")]
    DofileDepthExceeded(usize),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl CmdshError {
    /// Whether this error belongs to the command-option family that the
    /// option reporter knows how to print.
    pub fn is_option_error(&self) -> bool {
        matches!(
            self,
            Self::MissingOption(_)
                | Self::ExtraOption(_)
                | Self::IllegalOption(_)
                | Self::FileOpen { .. }
        )
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CmdshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_option_display() {
        let e = CmdshError::MissingOption(None);
        assert_eq!(format!("{e}"), "Missing option!!");
    }

    #[test]
    fn missing_option_after_display() {
        let e = CmdshError::MissingOption(Some("-n".into()));
        assert_eq!(format!("{e}"), "Missing option after (-n)!!");
    }

    #[test]
    fn extra_option_display() {
        let e = CmdshError::ExtraOption("foo".into());
        assert_eq!(format!("{e}"), "Extra option!! (foo)");
    }

    #[test]
    fn illegal_option_display() {
        let e = CmdshError::IllegalOption("-x".into());
        assert_eq!(format!("{e}"), "Illegal option!! (-x)");
    }

    #[test]
    fn file_open_display() {
        let e = CmdshError::FileOpen {
            path: PathBuf::from("missing.dof"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(format!("{e}"), "cannot open file \"missing.dof\"!!");
    }

    #[test]
    fn unknown_command_display() {
        let e = CmdshError::UnknownCommand("hek".into());
        assert_eq!(format!("{e}"), "Illegal command!! (hek)");
    }

    #[test]
    fn depth_exceeded_display() {
        let e = CmdshError::DofileDepthExceeded(1024);
        assert!(format!("{e}").contains("1024"));
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: CmdshError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: CmdshError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn option_family() {
        assert!(CmdshError::ExtraOption("x".into()).is_option_error());
        assert!(CmdshError::MissingOption(None).is_option_error());
        assert!(!CmdshError::UnknownCommand("x".into()).is_option_error());
        assert!(!CmdshError::DofileDepthExceeded(1).is_option_error());
    }
}
