//! Option-string lexing shared by command implementations.
//!
//! A command receives everything after its name as one string. These
//! helpers split it on whitespace and enforce arity, returning the option
//! errors the dispatcher reports as `Error: ...`.

use std::io::Write;

use cmdsh_types::error::{CmdshError, Result};

use crate::registry::CmdExecStatus;

/// Next whitespace-delimited token at or after byte `from`.
///
/// Returns the token and the byte index just past it, or `None` when only
/// whitespace remains.
pub fn next_token(s: &str, from: usize) -> Option<(&str, usize)> {
    let rest = s.get(from..)?;
    let start = from + rest.find(|c: char| !c.is_whitespace())?;
    let end = s[start..]
        .find(char::is_whitespace)
        .map_or(s.len(), |i| start + i);
    Some((&s[start..end], end))
}

/// Succeed only if `option` is blank.
pub fn lex_no_option(option: &str) -> Result<()> {
    match next_token(option, 0) {
        Some((extra, _)) => Err(CmdshError::ExtraOption(extra.to_string())),
        None => Ok(()),
    }
}

/// Accept zero or one token.
pub fn lex_single_option(option: &str) -> Result<Option<&str>> {
    let Some((token, end)) = next_token(option, 0) else {
        return Ok(None);
    };
    let rest = option[end..].trim();
    if !rest.is_empty() {
        return Err(CmdshError::ExtraOption(rest.to_string()));
    }
    Ok(Some(token))
}

/// Require exactly one token.
pub fn lex_required_option(option: &str) -> Result<&str> {
    lex_single_option(option)?.ok_or(CmdshError::MissingOption(None))
}

/// Split `option` into tokens. When `count` is non-zero the number of
/// tokens must be exactly `count`.
pub fn lex_options(option: &str, count: usize) -> Result<Vec<&str>> {
    let tokens: Vec<&str> = option.split_whitespace().collect();
    if count != 0 {
        if tokens.len() < count {
            let last = tokens.last().map(|t| t.to_string());
            return Err(CmdshError::MissingOption(last));
        }
        if tokens.len() > count {
            return Err(CmdshError::ExtraOption(tokens[count].to_string()));
        }
    }
    Ok(tokens)
}

/// Parse a decimal integer option, reporting it as illegal otherwise.
pub fn parse_int(token: &str) -> Result<i64> {
    token
        .parse()
        .map_err(|_| CmdshError::IllegalOption(token.to_string()))
}

/// Print `err` to the error sink as `Error: ...` and yield the error status.
pub fn report_error(err: &CmdshError, sink: &mut dyn Write) -> CmdExecStatus {
    if err.is_option_error() {
        log::debug!("command failed: {err:?}");
    } else {
        log::warn!("command failed: {err}");
    }
    // Nowhere left to report a failing error sink.
    let _ = writeln!(sink, "Error: {err}");
    CmdExecStatus::Error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_token_skips_leading_space() {
        assert_eq!(next_token("  abc def", 0), Some(("abc", 5)));
        assert_eq!(next_token("  abc def", 5), Some(("def", 9)));
        assert_eq!(next_token("  abc def", 9), None);
        assert_eq!(next_token("   ", 0), None);
        assert_eq!(next_token("", 0), None);
    }

    #[test]
    fn next_token_handles_tabs() {
        assert_eq!(next_token("\tx\ty", 0), Some(("x", 2)));
    }

    #[test]
    fn next_token_out_of_range() {
        assert_eq!(next_token("ab", 5), None);
    }

    #[test]
    fn no_option_ok() {
        assert!(lex_no_option("").is_ok());
        assert!(lex_no_option("   ").is_ok());
    }

    #[test]
    fn no_option_extra() {
        match lex_no_option(" foo bar") {
            Err(CmdshError::ExtraOption(t)) => assert_eq!(t, "foo"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn single_option() {
        assert_eq!(lex_single_option("").unwrap(), None);
        assert_eq!(lex_single_option(" x ").unwrap(), Some("x"));
        match lex_single_option("x y z") {
            Err(CmdshError::ExtraOption(t)) => assert_eq!(t, "y z"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn required_option() {
        assert_eq!(lex_required_option("file").unwrap(), "file");
        assert!(matches!(
            lex_required_option("  "),
            Err(CmdshError::MissingOption(None))
        ));
    }

    #[test]
    fn options_any_count() {
        assert_eq!(lex_options("a b  c", 0).unwrap(), vec!["a", "b", "c"]);
        assert!(lex_options("", 0).unwrap().is_empty());
    }

    #[test]
    fn options_exact_count() {
        assert_eq!(lex_options("a b", 2).unwrap(), vec!["a", "b"]);
        match lex_options("a", 2) {
            Err(CmdshError::MissingOption(Some(after))) => assert_eq!(after, "a"),
            other => panic!("unexpected: {other:?}"),
        }
        match lex_options("a b c", 2) {
            Err(CmdshError::ExtraOption(t)) => assert_eq!(t, "c"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn int_parsing() {
        assert_eq!(parse_int("12").unwrap(), 12);
        assert_eq!(parse_int("-3").unwrap(), -3);
        assert!(matches!(parse_int("x1"), Err(CmdshError::IllegalOption(_))));
    }

    #[test]
    fn report_formats_with_prefix() {
        let mut sink = Vec::new();
        let status = report_error(&CmdshError::ExtraOption("q".into()), &mut sink);
        assert_eq!(status, CmdExecStatus::Error);
        assert_eq!(String::from_utf8(sink).unwrap(), "Error: Extra option!! (q)\n");
    }

    #[test]
    fn report_missing() {
        let mut sink = Vec::new();
        report_error(&CmdshError::MissingOption(None), &mut sink);
        assert_eq!(String::from_utf8(sink).unwrap(), "Error: Missing option!!\n");
    }
}
