//! Foundation types for cmdsh.
//!
//! Shared by every cmdsh crate: the error taxonomy used across the command
//! registry, dofile stack and option lexers, and the TOML-backed shell
//! configuration.

pub mod config;
pub mod error;
