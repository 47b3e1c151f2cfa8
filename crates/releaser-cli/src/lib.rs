//! # releaser-cli — Releaser Command-Line Interface
//!
//! ## Subcommands
//!
//! - `run`: mirror a GitHub repository's releases and serve them
//!
//! Argument parsing and configuration live here; the mirror itself is
//! `releaser-cache` and `releaser-api`.

pub mod config;
pub mod logging;
pub mod run;
