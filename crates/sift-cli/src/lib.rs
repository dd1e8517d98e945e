//! # sift-cli
//!
//! Command-line tools for Sift indexes:
//! - direct searches against an on-disk index
//! - index statistics
//! - configuration file management

#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;

pub use cli::{Cli, Command, ConfigAction, SearchArgs};
