//! CLI module for convstudy
//!
//! Handles command-line argument parsing and configuration management.

pub mod args;
pub mod config;

pub use args::{Args, Commands, RunArgs, Verbosity};
pub use config::Config;
