//! # Larder Server Library
//!
//! Command-line surface, dependency wiring and command execution for the
//! `larder` binary.

pub mod cli;
pub mod commands;
pub mod di;
pub mod startup;
