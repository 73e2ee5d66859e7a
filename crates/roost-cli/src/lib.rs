//! Roost operator CLI
//!
//! Command implementations and terminal output helpers for the `roost`
//! binary.

pub mod commands;
pub mod output;
