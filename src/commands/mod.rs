//! CLI commands

pub mod decorate;
pub mod list;
