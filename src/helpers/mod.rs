//! Helper functions shared by blocks and commands

mod date;

pub use date::*;
