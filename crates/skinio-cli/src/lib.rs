//! skinio CLI library.
//!
//! Command implementations and argument helpers for the `skinio` binary.

pub mod commands;
pub mod input;
