//! CLI command implementations

pub mod check;
pub mod export;
pub mod import;
pub mod json_output;
pub mod prune;
pub mod query;
