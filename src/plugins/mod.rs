//! Command implementations on top of `core`.
//!
//! - `operation`: the schema-derived query, mutation and subscription commands
//! - `fields`, `args`: schema lookups for scripting
//! - `completion`: completion listing for shell integrations

pub mod args;
pub mod completion;
pub mod fields;
pub mod operation;
