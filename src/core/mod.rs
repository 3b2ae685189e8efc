//! Core of gql: the schema model and everything that turns it into commands
//! and queries.
//!
//! Nothing in here knows about clap or argv. The dispatch layer in `lib.rs`
//! renders [`tree::CommandTree`] into a command line and feeds parsed values
//! back as [`query::NodeSettings`].

pub mod binding;
pub mod cache;
pub mod config;
pub mod error;
pub mod fuzzy;
pub mod introspection;
pub mod query;
pub mod redact;
pub mod schema;
pub mod transport;
pub mod tree;
pub mod variables;
