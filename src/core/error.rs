use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GqlError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Schema fetch failed: {0}")]
    SchemaFetch(String),
    #[error("Type not found in schema: {0}")]
    TypeNotFound(String),
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("path not found in schema")]
    PathNotFound,
    #[error("Config error: {0}")]
    Config(String),
    #[error("Argument error: {0}")]
    ArgumentError(String),
    /// Command line rejected by the parser; the message is already rendered.
    #[error("{0}")]
    Usage(String),
}
