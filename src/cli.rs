//! Static part of the gql command line.
//!
//! The query, mutation and subscription commands depend on the schema of the
//! endpoint and are added at runtime (see `plugins::operation`). Everything
//! here is known up front: the global options and the tooling commands.

use clap::{Args, Subcommand};
use std::path::PathBuf;

pub const BIN_NAME: &str = "gql";

/// Leading words dropped from a peeked path.
const SKIPPED_WORDS: [&str; 3] = ["gql", "completion", "introspection"];

/// Options accepted at every level of the command tree.
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct GlobalCli {
    /// GraphQL endpoint
    #[clap(long, global = true)]
    pub endpoint: Option<String>,
    /// Set header to be passed in a http request, can be set multiple times
    #[clap(long = "header", global = true, value_name = "KEY=VALUE")]
    pub headers: Vec<String>,
    /// Do not use a cached schema introspection result
    #[clap(long, global = true)]
    pub no_cache: bool,
    /// Set a query variable, can be set multiple times. Dotted keys nest
    #[clap(long = "set", global = true, value_name = "KEY=VALUE")]
    pub variables: Vec<String>,
    /// Operation name sent with the request
    #[clap(long, global = true)]
    pub operation_name: Option<String>,
    /// Configuration file (defaults to $GQL_CONFIG, then the user config dir)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Log debug output to stderr
    #[clap(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ToolCommand {
    /// Returns a list of fields on resolve path
    #[clap(long_about = "Returns a list of fields that can be referenced on this resolve path.")]
    Fields {
        /// Resolve path, operation first (e.g. query viewer)
        #[clap(required = true)]
        path: Vec<String>,
    },
    /// Returns field arguments
    #[clap(long_about = "Return all argument names that are defined on this field by GraphQL schema.")]
    Args {
        /// Resolve path, operation first (e.g. query viewer friends)
        #[clap(required = true)]
        path: Vec<String>,
    },
    /// Lists completions for a command line
    #[clap(
        long_about = "Prints the subcommands and options available after the given command line, one per line, as cmd:<name>:<description>:false or opt:--<flag>:<description>:<takes value>."
    )]
    Completion {
        /// Command line to complete, including the program name
        line: String,
    },
}

/// What could be read from argv before the schema-derived commands exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Peek {
    pub endpoint: Option<String>,
    pub headers: Vec<String>,
    pub config: Option<PathBuf>,
    pub no_cache: bool,
    pub verbose: bool,
    /// Positional words, leading program and tooling words removed.
    pub path: Vec<String>,
}

/// Scans `args` (program name excluded) for the options needed to fetch the
/// schema and for the resolve path. Unknown options are skipped; a long
/// option without `=value` takes the next word as its value unless that word
/// starts with `-`.
pub fn peek<S: AsRef<str>>(args: &[S]) -> Peek {
    let mut peeked = Peek::default();
    let mut words = args.iter().map(AsRef::as_ref).peekable();
    while let Some(word) = words.next() {
        if word == "--" {
            peeked.path.extend(words.by_ref().map(str::to_string));
            break;
        }
        let Some(flag) = word.strip_prefix("--") else {
            if !(word.starts_with('-') && word.len() > 1) {
                peeked.path.push(word.to_string());
            }
            continue;
        };
        let (name, inline) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (flag, None),
        };
        match name {
            "no-cache" => peeked.no_cache = true,
            "verbose" => peeked.verbose = true,
            "help" | "version" => {}
            _ => {
                let value = inline.or_else(|| {
                    words
                        .next_if(|next| !next.starts_with('-'))
                        .map(str::to_string)
                });
                match (name, value) {
                    ("endpoint", Some(value)) => peeked.endpoint = Some(value),
                    ("header", Some(value)) => peeked.headers.push(value),
                    ("config", Some(value)) => peeked.config = Some(PathBuf::from(value)),
                    _ => {}
                }
            }
        }
    }
    let skip = peeked
        .path
        .iter()
        .take_while(|w| SKIPPED_WORDS.contains(&w.as_str()))
        .count();
    peeked.path.drain(..skip);
    peeked
}
