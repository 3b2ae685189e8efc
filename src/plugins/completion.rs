//! `gql completion <line>`: machine readable completion listing.
//!
//! The line is re-peeked and the command tree rebuilt for it, then the
//! command its path words reach is listed, options first:
//!
//! ```text
//! opt:--arg-first:Argument of type Int:true
//! cmd:friends:friends(first: Int): [User]:false
//! ```

use crate::Session;
use crate::cli;
use crate::core::error::GqlError;
use clap::Command;
use std::io::Write;

/// Deepest command reachable from `root` by following `path` word by word.
pub fn find_command<'c, S: AsRef<str>>(root: &'c Command, path: &[S]) -> &'c Command {
    let mut current = root;
    for word in path {
        match current.find_subcommand(word.as_ref()) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Listing lines for `command`. Expects a built command so inherited global
/// options are included.
pub fn listing(command: &Command) -> Vec<String> {
    let mut lines = Vec::new();
    for arg in command.get_arguments() {
        if arg.is_hide_set() {
            continue;
        }
        let Some(long) = arg.get_long() else {
            continue;
        };
        let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
        lines.push(format!(
            "opt:--{}:{}:{}",
            long,
            help,
            arg.get_action().takes_values()
        ));
    }
    for sub in command.get_subcommands() {
        if sub.is_hide_set() {
            continue;
        }
        let about = sub.get_about().map(|a| a.to_string()).unwrap_or_default();
        lines.push(format!("cmd:{}:{}:false", sub.get_name(), about));
    }
    lines
}

/// Words of the line are split on whitespace; the first one is the program
/// name and is dropped.
pub fn run_completion(session: &Session, line: &str, out: &mut dyn Write) -> Result<(), GqlError> {
    let words: Vec<&str> = line.split_whitespace().skip(1).collect();
    let peeked = cli::peek(&words);
    let session = session.overridden_by(&peeked)?;
    let schema = session.load_schema()?;
    let trees = match &schema {
        Some(schema) => crate::build_trees(schema, &peeked.path)?,
        None => Vec::new(),
    };
    let mut root = crate::build_command(&trees);
    root.build();
    for entry in listing(find_command(&root, &peeked.path)) {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}
