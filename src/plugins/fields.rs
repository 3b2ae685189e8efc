//! `gql fields <path...>`: field names visible at a resolve path.

use crate::core::error::GqlError;
use crate::core::fuzzy::{self, Resolution};
use crate::core::schema::Schema;
use colored::Colorize;
use std::io::Write;

/// Prints the space separated field names of the type at `path`. When the
/// last segment names no field, prints the closest field names of its parent
/// instead and notes that on `err`.
pub fn run_fields<S: AsRef<str>>(
    schema: &Schema,
    path: &[S],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), GqlError> {
    if let Some(ty) = schema.type_for_path(path) {
        let names = ty
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>();
        writeln!(out, "{}", names.join(" "))?;
        return Ok(());
    }

    let (last, parent) = path.split_last().ok_or(GqlError::PathNotFound)?;
    let parent_type = schema.type_for_path(parent).ok_or(GqlError::PathNotFound)?;
    match fuzzy::resolve(parent_type, last.as_ref()) {
        Resolution::Suggestions(matches) => {
            writeln!(err, "{}", "no exact match found".yellow())?;
            writeln!(err, "{}", "printing closest matches".yellow())?;
            writeln!(out, "{}", matches.join(" "))?;
            Ok(())
        }
        Resolution::Exact | Resolution::NotFound => Err(GqlError::PathNotFound),
    }
}
