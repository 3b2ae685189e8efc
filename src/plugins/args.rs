//! `gql args <path...>`: argument names of the field at a resolve path.

use crate::core::error::GqlError;
use crate::core::schema::Schema;
use std::io::Write;

pub fn run_args<S: AsRef<str>>(
    schema: &Schema,
    path: &[S],
    out: &mut dyn Write,
) -> Result<(), GqlError> {
    let field = schema.field_for_path(path).ok_or(GqlError::PathNotFound)?;
    writeln!(out, "{}", field.arg_names().join(" "))?;
    Ok(())
}
