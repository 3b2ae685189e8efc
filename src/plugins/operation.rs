//! Query, mutation and subscription commands.
//!
//! A [`CommandTree`] is rendered into nested clap subcommands, one per node,
//! each carrying the node's `--arg-<name>` options plus `--max-depth` and
//! `--fields`. After parsing, the matched subcommand chain is walked back onto
//! the tree to collect per-node settings for the synthesizer.

use crate::core::binding::{ArgValue, ArgumentBinding, OptionKind};
use crate::core::error::GqlError;
use crate::core::query::{Invocation, NodeSettings, QueryFragment, QuerySynthesizer};
use crate::core::transport::{GraphQLRequest, GraphQLResponse, Transport};
use crate::core::tree::{CommandNode, CommandTree};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use std::io::Write;

pub const MAX_DEPTH_OPTION: &str = "max-depth";
pub const FIELDS_OPTION: &str = "fields";

/// Clap command for `node` and every child it has.
pub fn node_command(node: &CommandNode<'_>) -> Command {
    let mut command = Command::new(node.name().to_string())
        .about(node.short())
        .disable_help_subcommand(true);
    if let Some(description) = node.description() {
        command = command.long_about(description.to_string());
    }
    for binding in &node.bindings {
        command = command.arg(argument_option(binding));
    }
    command = command
        .arg(
            Arg::new(MAX_DEPTH_OPTION)
                .long(MAX_DEPTH_OPTION)
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("resolve this field up to max-depth"),
        )
        .arg(
            Arg::new(FIELDS_OPTION)
                .long(FIELDS_OPTION)
                .action(ArgAction::Append)
                .help("additional fields to resolve aside from the next one in resolve path"),
        );
    for child in &node.children {
        command = command.subcommand(node_command(child));
    }
    command
}

fn argument_option(binding: &ArgumentBinding) -> Arg {
    let name = binding.option_name();
    let arg = Arg::new(name.clone())
        .long(name)
        .help(binding.help())
        .required(binding.is_mandatory())
        .action(ArgAction::Set);
    // Booleans take an explicit true/false so a following word is never
    // mistaken for a path segment.
    match binding.option_kind() {
        OptionKind::Integer => arg.value_parser(value_parser!(i64)).allow_negative_numbers(true),
        OptionKind::Float => arg.value_parser(value_parser!(f64)).allow_negative_numbers(true),
        OptionKind::Boolean => arg.value_parser(value_parser!(bool)),
        OptionKind::String => arg.value_parser(value_parser!(String)),
    }
}

fn option_value(binding: &ArgumentBinding, matches: &ArgMatches) -> Result<Option<ArgValue>, GqlError> {
    let id = binding.option_name();
    let invalid = |e: clap::parser::MatchesError| {
        GqlError::ArgumentError(format!("--{}: {}", id, e))
    };
    let value = match binding.option_kind() {
        OptionKind::Integer => matches
            .try_get_one::<i64>(&id)
            .map_err(invalid)?
            .map(|v| ArgValue::Int(*v)),
        OptionKind::Float => matches
            .try_get_one::<f64>(&id)
            .map_err(invalid)?
            .map(|v| ArgValue::Float(*v)),
        OptionKind::Boolean => matches
            .try_get_one::<bool>(&id)
            .map_err(invalid)?
            .map(|v| ArgValue::Bool(*v)),
        OptionKind::String => matches
            .try_get_one::<String>(&id)
            .map_err(invalid)?
            .map(|v| ArgValue::Str(v.clone())),
    };
    Ok(value)
}

/// Settings the user gave on one level. Arguments keep the schema's order.
pub fn node_settings(node: &CommandNode<'_>, matches: &ArgMatches) -> Result<NodeSettings, GqlError> {
    let mut arguments = Vec::new();
    for binding in &node.bindings {
        if let Some(value) = option_value(binding, matches)? {
            arguments.push((binding.name.clone(), value));
        }
    }
    let max_depth = matches
        .try_get_one::<usize>(MAX_DEPTH_OPTION)
        .map_err(|e| GqlError::ArgumentError(format!("--{}: {}", MAX_DEPTH_OPTION, e)))?
        .copied()
        .unwrap_or(0);
    let fields = matches
        .try_get_many::<String>(FIELDS_OPTION)
        .map_err(|e| GqlError::ArgumentError(format!("--{}: {}", FIELDS_OPTION, e)))?
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    Ok(NodeSettings {
        arguments,
        max_depth,
        fields,
    })
}

/// Walks the matched subcommands of the operation root (`matches`) down the
/// tree, pairing every level with its settings.
pub fn collect_invocations<'a, 's>(
    tree: &'a CommandTree<'s>,
    matches: &ArgMatches,
) -> Result<Vec<Invocation<'a, 's>>, GqlError> {
    let mut invocations = Vec::new();
    let mut node = &tree.root;
    let mut level = matches;
    loop {
        invocations.push(Invocation::new(node, node_settings(node, level)?));
        let Some((name, sub)) = level.subcommand() else {
            break;
        };
        node = node.child(name).ok_or_else(|| {
            GqlError::InvalidPath(format!("{} has no field {}", node.name(), name))
        })?;
        level = sub;
    }
    Ok(invocations)
}

/// Query text and variables for the parsed command line.
pub fn compose(
    tree: &CommandTree<'_>,
    matches: &ArgMatches,
    depth_ceiling: usize,
) -> Result<QueryFragment, GqlError> {
    let invocations = collect_invocations(tree, matches)?;
    let synthesizer = QuerySynthesizer::new(tree.root.schema()).with_depth_ceiling(depth_ceiling);
    let fragment = synthesizer.assemble(&invocations)?;
    tracing::debug!(query = %fragment.query, "assembled query");
    Ok(fragment)
}

/// Sends `request` and prints the outcome. Data goes to `out` and the remote
/// error list to `err`, both as pretty JSON; remote errors do not fail the
/// command.
pub fn execute(
    transport: &dyn Transport,
    request: &GraphQLRequest,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<GraphQLResponse, GqlError> {
    let response = transport.execute(request)?;
    if let Some(data) = &response.data {
        writeln!(out, "{}", serde_json::to_string_pretty(data)?)?;
    }
    if response.has_errors() {
        writeln!(err, "{}", serde_json::to_string_pretty(&response.errors)?)?;
    }
    Ok(response)
}
