//! gql: a GraphQL command line client driven by the endpoint's schema.
//!
//! The schema is introspected (or read from the local cache) before argv is
//! parsed. Its root operations become the `query`, `mutation` and
//! `subscription` commands and every field along the typed path becomes a
//! nested subcommand:
//!
//! ```bash
//! gql --endpoint https://api.example.com/graphql \
//!     query viewer friends --arg-first 5 --max-depth 1
//! # sends: query { viewer { friends(first: 5) { id name } } }
//! ```
//!
//! # Crate Structure
//!
//! - [`core`]: schema model, argument bindings, command tree, query
//!   synthesis, cache, config and transport
//! - [`plugins`]: the command implementations
//! - [`cli`]: static clap surface and the argv peek

pub mod cli;
pub mod core;
pub mod plugins;

use crate::cli::{GlobalCli, Peek, ToolCommand};
use crate::core::{
    cache::{FsCacheStore, SchemaCache},
    config::{self, Config},
    error::GqlError,
    fuzzy::{self, Resolution},
    introspection,
    schema::{Operation, Schema},
    transport::{GraphQLRequest, HttpTransport},
    tree::{CommandTree, CommandTreeBuilder},
    variables::{self, Variables},
};

use clap::error::ErrorKind;
use clap::{Args, Command, FromArgMatches, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GQL_LOG";

const ABOUT: &str = "GraphQL command line client";
const LONG_ABOUT: &str = "Simple graphql command line client allowing user to execute GraphQL query against http GraphQL servers.

The query, mutation and subscription commands appear once an endpoint is known, from --endpoint or the config file.";

/// Endpoint, headers and cache policy for one run.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: Config,
    pub endpoint: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub no_cache: bool,
}

impl Session {
    /// Config values overridden by what was peeked from argv.
    pub fn new(config: Config, peeked: &Peek) -> Result<Self, GqlError> {
        let session = Session {
            endpoint: config.endpoint.clone(),
            headers: config.headers.clone(),
            no_cache: false,
            config,
        };
        session.overridden_by(peeked)
    }

    pub fn overridden_by(&self, peeked: &Peek) -> Result<Self, GqlError> {
        let mut session = self.clone();
        if let Some(endpoint) = &peeked.endpoint {
            session.endpoint = Some(endpoint.clone());
        }
        for raw in &peeked.headers {
            let (name, value) = variables::parse_assignment(raw)?;
            session.headers.insert(name, value);
        }
        session.no_cache |= peeked.no_cache;
        Ok(session)
    }

    pub fn transport(&self) -> Result<HttpTransport, GqlError> {
        let endpoint = self.endpoint.as_deref().ok_or_else(missing_endpoint)?;
        HttpTransport::new(endpoint, self.config.http.timeout())
    }

    /// Schema of the endpoint, from the cache when fresh. `None` when no
    /// endpoint is set.
    pub fn load_schema(&self) -> Result<Option<Schema>, GqlError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Ok(None);
        };
        let transport = self.transport()?;
        let fetch = || introspection::fetch_schema(&transport, &self.headers);
        let schema = match self.config.cache.resolved_dir() {
            Some(dir) => SchemaCache::new(
                FsCacheStore::new(dir),
                self.config.cache.ttl(),
                self.config.cache.key,
            )
            .load_or_fetch(endpoint, self.no_cache, fetch)?,
            None => {
                tracing::debug!("no cache directory available, fetching schema");
                fetch()?
            }
        };
        Ok(Some(schema))
    }
}

/// One tree per root operation the schema defines, expanded along `path`.
pub fn build_trees<'s, S: AsRef<str>>(
    schema: &'s Schema,
    path: &[S],
) -> Result<Vec<CommandTree<'s>>, GqlError> {
    let builder = CommandTreeBuilder::new(schema);
    let mut trees = Vec::new();
    for operation in Operation::ALL {
        if let Some(tree) = builder.build_operation(operation, path)? {
            trees.push(tree);
        }
    }
    Ok(trees)
}

/// Full clap command: global options, tooling commands and one subcommand
/// per operation tree.
pub fn build_command(trees: &[CommandTree<'_>]) -> Command {
    let command = Command::new(cli::BIN_NAME)
        .version(env!("CARGO_PKG_VERSION"))
        .about(ABOUT)
        .long_about(LONG_ABOUT)
        .disable_help_subcommand(true);
    let mut command = ToolCommand::augment_subcommands(GlobalCli::augment_args(command));
    for tree in trees {
        command = command.subcommand(plugins::operation::node_command(&tree.root));
    }
    command
}

pub fn run() -> Result<(), GqlError> {
    let argv: Vec<String> = std::env::args().collect();
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_from(&argv, &mut stdout.lock(), &mut stderr.lock())
}

/// Runs gql for `argv` (program name first), writing results to `out` and
/// notices to `err`.
pub fn run_from(argv: &[String], out: &mut dyn Write, err: &mut dyn Write) -> Result<(), GqlError> {
    let peeked = cli::peek(argv.get(1..).unwrap_or_default());
    let config = config::load_config(peeked.config.as_deref())?;
    let session = Session::new(config, &peeked)?;
    let schema = session.load_schema()?;
    let trees = match &schema {
        Some(schema) => build_trees(schema, &peeked.path)?,
        None => Vec::new(),
    };

    let mut command = build_command(&trees);
    let matches = match command.try_get_matches_from_mut(argv) {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(out, "{}", e.render())?;
            return Ok(());
        }
        Err(e) => {
            diagnose_path(schema.as_ref(), &trees, &peeked.path, err)?;
            return Err(GqlError::Usage(e.render().to_string()));
        }
    };
    let globals =
        GlobalCli::from_arg_matches(&matches).map_err(|e| GqlError::Usage(e.to_string()))?;

    match matches.subcommand() {
        Some((name, _)) if ToolCommand::has_subcommand(name) => {
            let tool =
                ToolCommand::from_arg_matches(&matches).map_err(|e| GqlError::Usage(e.to_string()))?;
            run_tool(&session, schema.as_ref(), tool, out, err)
        }
        Some((name, sub)) => {
            let tree = trees
                .iter()
                .find(|t| t.root.name() == name)
                .ok_or_else(|| GqlError::InvalidPath(name.to_string()))?;
            let variables = Variables::from_assignments(&globals.variables)?;
            let fragment = plugins::operation::compose(
                tree,
                sub,
                session.config.query.max_depth_ceiling,
            )?
            .with_variables(variables.unflatten());
            let mut request = GraphQLRequest::new(fragment.query);
            request.variables = fragment.variables;
            request.operation_name = globals.operation_name;
            request.headers = session.headers.clone();
            let transport = session.transport()?;
            plugins::operation::execute(&transport, &request, out, err)?;
            Ok(())
        }
        None => {
            write!(out, "{}", command.render_help())?;
            Ok(())
        }
    }
}

fn run_tool(
    session: &Session,
    schema: Option<&Schema>,
    tool: ToolCommand,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), GqlError> {
    match tool {
        ToolCommand::Completion { line } => plugins::completion::run_completion(session, &line, out),
        ToolCommand::Fields { path } => {
            let schema = schema.ok_or_else(missing_endpoint)?;
            plugins::fields::run_fields(schema, &path, out, err)
        }
        ToolCommand::Args { path } => {
            let schema = schema.ok_or_else(missing_endpoint)?;
            plugins::args::run_args(schema, &path, out)
        }
    }
}

fn missing_endpoint() -> GqlError {
    GqlError::Config("no endpoint set, pass --endpoint or set endpoint in the config file".to_string())
}

/// Turns a parse failure caused by the resolve path into a path error with
/// suggestions. Returns `Ok` when the path is not the problem.
fn diagnose_path(
    schema: Option<&Schema>,
    trees: &[CommandTree<'_>],
    path: &[String],
    err: &mut dyn Write,
) -> Result<(), GqlError> {
    let Some(first) = path.first() else {
        return Ok(());
    };
    let Some(operation) = Operation::from_keyword(first) else {
        return Ok(());
    };
    if schema.is_none() {
        return Err(missing_endpoint());
    }
    let Some(tree) = trees.iter().find(|t| t.root.operation == Some(operation)) else {
        return Err(GqlError::InvalidPath(format!(
            "schema defines no {} operation",
            operation.keyword()
        )));
    };
    let Some(segment) = tree.unmatched() else {
        return Ok(());
    };
    let chain = tree.chain();
    let Some(parent) = chain.last() else {
        return Ok(());
    };
    if parent.operation.is_none() && parent.is_terminal() {
        return Err(GqlError::InvalidPath(format!(
            "{} returns {} and cannot be followed by {}",
            parent.name(),
            parent.field.ty.format_type(),
            segment
        )));
    }
    let Some(parent_type) = parent.schema().resolve(&parent.field.ty) else {
        return Err(GqlError::PathNotFound);
    };
    match fuzzy::resolve(parent_type, segment) {
        Resolution::Suggestions(matches) => {
            writeln!(
                err,
                "{} {}",
                "no exact match found for".yellow(),
                segment.yellow().bold()
            )?;
            writeln!(err, "closest matches: {}", matches.join(" "))?;
            Err(GqlError::PathNotFound)
        }
        Resolution::NotFound => Err(GqlError::PathNotFound),
        Resolution::Exact => Ok(()),
    }
}
