//! Query synthesis: default selections and bottom-up assembly.
//!
//! Assembly is a fold over the node chain of one invocation. The invoked
//! (last) node is projected first; each ancestor then wraps the fragment with
//! its own name and arguments, and the operation root closes it with its
//! keyword.

use crate::core::binding::{ArgValue, ArgumentBinding, render_arguments};
use crate::core::error::GqlError;
use crate::core::schema::{Field, Schema, Type};
use crate::core::tree::CommandNode;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

/// Default ceiling for the depth retry of an empty projection.
pub const DEFAULT_MAX_DEPTH_CEILING: usize = 8;

/// Selection used when no projection is found below the ceiling. Valid on
/// every composite type.
const TYPENAME: &str = "__typename";

/// Options the user set on one command level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeSettings {
    /// Argument name and parsed value, in the order they should render.
    pub arguments: Vec<(String, ArgValue)>,
    pub max_depth: usize,
    /// Extra selections to include at this level.
    pub fields: Vec<String>,
}

/// One level of an invocation chain.
#[derive(Debug, Clone)]
pub struct Invocation<'a, 's> {
    pub node: &'a CommandNode<'s>,
    pub settings: NodeSettings,
}

impl<'a, 's> Invocation<'a, 's> {
    pub fn new(node: &'a CommandNode<'s>, settings: NodeSettings) -> Self {
        Invocation { node, settings }
    }

    fn rendered_arguments(&self) -> Result<String, GqlError> {
        let mut set: Vec<(&ArgumentBinding, &ArgValue)> = Vec::new();
        for (name, value) in &self.settings.arguments {
            let binding = self.node.binding(name).ok_or_else(|| {
                GqlError::ArgumentError(format!(
                    "field {} has no argument {}",
                    self.node.name(),
                    name
                ))
            })?;
            set.push((binding, value));
        }
        render_arguments(&set)
    }
}

/// Query text and variables accumulated for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFragment {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl QueryFragment {
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }
}

pub struct QuerySynthesizer<'s> {
    schema: &'s Schema,
    depth_ceiling: usize,
}

impl<'s> QuerySynthesizer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        QuerySynthesizer {
            schema,
            depth_ceiling: DEFAULT_MAX_DEPTH_CEILING,
        }
    }

    pub fn with_depth_ceiling(mut self, ceiling: usize) -> Self {
        self.depth_ceiling = ceiling;
        self
    }

    /// Selections for the type of `field` at exactly `depth`, without retry.
    /// Scalar and enum fields are always selected; composite fields only
    /// while depth remains and only when their own projection is non-empty.
    pub fn projection(&self, field: &Field, depth: usize) -> Result<Vec<String>, GqlError> {
        let ty = self.resolve(&field.ty)?;
        let mut stack = vec![ty.name()];
        Ok(self.project(ty, depth, &mut stack))
    }

    fn project(&self, ty: &'s Type, depth: usize, stack: &mut Vec<&'s str>) -> Vec<String> {
        let mut selections = Vec::with_capacity(ty.fields().len());
        for field in ty.fields() {
            let leaf = field.ty.named_type();
            if leaf.is_leaf_kind() {
                selections.push(field.name.clone());
                continue;
            }
            if depth == 0 {
                continue;
            }
            let Ok(nested) = self.resolve(&field.ty) else {
                tracing::debug!(field = %field.name, type_name = %leaf.name(), "skipping field of unknown type");
                continue;
            };
            if nested.is_leaf_kind() {
                selections.push(field.name.clone());
                continue;
            }
            if stack.contains(&nested.name()) {
                continue;
            }
            stack.push(nested.name());
            let inner = self.project(nested, depth - 1, stack);
            stack.pop();
            if !inner.is_empty() {
                selections.push(format!("{} {{ {} }}", field.name, inner.join(" ")));
            }
        }
        selections
    }

    /// Selection body for a composite field: the projection at `depth`,
    /// retried one level deeper while it comes out empty, up to the ceiling.
    /// `extra` selections are appended once, after the projection.
    pub fn solve(&self, field: &Field, depth: usize, extra: &[String]) -> Result<String, GqlError> {
        let mut current = depth;
        let mut selections = loop {
            let found = self.projection(field, current)?;
            if !found.is_empty() || !extra.is_empty() || current >= self.depth_ceiling {
                break found;
            }
            current += 1;
        };
        if current > depth && !selections.is_empty() {
            tracing::debug!(field = %field.name, requested = depth, used = current, "projection needed a deeper depth");
        }
        let mut seen: FxHashSet<String> = selections.iter().cloned().collect();
        for selection in extra {
            if seen.insert(selection.clone()) {
                selections.push(selection.clone());
            }
        }
        if selections.is_empty() {
            tracing::warn!(
                field = %field.name,
                ceiling = self.depth_ceiling,
                "no selectable fields below the depth ceiling, selecting __typename"
            );
            selections.push(TYPENAME.to_string());
        }
        Ok(selections.join(" "))
    }

    /// Builds the query for a chain ordered root first, invoked node last.
    pub fn assemble(&self, chain: &[Invocation<'_, 's>]) -> Result<QueryFragment, GqlError> {
        let (root, _) = chain
            .split_first()
            .ok_or_else(|| GqlError::InvalidPath("empty command chain".to_string()))?;
        let operation = root.node.operation.ok_or_else(|| {
            GqlError::InvalidPath(format!("{} is not an operation root", root.node.name()))
        })?;
        if let Some(stray) = chain[1..].iter().find(|i| i.node.operation.is_some()) {
            return Err(GqlError::InvalidPath(format!(
                "operation root {} in the middle of a chain",
                stray.node.name()
            )));
        }

        let (leaf, ancestors) = chain
            .split_last()
            .ok_or_else(|| GqlError::InvalidPath("empty command chain".to_string()))?;

        if ancestors.is_empty() {
            let body = self.solve(&leaf.node.field, leaf.settings.max_depth, &leaf.settings.fields)?;
            return Ok(QueryFragment {
                query: format!("{} {{ {} }}", operation.keyword(), body),
                variables: Map::new(),
            });
        }

        let mut fragment = QueryFragment {
            query: self.seed(leaf)?,
            variables: Map::new(),
        };
        for ancestor in ancestors[1..].iter().rev() {
            self.wrap(&mut fragment, ancestor)?;
        }
        let mut selections: Vec<&str> = root.settings.fields.iter().map(String::as_str).collect();
        selections.push(&fragment.query);
        fragment.query = format!("{} {{ {} }}", operation.keyword(), selections.join(" "));
        Ok(fragment)
    }

    fn seed(&self, leaf: &Invocation<'_, 's>) -> Result<String, GqlError> {
        let args = leaf.rendered_arguments()?;
        if leaf.node.is_terminal() {
            if !leaf.settings.fields.is_empty() {
                tracing::warn!(field = %leaf.node.name(), "--fields ignored on a scalar or enum field");
            }
            return Ok(format!("{}{}", leaf.node.name(), args));
        }
        let body = self.solve(&leaf.node.field, leaf.settings.max_depth, &leaf.settings.fields)?;
        Ok(format!("{}{} {{ {} }}", leaf.node.name(), args, body))
    }

    fn wrap(&self, fragment: &mut QueryFragment, level: &Invocation<'_, 's>) -> Result<(), GqlError> {
        let args = level.rendered_arguments()?;
        let mut selections: Vec<&str> = level
            .settings
            .fields
            .iter()
            .map(String::as_str)
            .collect();
        selections.push(&fragment.query);
        fragment.query = format!(
            "{}{} {{ {} }}",
            level.node.name(),
            args,
            selections.join(" ")
        );
        Ok(())
    }

    fn resolve(&self, ty: &Type) -> Result<&'s Type, GqlError> {
        let schema: &'s Schema = self.schema;
        schema
            .resolve(ty)
            .ok_or_else(|| GqlError::TypeNotFound(ty.named_type().name().to_string()))
    }
}
