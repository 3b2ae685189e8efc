//! Path-guided command tree over a schema.
//!
//! Every field of an expanded node becomes a child so it can be listed and
//! completed, but only the child named by the next resolve-path segment is
//! expanded in turn. The materialized tree therefore stays proportional to the
//! path plus one level of siblings, however large or cyclic the schema is.

use crate::core::binding::{ArgumentBinding, bind_arguments};
use crate::core::error::GqlError;
use crate::core::schema::{Field, Operation, Schema};

const QUERY_DESCRIPTION: &str = "Simplified query with completion, useful for scripting and command line administration.

Executes a query operation on the GraphQL endpoint, returning the value of the requested field if it is a scalar or an enum. If the field returns an object, interface or union, all scalar and enum fields of that type are returned; list types follow the same rule per element.

Arguments are set with --arg-<name> options placed AFTER the field that accepts them and BEFORE the next field of the resolve path.

By default only the top level scalar and enum fields of the last field are selected. Set --max-depth on that field to also resolve nested object fields up to the given depth. Each field carries its own options, so --max-depth on a field higher in the resolve path does not apply to the fields below it.";

const MUTATION_DESCRIPTION: &str = "Executes a mutation operation on the GraphQL endpoint. Navigation, arguments and field selection work as for query.";

const SUBSCRIPTION_DESCRIPTION: &str = "Composes a subscription operation for the GraphQL endpoint. Navigation, arguments and field selection work as for query; the operation is sent as a single request, results are not streamed.";

/// One invocable level of the command tree.
#[derive(Debug, Clone)]
pub struct CommandNode<'s> {
    pub field: Field,
    pub bindings: Vec<ArgumentBinding>,
    pub children: Vec<CommandNode<'s>>,
    /// Set for the synthetic operation root.
    pub operation: Option<Operation>,
    /// True once the children of this node were generated.
    pub expanded: bool,
    schema: &'s Schema,
}

impl<'s> CommandNode<'s> {
    fn new(schema: &'s Schema, field: Field, operation: Option<Operation>) -> Result<Self, GqlError> {
        let bindings = bind_arguments(&field.args)?;
        Ok(CommandNode {
            field,
            bindings,
            children: Vec::new(),
            operation,
            expanded: false,
            schema,
        })
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn description(&self) -> Option<&str> {
        self.field.description.as_deref()
    }

    /// One line summary: `name(arg: Type): Type`, or a fixed line for roots.
    pub fn short(&self) -> String {
        match self.operation {
            Some(Operation::Query) => "Quick graphql query operation".to_string(),
            Some(Operation::Mutation) => "Quick graphql mutation operation".to_string(),
            Some(Operation::Subscription) => "Quick graphql subscription operation".to_string(),
            None => self.field.signature(),
        }
    }

    /// Scalar and enum fields end the resolve path.
    pub fn is_terminal(&self) -> bool {
        self.field.ty.named_type().is_leaf_kind()
    }

    pub fn child(&self, name: &str) -> Option<&CommandNode<'s>> {
        self.children.iter().find(|c| c.field.name == name)
    }

    pub fn binding(&self, name: &str) -> Option<&ArgumentBinding> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

/// Command tree rooted at one operation, together with the path it was built
/// for.
#[derive(Debug, Clone)]
pub struct CommandTree<'s> {
    pub root: CommandNode<'s>,
    /// Field segments below the operation keyword.
    pub path: Vec<String>,
}

impl<'s> CommandTree<'s> {
    /// Nodes from the root down to the deepest one the path reaches.
    pub fn chain(&self) -> Vec<&CommandNode<'s>> {
        let mut chain = vec![&self.root];
        let mut current = &self.root;
        for segment in &self.path {
            match current.child(segment) {
                Some(next) => {
                    chain.push(next);
                    current = next;
                }
                None => break,
            }
        }
        chain
    }

    /// Number of path segments that resolved to a node.
    pub fn matched(&self) -> usize {
        self.chain().len() - 1
    }

    /// First path segment with no matching node.
    pub fn unmatched(&self) -> Option<&str> {
        self.path.get(self.matched()).map(String::as_str)
    }
}

pub struct CommandTreeBuilder<'s> {
    schema: &'s Schema,
}

impl<'s> CommandTreeBuilder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        CommandTreeBuilder { schema }
    }

    /// Synthetic root field for an operation, `None` when the schema does not
    /// define that root.
    pub fn root_field(&self, operation: Operation) -> Option<Field> {
        let root = self.schema.root(operation)?;
        let description = match operation {
            Operation::Query => QUERY_DESCRIPTION,
            Operation::Mutation => MUTATION_DESCRIPTION,
            Operation::Subscription => SUBSCRIPTION_DESCRIPTION,
        };
        Some(Field {
            name: operation.keyword().to_string(),
            description: Some(description.to_string()),
            ty: root.clone(),
            ..Field::default()
        })
    }

    /// Tree for one operation. The root is always expanded when `path` starts
    /// with its keyword, otherwise it is returned bare so it can still be
    /// listed next to the other operations.
    pub fn build_operation<S: AsRef<str>>(
        &self,
        operation: Operation,
        path: &[S],
    ) -> Result<Option<CommandTree<'s>>, GqlError> {
        let Some(field) = self.root_field(operation) else {
            return Ok(None);
        };
        let selected = path
            .first()
            .is_some_and(|first| first.as_ref() == operation.keyword());
        let rest: Vec<String> = if selected {
            path[1..].iter().map(|s| s.as_ref().to_string()).collect()
        } else {
            Vec::new()
        };
        let mut root = CommandNode::new(self.schema, field, Some(operation))?;
        if selected {
            self.expand(&mut root, &rest)?;
        }
        Ok(Some(CommandTree { root, path: rest }))
    }

    /// Builds a node for `field` and expands it along `path`.
    pub fn build<S: AsRef<str>>(&self, field: Field, path: &[S]) -> Result<CommandNode<'s>, GqlError> {
        let mut node = CommandNode::new(self.schema, field, None)?;
        self.expand(&mut node, path)?;
        Ok(node)
    }

    fn expand<S: AsRef<str>>(&self, node: &mut CommandNode<'s>, path: &[S]) -> Result<(), GqlError> {
        if node.is_terminal() {
            node.expanded = true;
            return Ok(());
        }
        let ty = self
            .schema
            .resolve(&node.field.ty)
            .ok_or_else(|| GqlError::TypeNotFound(node.field.ty.named_type().name().to_string()))?;
        node.expanded = true;
        if ty.is_leaf_kind() {
            return Ok(());
        }
        let next = path.first().map(AsRef::as_ref);
        for field in ty.fields() {
            let mut child = CommandNode::new(self.schema, field.clone(), None)?;
            if next == Some(field.name.as_str()) {
                match self.expand(&mut child, &path[1..]) {
                    Ok(()) => {}
                    Err(GqlError::TypeNotFound(name)) => {
                        tracing::warn!(field = %field.name, type_name = %name, "type not found in schema, field left unexpanded");
                    }
                    Err(e) => return Err(e),
                }
            }
            node.children.push(child);
        }
        if let Some(segment) = next
            && node.child(segment).is_none()
        {
            tracing::debug!(parent = %node.field.name, segment, "path segment matches no field");
        }
        Ok(())
    }
}
