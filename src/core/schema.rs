//! In-memory model of an introspected GraphQL schema.
//!
//! Types arrive from introspection either fully expanded (the entries of
//! `__schema.types`) or as shallow references (`{kind, name}` plus a chain of
//! `ofType` wrappers). Everything that needs the real shape of a type goes
//! through [`Type::named_type`] and [`dereference`].

use serde::{Deserialize, Serialize};

/// Type kind as reported by `__Type.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_fields: Option<Vec<Arg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<Type>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_types: Option<Vec<Type>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub of_type: Option<Box<Type>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<Arg>,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
}

/// A field argument or input object field (`__InputValue`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<Arg>,
}

/// Root operation types of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Query,
    Mutation,
    Subscription,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Query, Operation::Mutation, Operation::Subscription];

    /// Operation keyword as written in a query document.
    pub fn keyword(self) -> &'static str {
        match self {
            Operation::Query => "query",
            Operation::Mutation => "mutation",
            Operation::Subscription => "subscription",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.keyword() == keyword)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(default)]
    pub types: Vec<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_type: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_type: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<Type>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
}

impl Type {
    /// Shallow reference to a named type, as introspection emits inside
    /// `type { kind name ofType { ... } }`.
    pub fn named(kind: Kind, name: impl Into<String>) -> Self {
        Type {
            kind: Some(kind),
            name: Some(name.into()),
            ..Type::default()
        }
    }

    pub fn non_null(inner: Type) -> Self {
        Type {
            kind: Some(Kind::NonNull),
            of_type: Some(Box::new(inner)),
            ..Type::default()
        }
    }

    pub fn list(inner: Type) -> Self {
        Type {
            kind: Some(Kind::List),
            of_type: Some(Box::new(inner)),
            ..Type::default()
        }
    }

    pub fn classify(&self) -> Option<Kind> {
        self.kind
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn fields(&self) -> &[Field] {
        self.fields.as_deref().unwrap_or(&[])
    }

    pub fn is_leaf_kind(&self) -> bool {
        matches!(self.kind, Some(Kind::Scalar | Kind::Enum))
    }

    /// Follows NonNull/List wrappers down to the named type.
    pub fn named_type(&self) -> &Type {
        let mut current = self;
        while let Some(inner) = current.of_type.as_deref() {
            current = inner;
        }
        current
    }

    /// True when this entry is a shallow reference that must be looked up in
    /// the schema type list before its body can be used.
    pub fn is_reference(&self) -> bool {
        match self.kind {
            Some(Kind::Object | Kind::Interface | Kind::InputObject) => self.fields().is_empty(),
            Some(Kind::Union) => self.possible_types.as_ref().is_none_or(|p| p.is_empty()),
            None => self.name.as_deref().is_some_and(|n| !n.is_empty()),
            _ => false,
        }
    }

    /// Schema-literal rendering: `[String!]!` and friends.
    pub fn format_type(&self) -> String {
        match (self.kind, self.of_type.as_deref()) {
            (Some(Kind::NonNull), Some(inner)) => format!("{}!", inner.format_type()),
            (Some(Kind::List), Some(inner)) => format!("[{}]", inner.format_type()),
            _ => self.name().to_string(),
        }
    }
}

/// Linear first-match lookup of a type by name.
pub fn dereference<'a>(name: &str, types: &'a [Type]) -> Option<&'a Type> {
    types.iter().find(|t| t.name.as_deref() == Some(name))
}

impl Field {
    pub fn arg_names(&self) -> Vec<&str> {
        self.args.iter().map(|a| a.name.as_str()).collect()
    }

    /// `name(arg: Type, ...): Type`
    pub fn signature(&self) -> String {
        if self.args.is_empty() {
            return format!("{}: {}", self.name, self.ty.format_type());
        }
        let args = self
            .args
            .iter()
            .map(Arg::signature)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}): {}", self.name, args, self.ty.format_type())
    }
}

impl Arg {
    pub fn signature(&self) -> String {
        format!("{}: {}", self.name, self.ty.format_type())
    }
}

impl Schema {
    pub fn root(&self, operation: Operation) -> Option<&Type> {
        let root = match operation {
            Operation::Query => self.query_type.as_ref(),
            Operation::Mutation => self.mutation_type.as_ref(),
            Operation::Subscription => self.subscription_type.as_ref(),
        };
        root.filter(|t| !t.name().is_empty())
    }

    /// Schema entry for the leaf type of `ty`. References and full types are
    /// both looked up by name, so the result borrows from the schema only.
    /// `None` when the name is not part of the schema.
    pub fn resolve(&self, ty: &Type) -> Option<&Type> {
        dereference(ty.named_type().name(), &self.types)
    }

    /// Type the resolve path lands on. The first segment names the operation,
    /// every further segment a field of the previous type.
    pub fn type_for_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Type> {
        let (first, rest) = path.split_first()?;
        let operation = Operation::from_keyword(first.as_ref())?;
        let mut current = self.resolve(self.root(operation)?)?;
        for segment in rest {
            let field = current
                .fields()
                .iter()
                .find(|f| f.name == segment.as_ref())?;
            current = self.resolve(&field.ty)?;
        }
        Some(current)
    }

    /// Field named by the last segment, looked up on the type of the
    /// preceding segments.
    pub fn field_for_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Field> {
        if path.len() <= 1 {
            return None;
        }
        let (last, parent) = path.split_last()?;
        self.type_for_path(parent)?
            .fields()
            .iter()
            .find(|f| f.name == last.as_ref())
    }
}
