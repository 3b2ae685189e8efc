//! Command-line bindings for GraphQL field arguments.
//!
//! Every schema argument becomes one `--arg-<name>` option. The binding knows
//! which primitive the option parses into, how a parsed value is written back
//! into the query as an inline literal, and how the argument's type reads in
//! help text.

use crate::core::error::GqlError;
use crate::core::schema::{Arg, Kind, Type};

/// Primitive value kind registered with the option parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Integer,
    Float,
    String,
    Boolean,
}

/// Parsed option value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

/// Classification of the argument's named (innermost) type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafBinding {
    Int,
    Float,
    String,
    Id,
    Boolean,
    Enum(String),
    InputObject(String),
    CustomScalar(String),
    /// Shapes the classifier does not model (list of lists); passed through
    /// as written, `type_name` holds the formatted schema type.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Leaf(LeafBinding),
    /// `item_non_null` only affects the rendered type name (`[ID!]`).
    List {
        item: LeafBinding,
        item_non_null: bool,
    },
    NonNull(Box<Binding>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentBinding {
    pub name: String,
    pub description: Option<String>,
    pub default_value: Option<String>,
    pub binding: Binding,
}

impl LeafBinding {
    fn classify(ty: &Type) -> Result<Self, GqlError> {
        match ty.classify() {
            Some(Kind::Scalar) => Ok(match ty.name() {
                "Int" => LeafBinding::Int,
                "Float" => LeafBinding::Float,
                "String" => LeafBinding::String,
                "ID" => LeafBinding::Id,
                "Boolean" => LeafBinding::Boolean,
                other => LeafBinding::CustomScalar(other.to_string()),
            }),
            Some(Kind::Enum) => Ok(LeafBinding::Enum(ty.name().to_string())),
            Some(Kind::InputObject) => Ok(LeafBinding::InputObject(ty.name().to_string())),
            Some(Kind::List) => Ok(LeafBinding::Raw(ty.format_type())),
            Some(kind @ (Kind::Object | Kind::Interface | Kind::Union | Kind::NonNull)) => {
                Err(GqlError::MalformedSchema(format!(
                    "{:?} {} cannot be used as input",
                    kind,
                    ty.format_type()
                )))
            }
            None => Err(GqlError::MalformedSchema(format!(
                "type {} has no kind and cannot be used as input",
                ty.format_type()
            ))),
        }
    }

    pub fn option_kind(&self) -> OptionKind {
        match self {
            LeafBinding::Int => OptionKind::Integer,
            LeafBinding::Float => OptionKind::Float,
            LeafBinding::Boolean => OptionKind::Boolean,
            LeafBinding::String
            | LeafBinding::Id
            | LeafBinding::Enum(_)
            | LeafBinding::InputObject(_)
            | LeafBinding::CustomScalar(_)
            | LeafBinding::Raw(_) => OptionKind::String,
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            LeafBinding::Int => "Int".to_string(),
            LeafBinding::Float => "Float".to_string(),
            LeafBinding::String => "String".to_string(),
            LeafBinding::Id => "ID".to_string(),
            LeafBinding::Boolean => "Boolean".to_string(),
            LeafBinding::Enum(name)
            | LeafBinding::InputObject(name)
            | LeafBinding::CustomScalar(name)
            | LeafBinding::Raw(name) => name.clone(),
        }
    }

    pub fn render(&self, value: &ArgValue) -> Result<String, GqlError> {
        match (self, value) {
            (LeafBinding::Int, ArgValue::Int(v)) => Ok(v.to_string()),
            (LeafBinding::Float, ArgValue::Float(v)) if !v.is_finite() => Err(
                GqlError::ArgumentError(format!("{} is not a valid Float literal", v)),
            ),
            (LeafBinding::Float, ArgValue::Float(v)) => Ok(format!("{:.6}", v)),
            (LeafBinding::Boolean, ArgValue::Bool(v)) => Ok(v.to_string()),
            (LeafBinding::String | LeafBinding::Id, ArgValue::Str(v)) => {
                Ok(serde_json::to_string(v)?)
            }
            (
                LeafBinding::Enum(_)
                | LeafBinding::InputObject(_)
                | LeafBinding::CustomScalar(_)
                | LeafBinding::Raw(_),
                ArgValue::Str(v),
            ) => Ok(v.clone()),
            (leaf, value) => Err(GqlError::ArgumentError(format!(
                "value {:?} does not match argument type {}",
                value,
                leaf.type_name()
            ))),
        }
    }
}

impl Binding {
    /// Outer NonNull once, List at most once (item NonNull allowed), then the
    /// named leaf.
    pub fn classify(ty: &Type) -> Result<Self, GqlError> {
        if ty.classify() == Some(Kind::NonNull) {
            let inner = ty.of_type.as_deref().ok_or_else(|| {
                GqlError::MalformedSchema("NON_NULL type without ofType".to_string())
            })?;
            return Ok(Binding::NonNull(Box::new(Self::classify_nullable(inner)?)));
        }
        Self::classify_nullable(ty)
    }

    fn classify_nullable(ty: &Type) -> Result<Self, GqlError> {
        if ty.classify() != Some(Kind::List) {
            return Ok(Binding::Leaf(LeafBinding::classify(ty)?));
        }
        let item = ty
            .of_type
            .as_deref()
            .ok_or_else(|| GqlError::MalformedSchema("LIST type without ofType".to_string()))?;
        match item.classify() {
            Some(Kind::NonNull) => {
                let named = item.of_type.as_deref().ok_or_else(|| {
                    GqlError::MalformedSchema("NON_NULL type without ofType".to_string())
                })?;
                Ok(Binding::List {
                    item: LeafBinding::classify(named)?,
                    item_non_null: true,
                })
            }
            _ => Ok(Binding::List {
                item: LeafBinding::classify(item)?,
                item_non_null: false,
            }),
        }
    }

    pub fn option_kind(&self) -> OptionKind {
        match self {
            Binding::Leaf(leaf) | Binding::List { item: leaf, .. } => leaf.option_kind(),
            Binding::NonNull(inner) => inner.option_kind(),
        }
    }

    pub fn type_name(&self) -> String {
        match self {
            Binding::Leaf(leaf) => leaf.type_name(),
            Binding::List {
                item,
                item_non_null,
            } => {
                let bang = if *item_non_null { "!" } else { "" };
                format!("[{}{}]", item.type_name(), bang)
            }
            Binding::NonNull(inner) => format!("{}!", inner.type_name()),
        }
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(self, Binding::NonNull(_))
    }

    pub fn render(&self, value: &ArgValue) -> Result<String, GqlError> {
        match self {
            Binding::Leaf(leaf) => leaf.render(value),
            Binding::List { item, .. } => Ok(format!("[{}]", item.render(value)?)),
            Binding::NonNull(inner) => inner.render(value),
        }
    }
}

impl ArgumentBinding {
    pub fn from_arg(arg: &Arg) -> Result<Self, GqlError> {
        let binding = Binding::classify(&arg.ty).map_err(|e| match e {
            GqlError::MalformedSchema(msg) => {
                GqlError::MalformedSchema(format!("argument {}: {}", arg.name, msg))
            }
            other => other,
        })?;
        Ok(ArgumentBinding {
            name: arg.name.clone(),
            description: arg.description.clone(),
            default_value: arg.default_value.clone(),
            binding,
        })
    }

    /// Option name registered with the parser.
    pub fn option_name(&self) -> String {
        format!("arg-{}", self.name)
    }

    pub fn option_kind(&self) -> OptionKind {
        self.binding.option_kind()
    }

    pub fn type_name(&self) -> String {
        self.binding.type_name()
    }

    pub fn is_mandatory(&self) -> bool {
        self.binding.is_mandatory()
    }

    pub fn help(&self) -> String {
        let mut help = format!("Argument of type {}", self.type_name());
        if let Some(default) = &self.default_value {
            help.push_str(&format!(" (default: {})", default));
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            help.push_str(&format!(". {}", description));
        }
        help
    }

    /// Inline literal for `name: <literal>` inside the argument list.
    pub fn render(&self, value: &ArgValue) -> Result<String, GqlError> {
        self.binding.render(value)
    }
}

/// Bindings for every argument of a field, in declaration order.
pub fn bind_arguments(args: &[Arg]) -> Result<Vec<ArgumentBinding>, GqlError> {
    args.iter().map(ArgumentBinding::from_arg).collect()
}

/// Renders `(a: 1, b: "x")` for the arguments that were set, or an empty
/// string when none were.
pub fn render_arguments(set: &[(&ArgumentBinding, &ArgValue)]) -> Result<String, GqlError> {
    if set.is_empty() {
        return Ok(String::new());
    }
    let rendered = set
        .iter()
        .map(|(binding, value)| Ok(format!("{}: {}", binding.name, binding.render(value)?)))
        .collect::<Result<Vec<_>, GqlError>>()?;
    Ok(format!("({})", rendered.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(name: &str, ty: Type) -> Arg {
        Arg {
            name: name.to_string(),
            ty,
            ..Arg::default()
        }
    }

    #[test]
    fn non_null_int_is_mandatory_integer() {
        let binding =
            ArgumentBinding::from_arg(&arg("limit", Type::non_null(Type::named(Kind::Scalar, "Int"))))
                .unwrap();
        assert!(binding.is_mandatory());
        assert_eq!(binding.option_kind(), OptionKind::Integer);
        assert_eq!(binding.type_name(), "Int!");
        assert_eq!(binding.option_name(), "arg-limit");
        assert_eq!(binding.render(&ArgValue::Int(10)).unwrap(), "10");
    }

    #[test]
    fn builtin_scalars_render() {
        let cases = [
            ("Int", ArgValue::Int(-3), "-3", OptionKind::Integer),
            ("Float", ArgValue::Float(1.5), "1.500000", OptionKind::Float),
            ("String", ArgValue::Str("hi".into()), "\"hi\"", OptionKind::String),
            ("ID", ArgValue::Str("42".into()), "\"42\"", OptionKind::String),
            ("Boolean", ArgValue::Bool(true), "true", OptionKind::Boolean),
        ];
        for (name, value, expected, kind) in cases {
            let b = ArgumentBinding::from_arg(&arg("a", Type::named(Kind::Scalar, name))).unwrap();
            assert_eq!(b.render(&value).unwrap(), expected, "{}", name);
            assert_eq!(b.option_kind(), kind);
            assert_eq!(b.type_name(), name);
            assert!(!b.is_mandatory());
        }
    }

    #[test]
    fn strings_are_escaped() {
        let b = ArgumentBinding::from_arg(&arg("q", Type::named(Kind::Scalar, "String"))).unwrap();
        assert_eq!(
            b.render(&ArgValue::Str("say \"hi\"".into())).unwrap(),
            r#""say \"hi\"""#
        );
    }

    #[test]
    fn enum_input_and_custom_pass_through() {
        let e = ArgumentBinding::from_arg(&arg("order", Type::named(Kind::Enum, "Order"))).unwrap();
        assert_eq!(e.render(&ArgValue::Str("DESC".into())).unwrap(), "DESC");
        assert_eq!(e.type_name(), "Order");

        let i = ArgumentBinding::from_arg(&arg("where", Type::named(Kind::InputObject, "Filter")))
            .unwrap();
        assert_eq!(
            i.render(&ArgValue::Str("{name: \"x\"}".into())).unwrap(),
            "{name: \"x\"}"
        );
        assert_eq!(i.option_kind(), OptionKind::String);

        let c = ArgumentBinding::from_arg(&arg("at", Type::named(Kind::Scalar, "DateTime"))).unwrap();
        assert_eq!(c.type_name(), "DateTime");
        assert_eq!(
            c.render(&ArgValue::Str("\"2020-01-01\"".into())).unwrap(),
            "\"2020-01-01\""
        );
    }

    #[test]
    fn lists_wrap_item_rendering() {
        let ty = Type::non_null(Type::list(Type::non_null(Type::named(Kind::Scalar, "ID"))));
        let b = ArgumentBinding::from_arg(&arg("ids", ty)).unwrap();
        assert_eq!(b.type_name(), "[ID!]!");
        assert!(b.is_mandatory());
        assert_eq!(b.option_kind(), OptionKind::String);
        assert_eq!(b.render(&ArgValue::Str("7".into())).unwrap(), "[\"7\"]");

        let b = ArgumentBinding::from_arg(&arg("n", Type::list(Type::named(Kind::Scalar, "Int"))))
            .unwrap();
        assert_eq!(b.option_kind(), OptionKind::Integer);
        assert_eq!(b.render(&ArgValue::Int(3)).unwrap(), "[3]");
    }

    #[test]
    fn nested_lists_are_raw() {
        let ty = Type::list(Type::list(Type::named(Kind::Scalar, "Int")));
        let b = ArgumentBinding::from_arg(&arg("m", ty)).unwrap();
        assert_eq!(b.type_name(), "[[Int]]");
        assert_eq!(b.render(&ArgValue::Str("[1, 2]".into())).unwrap(), "[[1, 2]]");
    }

    #[test]
    fn output_types_are_malformed() {
        let err = ArgumentBinding::from_arg(&arg("u", Type::named(Kind::Object, "User"))).unwrap_err();
        assert!(matches!(err, GqlError::MalformedSchema(_)));
        let err = ArgumentBinding::from_arg(&arg("k", Type::default())).unwrap_err();
        assert!(matches!(err, GqlError::MalformedSchema(_)));
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let b = ArgumentBinding::from_arg(&arg("a", Type::named(Kind::Scalar, "Int"))).unwrap();
        assert!(b.render(&ArgValue::Str("x".into())).is_err());
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let b = ArgumentBinding::from_arg(&arg("x", Type::named(Kind::Scalar, "Float"))).unwrap();
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = b.render(&ArgValue::Float(v)).unwrap_err();
            assert!(matches!(err, GqlError::ArgumentError(_)));
        }
        assert_eq!(b.render(&ArgValue::Float(-1.5)).unwrap(), "-1.500000");
    }

    #[test]
    fn render_arguments_joins_set_values() {
        let first = ArgumentBinding::from_arg(&arg("first", Type::named(Kind::Scalar, "Int"))).unwrap();
        let after =
            ArgumentBinding::from_arg(&arg("after", Type::named(Kind::Scalar, "String"))).unwrap();
        let five = ArgValue::Int(5);
        let cursor = ArgValue::Str("c1".into());
        assert_eq!(render_arguments(&[]).unwrap(), "");
        assert_eq!(
            render_arguments(&[(&first, &five), (&after, &cursor)]).unwrap(),
            "(first: 5, after: \"c1\")"
        );
    }

    #[test]
    fn help_mentions_default_and_description() {
        let mut a = arg("first", Type::named(Kind::Scalar, "Int"));
        a.default_value = Some("10".to_string());
        a.description = Some("Page size".to_string());
        let b = ArgumentBinding::from_arg(&a).unwrap();
        assert_eq!(b.help(), "Argument of type Int (default: 10). Page size");
    }
}
