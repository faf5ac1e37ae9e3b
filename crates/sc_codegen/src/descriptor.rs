use core::fmt;

use sc_model::{LeafKind, TypeExpr, TypePath};

// -----------------------------------------------------------------------------
// TypeDescriptor

/// A generic type descriptor, built at generation time.
///
/// Type-variable positions refer to the enclosing unit's type parameters by
/// index; they are substituted with the arguments the unit is constructed
/// with, see [`TypeDescriptor::substitute`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Leaf(LeafKind),
    Array(Box<TypeDescriptor>),
    Parameterized {
        base: TypePath,
        args: Vec<TypeDescriptor>,
    },
    TypeVarRef(usize),
    /// Any value, used where no type argument was given.
    Object,
}

impl TypeDescriptor {
    /// Builds the descriptor of `ty`, resolving type variables against `params`.
    ///
    /// Returns the name of the first variable not found in `params` on failure.
    pub fn from_expr(ty: &TypeExpr, params: &[String]) -> Result<Self, String> {
        Ok(match ty {
            TypeExpr::Primitive(kind) | TypeExpr::Boxed(kind) => Self::Leaf(*kind),
            TypeExpr::Array(elem) => Self::Array(Box::new(Self::from_expr(elem, params)?)),
            TypeExpr::Declared { path, args } => Self::Parameterized {
                base: path.clone(),
                args: args
                    .iter()
                    .map(|arg| Self::from_expr(arg, params))
                    .collect::<Result<_, _>>()?,
            },
            TypeExpr::Var(name) => match params.iter().position(|p| p == name) {
                Some(index) => Self::TypeVarRef(index),
                None => return Err(name.clone()),
            },
        })
    }

    /// Resolves every type-variable position with `args`.
    ///
    /// A position beyond `args` resolves to [`RuntimeType::Object`].
    pub fn substitute(&self, args: &[RuntimeType]) -> RuntimeType {
        match self {
            Self::Leaf(kind) => RuntimeType::Leaf(*kind),
            Self::Array(elem) => RuntimeType::Array(Box::new(elem.substitute(args))),
            Self::Parameterized { base, args: inner } => RuntimeType::Parameterized {
                base: base.clone(),
                args: inner.iter().map(|arg| arg.substitute(args)).collect(),
            },
            Self::TypeVarRef(index) => args.get(*index).cloned().unwrap_or(RuntimeType::Object),
            Self::Object => RuntimeType::Object,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(kind) => write!(f, "{kind}"),
            Self::Array(elem) => write!(f, "[{elem}]"),
            Self::Parameterized { base, args } => {
                write!(f, "{base}")?;
                write_args(f, args)
            }
            Self::TypeVarRef(index) => write!(f, "${index}"),
            Self::Object => f.write_str("?"),
        }
    }
}

// -----------------------------------------------------------------------------
// RuntimeType

/// A fully resolved type, as requested at a call site.
///
/// # Examples
///
/// ```
/// use sc_codegen::RuntimeType;
/// use sc_model::LeafKind;
///
/// let ty = RuntimeType::of("demo::Pair", [RuntimeType::Leaf(LeafKind::I32), RuntimeType::Object]);
/// assert_eq!(ty.to_string(), "demo::Pair<i32, ?>");
/// assert_eq!(RuntimeType::named("demo::Node").to_string(), "demo::Node");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    Leaf(LeafKind),
    Array(Box<RuntimeType>),
    Parameterized { base: TypePath, args: Vec<RuntimeType> },
    /// The unknown-object type: any JSON value.
    Object,
}

impl RuntimeType {
    /// A raw reference to `path`, without type arguments.
    #[inline]
    pub fn named(path: impl Into<TypePath>) -> Self {
        Self::of(path, [])
    }

    /// `path` with the given type arguments.
    pub fn of(path: impl Into<TypePath>, args: impl IntoIterator<Item = RuntimeType>) -> Self {
        Self::Parameterized {
            base: path.into(),
            args: args.into_iter().collect(),
        }
    }

    /// The erased base path, for parameterized types.
    #[inline]
    pub fn base(&self) -> Option<&TypePath> {
        match self {
            Self::Parameterized { base, .. } => Some(base),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(kind) => write!(f, "{kind}"),
            Self::Array(elem) => write!(f, "[{elem}]"),
            Self::Parameterized { base, args } => {
                write!(f, "{base}")?;
                write_args(f, args)
            }
            Self::Object => f.write_str("?"),
        }
    }
}

fn write_args<T: fmt::Display>(f: &mut fmt::Formatter<'_>, args: &[T]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("<")?;
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(">")
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{RuntimeType, TypeDescriptor};
    use sc_model::{LeafKind, TypeExpr};

    fn params() -> Vec<String> {
        vec!["K".into(), "V".into()]
    }

    #[test]
    fn nested_variables_are_substituted() {
        let ty = TypeExpr::declared(
            "demo::Box",
            [TypeExpr::declared("demo::Pair", [TypeExpr::var("V"), TypeExpr::array(TypeExpr::var("K"))])],
        );
        let desc = TypeDescriptor::from_expr(&ty, &params()).unwrap();
        assert_eq!(desc.to_string(), "demo::Box<demo::Pair<$1, [$0]>>");

        let resolved = desc.substitute(&[RuntimeType::Leaf(LeafKind::String), RuntimeType::named("demo::Node")]);
        assert_eq!(resolved.to_string(), "demo::Box<demo::Pair<demo::Node, [String]>>");
    }

    #[test]
    fn unbound_variable_is_reported() {
        let err = TypeDescriptor::from_expr(&TypeExpr::var("X"), &params()).unwrap_err();
        assert_eq!(err, "X");
    }

    #[test]
    fn missing_argument_becomes_object() {
        let desc = TypeDescriptor::TypeVarRef(3);
        assert_eq!(desc.substitute(&[]), RuntimeType::Object);
    }
}
