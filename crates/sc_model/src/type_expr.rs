use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{LeafKind, TypePath};

// -----------------------------------------------------------------------------
// TypeExpr

/// A declared type expression, as written on a field.
///
/// The [`Display`](fmt::Display) output is the canonical form of the
/// expression: two expressions are the same type iff their canonical forms
/// are equal.
///
/// # Examples
///
/// ```
/// use sc_model::{LeafKind, TypeExpr};
///
/// let ty = TypeExpr::declared(
///     "my_app::Box",
///     [TypeExpr::declared("std::vec::Vec", [TypeExpr::boxed(LeafKind::I32)])],
/// );
/// assert_eq!(ty.to_string(), "my_app::Box<std::vec::Vec<Option<i32>>>");
///
/// let ty = TypeExpr::array(TypeExpr::primitive(LeafKind::I64));
/// assert_eq!(ty.to_string(), "[i64]");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeExpr {
    /// A non-nullable leaf, always present on the wire.
    Primitive(LeafKind),
    /// A nullable leaf.
    Boxed(LeafKind),
    /// A native array of the element type.
    Array(Box<TypeExpr>),
    /// A named type with its (possibly empty) type arguments.
    Declared { path: TypePath, args: Vec<TypeExpr> },
    /// A type variable of the enclosing declaration.
    Var(String),
}

impl TypeExpr {
    #[inline]
    pub fn primitive(kind: LeafKind) -> Self {
        Self::Primitive(kind)
    }

    #[inline]
    pub fn boxed(kind: LeafKind) -> Self {
        Self::Boxed(kind)
    }

    #[inline]
    pub fn string() -> Self {
        Self::Boxed(LeafKind::String)
    }

    #[inline]
    pub fn array(elem: TypeExpr) -> Self {
        Self::Array(Box::new(elem))
    }

    #[inline]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// A declared type with the given type arguments.
    pub fn declared(path: impl Into<TypePath>, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::Declared {
            path: path.into(),
            args: args.into_iter().collect(),
        }
    }

    /// A declared type without type arguments.
    #[inline]
    pub fn named(path: impl Into<TypePath>) -> Self {
        Self::declared(path, [])
    }

    /// Returns `true` for [`TypeExpr::Primitive`].
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns the leaf kind of a primitive or boxed leaf.
    #[inline]
    pub const fn leaf(&self) -> Option<LeafKind> {
        match self {
            Self::Primitive(kind) | Self::Boxed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` if a type variable occurs anywhere in the expression.
    pub fn contains_type_vars(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Boxed(_) => false,
            Self::Array(elem) => elem.contains_type_vars(),
            Self::Declared { args, .. } => args.iter().any(Self::contains_type_vars),
            Self::Var(_) => true,
        }
    }

    /// Visits this expression and every nested expression, outermost first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TypeExpr)) {
        visit(self);
        match self {
            Self::Array(elem) => elem.walk(visit),
            Self::Declared { args, .. } => args.iter().for_each(|arg| arg.walk(visit)),
            _ => {}
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => f.write_str(kind.name()),
            Self::Boxed(kind) if kind.has_primitive_form() => write!(f, "Option<{kind}>"),
            Self::Boxed(kind) => f.write_str(kind.name()),
            Self::Array(elem) => write!(f, "[{elem}]"),
            Self::Declared { path, args } => {
                f.write_str(path.type_path())?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (index, arg) in args.iter().enumerate() {
                        if index > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Var(name) => f.write_str(name),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeExpr;
    use crate::LeafKind;

    #[test]
    fn primitive_and_boxed_are_distinct() {
        let a = TypeExpr::primitive(LeafKind::I32);
        let b = TypeExpr::boxed(LeafKind::I32);
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn type_vars_are_found_in_nested_arguments() {
        let ty = TypeExpr::declared(
            "std::collections::HashMap",
            [TypeExpr::string(), TypeExpr::array(TypeExpr::var("T"))],
        );
        assert!(ty.contains_type_vars());
        assert!(!TypeExpr::array(TypeExpr::string()).contains_type_vars());
    }

    #[test]
    fn walk_is_outermost_first() {
        let ty = TypeExpr::declared("a::Box", [TypeExpr::array(TypeExpr::var("T"))]);
        let mut seen = Vec::new();
        ty.walk(&mut |e| seen.push(e.to_string()));
        assert_eq!(seen, ["a::Box<[T]>", "[T]", "T"]);
    }
}
