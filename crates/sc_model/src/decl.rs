use serde::{Deserialize, Serialize};

use crate::{FieldDescriptor, TypeExpr, TypePath};

// -----------------------------------------------------------------------------
// DeclKind

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// Can be default-constructed and populated field by field.
    #[default]
    Concrete,
    /// Cannot be instantiated, only referenced.
    Abstract,
}

// -----------------------------------------------------------------------------
// TypeDecl

/// A declared data-model type.
///
/// # Examples
///
/// ```
/// use sc_model::{FieldDescriptor, TypeDecl, TypeExpr};
///
/// let pair = TypeDecl::concrete("demo::Pair")
///     .with_params(["A", "B"])
///     .with_field(FieldDescriptor::new("first", TypeExpr::var("A")).required())
///     .with_field(FieldDescriptor::new("second", TypeExpr::var("B")));
///
/// assert!(pair.is_generic());
/// assert_eq!(pair.param_index("B"), Some(1));
/// assert_eq!(pair.field("first").map(|f| f.required), Some(true));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub path: TypePath,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub kind: DeclKind,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDecl {
    /// A concrete declaration without fields.
    pub fn concrete(path: impl Into<TypePath>) -> Self {
        Self {
            path: path.into(),
            type_params: Vec::new(),
            kind: DeclKind::Concrete,
            fields: Vec::new(),
        }
    }

    /// An abstract declaration.
    pub fn abstract_type(path: impl Into<TypePath>) -> Self {
        Self {
            kind: DeclKind::Abstract,
            ..Self::concrete(path)
        }
    }

    pub fn with_params<S: Into<String>>(mut self, params: impl IntoIterator<Item = S>) -> Self {
        self.type_params = params.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.kind == DeclKind::Abstract
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Position of the type parameter `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.type_params.iter().position(|p| p == name)
    }

    /// Looks a field up by member name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The type of this declaration with its own parameters as arguments,
    /// e.g. `Pair<A, B>`.
    pub fn self_type(&self) -> TypeExpr {
        TypeExpr::declared(
            self.path.clone(),
            self.type_params.iter().map(TypeExpr::var),
        )
    }
}
