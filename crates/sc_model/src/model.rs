use sc_utils::hash::HashMap;
use serde::Deserialize;

use crate::{ModelError, TypeDecl, TypeExpr, TypePath};

// -----------------------------------------------------------------------------
// TypeSource

/// The contract between a type discovery front end and the resolver.
///
/// Every path the resolver asks about either resolves to a declaration
/// (concrete with its fields, or explicitly abstract) or to `None`,
/// meaning the type is unknown to this front end.
pub trait TypeSource {
    /// The types explicitly marked for codec generation.
    fn roots(&self) -> &[TypePath];

    /// The declaration of `path`, if the front end knows it.
    fn declaration(&self, path: &TypePath) -> Option<&TypeDecl>;
}

// -----------------------------------------------------------------------------
// TypeModel

/// An in-memory [`TypeSource`].
///
/// Declarations keep their insertion order, which in turn fixes the order
/// of generated artifacts.
///
/// # Examples
///
/// ```
/// use sc_model::{FieldDescriptor, LeafKind, TypeDecl, TypeExpr, TypeModel, TypeSource};
///
/// let mut model = TypeModel::new();
/// model.add_root(
///     TypeDecl::concrete("demo::User")
///         .with_field(FieldDescriptor::new("id", TypeExpr::primitive(LeafKind::I64))),
/// ).unwrap();
///
/// assert_eq!(model.roots().len(), 1);
/// assert!(model.declaration(&"demo::User".into()).is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TypeModel {
    decls: Vec<TypeDecl>,
    index: HashMap<TypePath, usize>,
    roots: Vec<TypePath>,
}

#[derive(Deserialize)]
struct ModelDocument {
    #[serde(default)]
    roots: Vec<TypePath>,
    #[serde(default)]
    types: Vec<TypeDecl>,
}

impl TypeModel {
    /// Create an empty [`TypeModel`].
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration.
    ///
    /// Fails if the path is already declared, or if a field uses the
    /// primitive form of a leaf that has none.
    pub fn insert(&mut self, decl: TypeDecl) -> Result<(), ModelError> {
        if self.index.contains_key(&decl.path) {
            return Err(ModelError::DuplicateDeclaration(decl.path));
        }
        for field in &decl.fields {
            let mut invalid = None;
            field.ty.walk(&mut |ty| {
                if let TypeExpr::Primitive(kind) = ty
                    && !kind.has_primitive_form()
                {
                    invalid.get_or_insert(*kind);
                }
            });
            if let Some(kind) = invalid {
                return Err(ModelError::NoPrimitiveForm {
                    ty: decl.path.clone(),
                    field: field.name.clone(),
                    kind,
                });
            }
        }
        self.index.insert(decl.path.clone(), self.decls.len());
        self.decls.push(decl);
        Ok(())
    }

    /// Adds a declaration and marks it as a root.
    pub fn add_root(&mut self, decl: TypeDecl) -> Result<(), ModelError> {
        let path = decl.path.clone();
        self.insert(decl)?;
        self.mark_root(path);
        Ok(())
    }

    /// Marks `path` for codec generation.
    ///
    /// The path does not have to be declared, the resolver reports
    /// missing roots.
    pub fn mark_root(&mut self, path: impl Into<TypePath>) {
        let path = path.into();
        if !self.roots.contains(&path) {
            self.roots.push(path);
        }
    }

    /// All declarations in insertion order.
    #[inline]
    pub fn declarations(&self) -> &[TypeDecl] {
        &self.decls
    }

    /// Loads a model from a JSON document of the form
    /// `{ "roots": ["a::B"], "types": [ ... ] }`.
    pub fn from_json_str(input: &str) -> Result<Self, ModelError> {
        let doc: ModelDocument =
            serde_json::from_str(input).map_err(|e| ModelError::Document(e.to_string()))?;
        let mut model = Self::new();
        for decl in doc.types {
            model.insert(decl)?;
        }
        doc.roots.into_iter().for_each(|root| model.mark_root(root));
        Ok(model)
    }
}

impl TypeSource for TypeModel {
    #[inline]
    fn roots(&self) -> &[TypePath] {
        &self.roots
    }

    fn declaration(&self, path: &TypePath) -> Option<&TypeDecl> {
        self.index.get(path).map(|&index| &self.decls[index])
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{TypeModel, TypeSource};
    use crate::{FieldDescriptor, LeafKind, ModelError, TypeDecl, TypeExpr};

    #[test]
    fn duplicate_declaration_is_rejected() {
        let mut model = TypeModel::new();
        model.insert(TypeDecl::concrete("a::Node")).unwrap();
        let err = model.insert(TypeDecl::concrete("a::Node")).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateDeclaration(_)));
    }

    #[test]
    fn primitive_string_is_rejected() {
        let mut model = TypeModel::new();
        let decl = TypeDecl::concrete("a::Bad").with_field(FieldDescriptor::new(
            "name",
            TypeExpr::array(TypeExpr::primitive(LeafKind::String)),
        ));
        let err = model.insert(decl).unwrap_err();
        assert!(matches!(err, ModelError::NoPrimitiveForm { kind: LeafKind::String, .. }));
    }

    #[test]
    fn loads_json_document() {
        let input = r#"{
            "roots": ["demo::Pair"],
            "types": [{
                "path": "demo::Pair",
                "type_params": ["A", "B"],
                "fields": [
                    { "name": "first", "wire_name": "first", "ty": { "var": "A" }, "required": true },
                    { "name": "second", "wire_name": "second", "aliases": ["2nd"], "ty": { "var": "B" } }
                ]
            }]
        }"#;
        let model = TypeModel::from_json_str(input).unwrap();
        assert_eq!(model.roots()[0].type_path(), "demo::Pair");

        let decl = model.declaration(&"demo::Pair".into()).unwrap();
        assert_eq!(decl.type_params, ["A", "B"]);
        assert!(decl.fields[0].required);
        assert_eq!(decl.fields[1].aliases, ["2nd"]);
        assert_eq!(decl.fields[1].ty, TypeExpr::var("B"));
    }
}
