use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::VecDeque;

use log::debug;
use sc_model::{TypeDecl, TypeExpr, TypePath, TypeSource};
use sc_utils::UniqueVec;
use sc_utils::hash::HashSet;

use crate::{BuiltinRegistry, GenError};

// -----------------------------------------------------------------------------
// Specialization

/// A type identity: a declared type with its ordered type arguments.
///
/// Arguments may still contain type variables, in which case the
/// specialization is partial. Equality and hashing go through the
/// canonical string form.
///
/// # Examples
///
/// ```
/// use sc_codegen::Specialization;
/// use sc_model::TypeExpr;
///
/// let a = Specialization::new("demo::Pair", [TypeExpr::string(), TypeExpr::var("B")]);
/// assert_eq!(a.canonical(), "demo::Pair<String, B>");
/// assert!(!a.is_closed());
/// ```
#[derive(Clone, Debug)]
pub struct Specialization {
    path: TypePath,
    args: Vec<TypeExpr>,
    canonical: String,
}

impl Specialization {
    pub fn new(path: impl Into<TypePath>, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        let path = path.into();
        let args: Vec<TypeExpr> = args.into_iter().collect();
        let canonical = TypeExpr::declared(path.clone(), args.iter().cloned()).to_string();
        Self {
            path,
            args,
            canonical,
        }
    }

    /// The specialization of a declaration over its own type parameters.
    pub fn open(decl: &TypeDecl) -> Self {
        Self::new(decl.path.clone(), decl.type_params.iter().map(TypeExpr::var))
    }

    #[inline]
    pub fn path(&self) -> &TypePath {
        &self.path
    }

    #[inline]
    pub fn args(&self) -> &[TypeExpr] {
        &self.args
    }

    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Returns `true` if no argument mentions a type variable.
    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.args.iter().any(TypeExpr::contains_type_vars)
    }
}

impl PartialEq for Specialization {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Specialization {}

impl Hash for Specialization {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Specialization {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

// -----------------------------------------------------------------------------
// TypeGraph

/// A concrete declaration that receives a codec unit.
#[derive(Clone, Debug)]
pub struct GraphNode<'a> {
    /// The declaration over its own type parameters.
    pub spec: Specialization,
    pub decl: &'a TypeDecl,
}

/// The transitive closure of the roots.
#[derive(Debug, Default)]
pub struct TypeGraph<'a> {
    nodes: Vec<GraphNode<'a>>,
    specializations: UniqueVec<Specialization>,
    external: UniqueVec<TypePath>,
    abstract_types: UniqueVec<TypePath>,
}

impl<'a> TypeGraph<'a> {
    /// Concrete declarations, in discovery order.
    #[inline]
    pub fn nodes(&self) -> &[GraphNode<'a>] {
        &self.nodes
    }

    pub fn node(&self, path: &TypePath) -> Option<&GraphNode<'a>> {
        self.nodes.iter().find(|node| node.spec.path() == path)
    }

    /// Every specialization seen: open ones for each node, then every
    /// parameterized use found in field types.
    #[inline]
    pub fn specializations(&self) -> &[Specialization] {
        &self.specializations
    }

    /// Declared types referenced by a field that the source does not know.
    #[inline]
    pub fn external(&self) -> &[TypePath] {
        &self.external
    }

    /// Abstract types referenced by a root or a field.
    #[inline]
    pub fn abstract_types(&self) -> &[TypePath] {
        &self.abstract_types
    }
}

// -----------------------------------------------------------------------------
// resolve

/// Discovers every specialization reachable from the roots of `source`.
///
/// Declarations that fail validation are reported and left out of the
/// graph; their fields are not followed.
pub fn resolve<'a>(source: &'a dyn TypeSource) -> (TypeGraph<'a>, Vec<GenError>) {
    let builtins = BuiltinRegistry::get();
    let mut graph = TypeGraph::default();
    let mut errors = Vec::new();
    let mut queued: HashSet<&'a TypePath> = HashSet::default();
    let mut queue: VecDeque<&'a TypeDecl> = VecDeque::new();

    for root in source.roots() {
        match source.declaration(root) {
            None => errors.push(GenError::MissingTypeModel(root.clone())),
            Some(decl) if decl.is_abstract() => {
                graph.abstract_types.push(decl.path.clone());
            }
            Some(decl) => {
                if queued.insert(&decl.path) {
                    queue.push_back(decl);
                }
            }
        }
    }

    while let Some(decl) = queue.pop_front() {
        if let Err(e) = validate(decl) {
            errors.push(e);
            continue;
        }

        let spec = Specialization::open(decl);
        debug!("discovered `{spec}`");
        graph.specializations.push(spec.clone());
        graph.nodes.push(GraphNode { spec, decl });

        for field in &decl.fields {
            field.ty.walk(&mut |ty| {
                let TypeExpr::Declared { path, args } = ty else {
                    return;
                };
                if builtins.container_shape(path).is_some() {
                    return;
                }
                match source.declaration(path) {
                    None => {
                        graph.external.push(path.clone());
                    }
                    Some(found) if found.is_abstract() => {
                        graph.abstract_types.push(path.clone());
                    }
                    Some(found) => {
                        if !args.is_empty() {
                            let used = Specialization::new(path.clone(), args.iter().cloned());
                            if graph.specializations.push(used.clone()) {
                                debug!("discovered `{used}`");
                            }
                        }
                        if queued.insert(&found.path) {
                            queue.push_back(found);
                        }
                    }
                }
            });
        }
    }

    (graph, errors)
}

fn validate(decl: &TypeDecl) -> Result<(), GenError> {
    let mut wire_names = HashSet::default();
    for field in &decl.fields {
        for name in field.wire_names() {
            if !wire_names.insert(name) {
                return Err(GenError::DuplicateWireName {
                    ty: decl.path.clone(),
                    name: name.to_owned(),
                });
            }
        }

        let mut unbound = None;
        field.ty.walk(&mut |ty| {
            if let TypeExpr::Var(var) = ty
                && decl.param_index(var).is_none()
            {
                unbound.get_or_insert(var);
            }
        });
        if let Some(var) = unbound {
            return Err(GenError::UnboundTypeVariable {
                ty: decl.path.clone(),
                field: field.name.clone(),
                var: var.clone(),
            });
        }
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Specialization, resolve};
    use crate::GenError;
    use sc_model::{FieldDescriptor, LeafKind, TypeDecl, TypeExpr, TypeModel, TypePath};

    fn model() -> TypeModel {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::Holder")
                    .with_field(FieldDescriptor::new(
                        "pairs",
                        TypeExpr::declared(
                            "std::vec::Vec",
                            [TypeExpr::declared("demo::Pair", [TypeExpr::string(), TypeExpr::boxed(LeafKind::I32)])],
                        ),
                    ))
                    .with_field(FieldDescriptor::new("shape", TypeExpr::named("demo::Shape")))
                    .with_field(FieldDescriptor::new("stamp", TypeExpr::named("chrono::Instant"))),
            )
            .unwrap();
        model
            .insert(
                TypeDecl::concrete("demo::Pair")
                    .with_params(["A", "B"])
                    .with_field(FieldDescriptor::new("first", TypeExpr::var("A")))
                    .with_field(FieldDescriptor::new("second", TypeExpr::var("B"))),
            )
            .unwrap();
        model.insert(TypeDecl::abstract_type("demo::Shape")).unwrap();
        model
    }

    // -------------------------------------------------------------------------
    // Discovery

    #[test]
    fn closure_follows_container_arguments() {
        let model = model();
        let (graph, errors) = resolve(&model);
        assert!(errors.is_empty());

        let paths: Vec<_> = graph.nodes().iter().map(|n| n.spec.canonical()).collect();
        assert_eq!(paths, ["demo::Holder", "demo::Pair<A, B>"]);

        let specs: Vec<_> = graph.specializations().iter().map(|s| s.canonical()).collect();
        assert_eq!(specs, ["demo::Holder", "demo::Pair<String, Option<i32>>", "demo::Pair<A, B>"]);

        assert_eq!(graph.abstract_types(), [TypePath::new("demo::Shape")]);
        assert_eq!(graph.external(), [TypePath::new("chrono::Instant")]);
    }

    #[test]
    fn missing_root_is_reported() {
        let mut model = model();
        model.mark_root("demo::Missing");
        let (graph, errors) = resolve(&model);
        assert_eq!(errors, [GenError::MissingTypeModel(TypePath::new("demo::Missing"))]);
        assert_eq!(graph.nodes().len(), 2);
    }

    // -------------------------------------------------------------------------
    // Validation

    #[test]
    fn duplicate_wire_name_excludes_the_type() {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::User")
                    .with_field(FieldDescriptor::new("name", TypeExpr::string()))
                    .with_field(FieldDescriptor::new("nick", TypeExpr::string()).alias("name")),
            )
            .unwrap();

        let (graph, errors) = resolve(&model);
        assert!(graph.nodes().is_empty());
        assert!(matches!(&errors[..], [GenError::DuplicateWireName { name, .. }] if name == "name"));
    }

    #[test]
    fn undeclared_variable_is_reported() {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::Wrapper")
                    .with_params(["T"])
                    .with_field(FieldDescriptor::new("value", TypeExpr::array(TypeExpr::var("U")))),
            )
            .unwrap();

        let (_, errors) = resolve(&model);
        assert!(matches!(&errors[..], [GenError::UnboundTypeVariable { var, .. }] if var == "U"));
    }

    #[test]
    fn specializations_compare_by_canonical_form() {
        let a = Specialization::new("demo::Box", [TypeExpr::string()]);
        let b = Specialization::new(TypePath::new("demo::Box"), vec![TypeExpr::boxed(LeafKind::String)]);
        let c = Specialization::new("demo::Box", [TypeExpr::boxed(LeafKind::I32)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.is_closed());
    }
}
