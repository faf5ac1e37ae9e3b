use sc_model::{TypeExpr, TypePath};
use sc_utils::hash::HashMap;

use crate::{GenError, Specialization, TypeGraph};

// -----------------------------------------------------------------------------
// CodecNames

/// Collision-free codec names for every specialization of a [`TypeGraph`].
///
/// A declaration is named after its type ident. When two declarations share
/// an ident, both are named after their qualified path instead. Generic
/// specializations append one fragment per type argument, so
/// `Box<Vec<i32>>` and `Box<Vec<String>>` receive distinct names.
#[derive(Debug, Default, Clone)]
pub struct CodecNames {
    bases: HashMap<TypePath, String>,
    names: Vec<(Specialization, String)>,
    index: HashMap<Specialization, usize>,
}

impl CodecNames {
    /// Names every specialization of `graph`.
    ///
    /// Two specializations deriving the same name is a [`GenError::NameCollision`].
    pub fn assign(graph: &TypeGraph<'_>) -> (Self, Vec<GenError>) {
        let mut by_ident: HashMap<&str, Vec<&TypePath>> = HashMap::default();
        for node in graph.nodes() {
            let path = node.spec.path();
            by_ident.entry(path.type_ident()).or_default().push(path);
        }

        let mut this = Self::default();
        for paths in by_ident.values() {
            let qualify = paths.len() > 1;
            for path in paths {
                let base = if qualify {
                    qualified_base(path)
                } else {
                    path.type_ident().to_owned()
                };
                this.bases.insert((*path).clone(), base);
            }
        }

        let mut errors = Vec::new();
        let mut taken: HashMap<String, usize> = HashMap::default();
        for spec in graph.specializations() {
            let name = this.spec_name(spec);
            if let Some(&other) = taken.get(&name) {
                let first = &this.names[other].0;
                errors.push(GenError::NameCollision {
                    name: name.clone(),
                    first: first.path().to_string(),
                    second: spec.path().to_string(),
                });
            } else {
                taken.insert(name.clone(), this.names.len());
            }
            this.index.insert(spec.clone(), this.names.len());
            this.names.push((spec.clone(), name));
        }

        (this, errors)
    }

    /// The base name of a declaration in the graph.
    #[inline]
    pub fn base(&self, path: &TypePath) -> Option<&str> {
        self.bases.get(path).map(String::as_str)
    }

    /// The assigned name of `spec`.
    #[inline]
    pub fn name(&self, spec: &Specialization) -> Option<&str> {
        self.index.get(spec).map(|&i| self.names[i].1.as_str())
    }

    /// All specializations with their names, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&Specialization, &str)> {
        self.names.iter().map(|(spec, name)| (spec, name.as_str()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn spec_name(&self, spec: &Specialization) -> String {
        let mut parts = vec![self.base_or_ident(spec.path()).to_owned()];
        parts.extend(spec.args().iter().map(|arg| self.fragment(arg)).filter(|f| !f.is_empty()));
        parts.join("_")
    }

    fn base_or_ident<'a>(&'a self, path: &'a TypePath) -> &'a str {
        self.base(path).unwrap_or_else(|| path.type_ident())
    }

    /// The name fragment of a type argument; type variables contribute none.
    pub fn fragment(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Primitive(kind) => kind.name().to_owned(),
            TypeExpr::Boxed(kind) => kind.fragment().to_owned(),
            TypeExpr::Array(elem) => match self.fragment(elem) {
                inner if inner.is_empty() => String::from("Array"),
                inner => inner + "_Array",
            },
            TypeExpr::Declared { path, args } => {
                let mut parts = vec![self.base_or_ident(path).to_owned()];
                parts.extend(args.iter().map(|arg| self.fragment(arg)).filter(|f| !f.is_empty()));
                parts.join("_")
            }
            TypeExpr::Var(_) => String::new(),
        }
    }
}

/// Joins the segments of `path` with `_`.
///
/// When a segment itself contains `_` the plain join is ambiguous, so every
/// segment is written as `<len>_<segment>` behind a leading `_` instead.
/// Plain joins never start with `_`, and the length prefix splits the rest
/// back into segments, so distinct paths never share a base.
fn qualified_base(path: &TypePath) -> String {
    if !path.segments().any(|s| s.contains('_')) {
        return path.segments().collect::<Vec<_>>().join("_");
    }
    let mut base = String::from("_");
    for segment in path.segments() {
        base.push_str(&segment.len().to_string());
        base.push('_');
        base.push_str(segment);
    }
    base
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::CodecNames;
    use crate::{GenError, Specialization, resolve};
    use sc_model::{FieldDescriptor, LeafKind, TypeDecl, TypeExpr, TypeModel};

    fn names_of(model: &TypeModel) -> (Vec<(String, String)>, Vec<GenError>) {
        let (graph, errors) = resolve(model);
        assert!(errors.is_empty());
        let (names, errors) = CodecNames::assign(&graph);
        let list = names
            .iter()
            .map(|(spec, name)| (spec.canonical().to_owned(), name.to_owned()))
            .collect();
        (list, errors)
    }

    #[test]
    fn same_ident_in_two_modules_is_qualified() {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("app::tree::Node")
                    .with_field(FieldDescriptor::new("other", TypeExpr::named("app::graph::Node"))),
            )
            .unwrap();
        model.add_root(TypeDecl::concrete("app::graph::Node")).unwrap();
        model.add_root(TypeDecl::concrete("app::Leaf")).unwrap();

        let (names, errors) = names_of(&model);
        assert!(errors.is_empty());
        assert_eq!(
            names,
            [
                ("app::tree::Node".to_owned(), "app_tree_Node".to_owned()),
                ("app::graph::Node".to_owned(), "app_graph_Node".to_owned()),
                ("app::Leaf".to_owned(), "Leaf".to_owned()),
            ]
        );
    }

    #[test]
    fn underscored_segments_keep_qualified_names_apart() {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("a::b_c::X").with_field(FieldDescriptor::new("other", TypeExpr::named("a_b::c::X"))),
            )
            .unwrap();
        model.add_root(TypeDecl::concrete("a_b::c::X")).unwrap();
        model.add_root(TypeDecl::concrete("a::b::c::X")).unwrap();

        let (names, errors) = names_of(&model);
        assert!(errors.is_empty());
        assert_eq!(
            names,
            [
                ("a::b_c::X".to_owned(), "_1_a3_b_c1_X".to_owned()),
                ("a_b::c::X".to_owned(), "_3_a_b1_c1_X".to_owned()),
                ("a::b::c::X".to_owned(), "a_b_c_X".to_owned()),
            ]
        );
    }

    #[test]
    fn arguments_contribute_fragments() {
        let mut model = TypeModel::new();
        let boxed = |arg: TypeExpr| TypeExpr::declared("demo::Box", [TypeExpr::declared("std::vec::Vec", [arg])]);
        model
            .add_root(
                TypeDecl::concrete("demo::Holder")
                    .with_field(FieldDescriptor::new("a", boxed(TypeExpr::boxed(LeafKind::I32))))
                    .with_field(FieldDescriptor::new("b", boxed(TypeExpr::string())))
                    .with_field(FieldDescriptor::new(
                        "c",
                        TypeExpr::declared("demo::Box", [TypeExpr::array(TypeExpr::named("demo::Holder"))]),
                    )),
            )
            .unwrap();
        model
            .insert(
                TypeDecl::concrete("demo::Box")
                    .with_params(["T"])
                    .with_field(FieldDescriptor::new("value", TypeExpr::var("T"))),
            )
            .unwrap();

        let (names, errors) = names_of(&model);
        assert!(errors.is_empty());
        let names: Vec<_> = names.into_iter().map(|(_, name)| name).collect();
        assert_eq!(
            names,
            ["Holder", "Box_Vec_I32", "Box_Vec_String", "Box_Holder_Array", "Box"]
        );
    }

    #[test]
    fn colliding_derived_names_are_fatal() {
        let mut model = TypeModel::new();
        model
            .add_root(
                TypeDecl::concrete("demo::Holder")
                    .with_field(FieldDescriptor::new(
                        "pair",
                        TypeExpr::declared("demo::Box", [TypeExpr::named("demo::Holder")]),
                    ))
                    .with_field(FieldDescriptor::new("other", TypeExpr::named("demo::Box_Holder"))),
            )
            .unwrap();
        model
            .insert(TypeDecl::concrete("demo::Box").with_params(["T"]))
            .unwrap();
        model.insert(TypeDecl::concrete("demo::Box_Holder")).unwrap();

        let (_, errors) = names_of(&model);
        assert_eq!(
            errors,
            [GenError::NameCollision {
                name: "Box_Holder".to_owned(),
                first: "demo::Box".to_owned(),
                second: "demo::Box_Holder".to_owned(),
            }]
        );
    }

    #[test]
    fn open_specialization_is_the_base_name() {
        let names = CodecNames::default();
        let spec = Specialization::new("demo::Pair", [TypeExpr::var("A"), TypeExpr::var("B")]);
        assert_eq!(names.spec_name(&spec), "Pair");
    }
}
