use std::sync::LazyLock;

use sc_model::{LeafKind, TypeExpr, TypePath};
use sc_utils::hash::HashMap;

// -----------------------------------------------------------------------------
// BuiltinCodec

/// A pre-built codec singleton.
///
/// Builtins never become adapter fields, a codec unit refers to them directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinCodec {
    /// Codec of a leaf, shared by its primitive and boxed forms.
    Leaf(LeafKind),
    /// Codec of a native array of primitives.
    PrimitiveArray(LeafKind),
}

impl BuiltinCodec {
    /// The name the singleton is exported under.
    pub fn export_name(self) -> String {
        match self {
            Self::Leaf(kind) => kind.fragment().to_ascii_uppercase(),
            Self::PrimitiveArray(kind) => format!("{}_ARRAY", kind.fragment().to_ascii_uppercase()),
        }
    }
}

// -----------------------------------------------------------------------------
// ContainerShape

/// A structural container family, encoded by shape rather than by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerShape {
    /// An ordered sequence, one type argument, a JSON array on the wire.
    List,
    /// A keyed collection, two type arguments, a JSON object on the wire.
    Map,
}

impl ContainerShape {
    /// Number of type arguments the shape is parameterized by.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            Self::List => 1,
            Self::Map => 2,
        }
    }
}

// -----------------------------------------------------------------------------
// BuiltinRegistry

const LIST_FAMILY: [&str; 3] = [
    "std::vec::Vec",
    "std::collections::VecDeque",
    "std::collections::LinkedList",
];

const MAP_FAMILY: [&str; 3] = [
    "std::collections::HashMap",
    "std::collections::BTreeMap",
    "indexmap::IndexMap",
];

static BUILTINS: LazyLock<BuiltinRegistry> = LazyLock::new(|| {
    let mut shapes = HashMap::default();
    LIST_FAMILY.iter().for_each(|path| {
        shapes.insert(*path, ContainerShape::List);
    });
    MAP_FAMILY.iter().for_each(|path| {
        shapes.insert(*path, ContainerShape::Map);
    });
    BuiltinRegistry { shapes }
});

/// The read-only table of well-known leaf types and container shapes.
///
/// Initialized once on first access and shared by every generation run
/// and every runtime registry.
///
/// # Examples
///
/// ```
/// use sc_codegen::{BuiltinCodec, BuiltinRegistry, ContainerShape};
/// use sc_model::{LeafKind, TypeExpr, TypePath};
///
/// let builtins = BuiltinRegistry::get();
///
/// assert_eq!(
///     builtins.leaf(&TypeExpr::boxed(LeafKind::I32)),
///     Some(BuiltinCodec::Leaf(LeafKind::I32)),
/// );
/// assert_eq!(
///     builtins.container_shape(&TypePath::new("std::vec::Vec")),
///     Some(ContainerShape::List),
/// );
/// ```
#[derive(Debug)]
pub struct BuiltinRegistry {
    shapes: HashMap<&'static str, ContainerShape>,
}

impl BuiltinRegistry {
    /// Returns the process-wide registry.
    #[inline]
    pub fn get() -> &'static Self {
        &BUILTINS
    }

    /// The singleton for a primitive or boxed leaf.
    #[inline]
    pub fn leaf(&self, ty: &TypeExpr) -> Option<BuiltinCodec> {
        ty.leaf().map(BuiltinCodec::Leaf)
    }

    /// The singleton for a native array whose element is a primitive.
    pub fn primitive_array(&self, ty: &TypeExpr) -> Option<BuiltinCodec> {
        match ty {
            TypeExpr::Array(elem) => match **elem {
                TypeExpr::Primitive(kind) => Some(BuiltinCodec::PrimitiveArray(kind)),
                _ => None,
            },
            _ => None,
        }
    }

    /// The container family `path` belongs to, if any.
    #[inline]
    pub fn container_shape(&self, path: &TypePath) -> Option<ContainerShape> {
        self.shapes.get(path.type_path()).copied()
    }

    /// All recognized container paths of the given shape.
    pub fn family(&self, shape: ContainerShape) -> impl Iterator<Item = &'static str> {
        match shape {
            ContainerShape::List => LIST_FAMILY.iter(),
            ContainerShape::Map => MAP_FAMILY.iter(),
        }
        .copied()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{BuiltinCodec, BuiltinRegistry, ContainerShape};
    use sc_model::{LeafKind, TypeExpr, TypePath};

    #[test]
    fn primitive_array_requires_primitive_element() {
        let builtins = BuiltinRegistry::get();
        let prim = TypeExpr::array(TypeExpr::primitive(LeafKind::F64));
        let boxed = TypeExpr::array(TypeExpr::boxed(LeafKind::F64));

        assert_eq!(
            builtins.primitive_array(&prim),
            Some(BuiltinCodec::PrimitiveArray(LeafKind::F64))
        );
        assert_eq!(builtins.primitive_array(&boxed), None);
    }

    #[test]
    fn families_are_disjoint() {
        let builtins = BuiltinRegistry::get();
        for path in builtins.family(ContainerShape::List) {
            assert_eq!(builtins.container_shape(&TypePath::new(path)), Some(ContainerShape::List));
        }
        for path in builtins.family(ContainerShape::Map) {
            assert_eq!(builtins.container_shape(&TypePath::new(path)), Some(ContainerShape::Map));
        }
        assert_eq!(builtins.container_shape(&TypePath::new("demo::Vec")), None);
    }

    #[test]
    fn export_names() {
        assert_eq!(BuiltinCodec::Leaf(LeafKind::I32).export_name(), "I32");
        assert_eq!(BuiltinCodec::PrimitiveArray(LeafKind::Bool).export_name(), "BOOL_ARRAY");
    }
}
